use std::fs;
use std::path::PathBuf;

use alloy_primitives::Address;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
}

/// Address override for a named deployment
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentOverride {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    #[serde(default)]
    pub deployments: Vec<DeploymentOverride>,
}

impl Config {
    /// Configured address override for a deployment name, if any
    pub fn deployment_address(&self, name: &str) -> Option<Address> {
        self.deployments
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .and_then(|entry| normalize_address(&entry.address).parse().ok())
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CROWDFUND_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("crowdfund").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("crowdfund").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "crowdfund", "crowdfund")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{}", payload.to_lowercase())
}
