//! The crowdfund contract ABI
//!
//! The ABI is a fixed literal describing the deployed contract's interface:
//! one read-only function, one state-changing function, one event. It is
//! shared by every deployment; only the address differs. Nothing here is
//! validated against the chain - if the literal drifts from the real
//! deployment, calls fail at the RPC layer.

use alloy_json_abi::{Event, Function, JsonAbi};
use alloy_primitives::{keccak256, B256};
use anyhow::{Context, Result};

/// Crowdfund ABI, verbatim from the deployment artifacts.
pub const CROWDFUND_ABI_JSON: &str = r#"[
    {
        "constant": true,
        "inputs": [],
        "name": "returnAllProjects",
        "outputs": [
            {
                "name": "",
                "type": "address[]"
            }
        ],
        "payable": false,
        "stateMutability": "view",
        "type": "function"
    },
    {
        "constant": false,
        "inputs": [
            {
                "name": "title",
                "type": "string"
            },
            {
                "name": "description",
                "type": "string"
            },
            {
                "name": "durationInDays",
                "type": "uint256"
            },
            {
                "name": "amountToRaise",
                "type": "uint256"
            }
        ],
        "name": "startProject",
        "outputs": [],
        "payable": false,
        "stateMutability": "nonpayable",
        "type": "function"
    },
    {
        "anonymous": false,
        "inputs": [
            {
                "indexed": false,
                "name": "contractAddress",
                "type": "address"
            },
            {
                "indexed": false,
                "name": "projectStarter",
                "type": "address"
            },
            {
                "indexed": false,
                "name": "projectTitle",
                "type": "string"
            },
            {
                "indexed": false,
                "name": "projectDesc",
                "type": "string"
            },
            {
                "indexed": false,
                "name": "deadline",
                "type": "uint256"
            },
            {
                "indexed": false,
                "name": "goalAmount",
                "type": "uint256"
            }
        ],
        "name": "ProjectStarted",
        "type": "event"
    }
]"#;

pub const START_PROJECT: &str = "startProject";
pub const RETURN_ALL_PROJECTS: &str = "returnAllProjects";
pub const PROJECT_STARTED: &str = "ProjectStarted";

/// Parsed view over the embedded ABI
#[derive(Debug, Clone)]
pub struct CrowdfundAbi {
    abi: JsonAbi,
}

impl CrowdfundAbi {
    /// Parse the embedded JSON literal
    pub fn load() -> Result<Self> {
        let abi: JsonAbi = serde_json::from_str(CROWDFUND_ABI_JSON)
            .context("Failed to parse embedded crowdfund ABI")?;
        Ok(Self { abi })
    }

    /// The underlying `JsonAbi`
    pub fn raw(&self) -> &JsonAbi {
        &self.abi
    }

    /// The `startProject(string,string,uint256,uint256)` entry
    pub fn start_project(&self) -> Result<&Function> {
        self.function(START_PROJECT)
    }

    /// The `returnAllProjects()` view entry
    pub fn return_all_projects(&self) -> Result<&Function> {
        self.function(RETURN_ALL_PROJECTS)
    }

    /// The `ProjectStarted` event entry
    pub fn project_started(&self) -> Result<&Event> {
        self.abi
            .events
            .get(PROJECT_STARTED)
            .and_then(|entries| entries.first())
            .with_context(|| format!("ABI has no event named '{}'", PROJECT_STARTED))
    }

    fn function(&self, name: &str) -> Result<&Function> {
        self.abi
            .functions
            .get(name)
            .and_then(|entries| entries.first())
            .with_context(|| format!("ABI has no function named '{}'", name))
    }

    /// Compute the 4-byte selector for a function entry
    pub fn selector(function: &Function) -> [u8; 4] {
        let hash = keccak256(function.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Compute topic0 for an event entry
    pub fn event_topic(event: &Event) -> B256 {
        keccak256(event.signature().as_bytes())
    }
}
