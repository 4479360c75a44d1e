//! Known crowdfund deployments
//!
//! Two instances of the same contract logic are deployed; they share the
//! ABI and differ only in address. The literals are taken as-is - no
//! checksum verification is performed on them.

use alloy_primitives::{address, Address};

pub const PRIMARY_ADDRESS: &str = "0x1cEeB5cF2Cd7459a74b0c1f6f7F42C98805423D2";
pub const SECONDARY_ADDRESS: &str = "0x9e6b75949EA06B15Ca65EF9bbb3f7d88c3F79C19";

/// A named deployment of the crowdfund contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Primary,
    Secondary,
}

impl Deployment {
    pub const ALL: [Deployment; 2] = [Deployment::Primary, Deployment::Secondary];

    /// The hardcoded address literal for this deployment
    pub fn address_literal(self) -> &'static str {
        match self {
            Deployment::Primary => PRIMARY_ADDRESS,
            Deployment::Secondary => SECONDARY_ADDRESS,
        }
    }

    /// The deployment address
    pub const fn address(self) -> Address {
        match self {
            Deployment::Primary => address!("1cEeB5cF2Cd7459a74b0c1f6f7F42C98805423D2"),
            Deployment::Secondary => address!("9e6b75949EA06B15Ca65EF9bbb3f7d88c3F79C19"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Deployment::Primary => "primary",
            Deployment::Secondary => "secondary",
        }
    }

    /// Look up a deployment by its name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Deployment> {
        match name.to_ascii_lowercase().as_str() {
            "primary" => Some(Deployment::Primary),
            "secondary" => Some(Deployment::Secondary),
            _ => None,
        }
    }
}
