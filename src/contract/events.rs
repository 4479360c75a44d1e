//! `ProjectStarted` event decoding
//!
//! Every field of the event is non-indexed, so the whole payload is
//! ABI-encoded in the log data and topic0 is the only topic.

use alloy::rpc::types::Log;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

/// A decoded `ProjectStarted(address,address,string,string,uint256,uint256)` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStarted {
    pub contract_address: Address,
    pub project_starter: Address,
    pub project_title: String,
    pub project_desc: String,
    /// Unix timestamp of the funding deadline
    pub deadline: U256,
    /// Funding goal in wei
    pub goal_amount: U256,
}

impl ProjectStarted {
    /// Field types in declaration order
    fn data_layout() -> DynSolType {
        DynSolType::Tuple(vec![
            DynSolType::Address,
            DynSolType::Address,
            DynSolType::String,
            DynSolType::String,
            DynSolType::Uint(256),
            DynSolType::Uint(256),
        ])
    }

    /// Decode from an RPC log entry
    pub fn from_log(log: &Log) -> Result<Self> {
        Self::decode_data(log.inner.data.data.as_ref())
    }

    /// Decode from raw log data bytes
    pub fn decode_data(data: &[u8]) -> Result<Self> {
        let decoded = Self::data_layout()
            .abi_decode(data)
            .context("ProjectStarted data does not match event layout")?;

        let DynSolValue::Tuple(fields) = decoded else {
            bail!("ProjectStarted data decoded to a non-tuple value");
        };
        let [contract_address, project_starter, project_title, project_desc, deadline, goal_amount]: [DynSolValue; 6] =
            fields
                .try_into()
                .map_err(|_| anyhow::anyhow!("ProjectStarted expects six fields"))?;

        Ok(Self {
            contract_address: contract_address
                .as_address()
                .context("contractAddress field is not an address")?,
            project_starter: project_starter
                .as_address()
                .context("projectStarter field is not an address")?,
            project_title: project_title
                .as_str()
                .context("projectTitle field is not a string")?
                .to_string(),
            project_desc: project_desc
                .as_str()
                .context("projectDesc field is not a string")?
                .to_string(),
            deadline: uint_field(&deadline).context("deadline field is not a uint256")?,
            goal_amount: uint_field(&goal_amount).context("goalAmount field is not a uint256")?,
        })
    }

    /// Deadline as a UTC timestamp, if it fits in the chrono range
    pub fn deadline_utc(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.deadline).ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

impl std::fmt::Display for ProjectStarted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let deadline = self
            .deadline_utc()
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_else(|| self.deadline.to_string());
        write!(
            f,
            "{} \"{}\" by {} (goal {} wei, deadline {})",
            self.contract_address, self.project_title, self.project_starter, self.goal_amount, deadline
        )
    }
}

fn uint_field(value: &DynSolValue) -> Option<U256> {
    match value {
        DynSolValue::Uint(v, 256) => Some(*v),
        _ => None,
    }
}
