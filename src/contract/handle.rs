//! Contract handle construction and operations

use std::sync::Arc;

use alloy::rpc::types::{Filter, Log, TransactionRequest};
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::Function;
use alloy_primitives::{Address, B256, U256};
use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::debug;

use crate::abi::CrowdfundAbi;
use crate::contract::events::ProjectStarted;
use crate::ethereum::EthereumProvider;

/// Arguments for `startProject(string,string,uint256,uint256)`
#[derive(Debug, Clone)]
pub struct StartProject {
    pub title: String,
    pub description: String,
    pub duration_days: U256,
    /// Funding goal in wei
    pub goal_amount: U256,
}

/// Handle bound to one crowdfund deployment
pub struct Crowdfund {
    provider: Arc<dyn EthereumProvider>,
    address: Address,
    abi: CrowdfundAbi,
}

impl Crowdfund {
    /// Bind the shared ABI to a deployment address.
    ///
    /// No network traffic happens here; the provider is only touched when
    /// an operation is invoked on the handle.
    pub fn new(provider: Arc<dyn EthereumProvider>, address: Address) -> Result<Self> {
        let abi = CrowdfundAbi::load()?;
        Ok(Self {
            provider,
            address,
            abi,
        })
    }

    /// The deployment address this handle is bound to
    pub fn address(&self) -> Address {
        self.address
    }

    /// The shared ABI
    pub fn abi(&self) -> &CrowdfundAbi {
        &self.abi
    }

    /// Call `returnAllProjects()` and decode the project address list
    pub async fn return_all_projects(&self) -> Result<Vec<Address>> {
        let function = self.abi.return_all_projects()?;
        let calldata = encode_call(function, &[])?;
        let request = TransactionRequest::default()
            .to(self.address)
            .input(calldata.into());
        let output = self
            .provider
            .call(request)
            .await
            .context("returnAllProjects call failed")?;
        decode_address_array(&output)
    }

    /// Encode `startProject` calldata without submitting anything.
    ///
    /// For callers that sign and broadcast through another path.
    pub fn start_project_calldata(&self, params: &StartProject) -> Result<Vec<u8>> {
        let function = self.abi.start_project()?;
        encode_call(
            function,
            &[
                DynSolValue::String(params.title.clone()),
                DynSolValue::String(params.description.clone()),
                DynSolValue::Uint(params.duration_days, 256),
                DynSolValue::Uint(params.goal_amount, 256),
            ],
        )
    }

    /// Submit `startProject` through a node-managed account
    pub async fn start_project(&self, params: &StartProject, from: Address) -> Result<B256> {
        let calldata = self.start_project_calldata(params)?;
        let request = TransactionRequest::default()
            .from(from)
            .to(self.address)
            .input(calldata.into());
        debug!(contract = %self.address, from = %from, title = %params.title, "submitting startProject");
        self.provider
            .send_transaction(request)
            .await
            .context("startProject transaction rejected")
    }

    /// Filter matching `ProjectStarted` logs from this deployment
    pub fn project_started_filter(&self) -> Result<Filter> {
        let event = self.abi.project_started()?;
        let topic = CrowdfundAbi::event_topic(event);
        Ok(Filter::new().address(self.address).event_signature(topic))
    }

    /// Fetch `ProjectStarted` events over a block range (inclusive)
    pub async fn project_started_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ProjectStarted>> {
        let filter = self
            .project_started_filter()?
            .from_block(from_block)
            .to_block(to_block);
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .context("ProjectStarted log query failed")?;
        logs.iter().map(ProjectStarted::from_log).collect()
    }

    /// Subscribe to `ProjectStarted` logs (WebSocket/IPC transports only).
    ///
    /// On HTTP the channel closes immediately; callers should fall back to
    /// polling `project_started_events`.
    pub async fn subscribe_project_started(&self) -> Result<mpsc::Receiver<Log>> {
        let filter = self.project_started_filter()?;
        self.provider.subscribe_logs(&filter).await
    }

    /// Subscribe, then backfill up to the current head.
    ///
    /// The subscription is taken before the range query so events landing
    /// between the two are not lost; an event may appear in both the
    /// backfill and the stream, and callers tolerate the overlap.
    pub async fn follow_project_started(
        &self,
        from_block: Option<u64>,
    ) -> Result<(Vec<ProjectStarted>, mpsc::Receiver<Log>)> {
        let rx = self.subscribe_project_started().await?;
        let head = self.provider.block_number().await?;
        let backfill = match from_block {
            Some(start) if start <= head => self.project_started_events(start, head).await?,
            _ => Vec::new(),
        };
        Ok((backfill, rx))
    }
}

/// Encode selector + arguments for a function entry
fn encode_call(function: &Function, args: &[DynSolValue]) -> Result<Vec<u8>> {
    if args.len() != function.inputs.len() {
        bail!(
            "{} takes {} argument(s), got {}",
            function.name,
            function.inputs.len(),
            args.len()
        );
    }

    let mut data = CrowdfundAbi::selector(function).to_vec();
    if !args.is_empty() {
        data.extend(DynSolValue::Tuple(args.to_vec()).abi_encode());
    }
    Ok(data)
}

/// Decode a single `address[]` return value
fn decode_address_array(data: &[u8]) -> Result<Vec<Address>> {
    let kind = DynSolType::Tuple(vec![DynSolType::Array(Box::new(DynSolType::Address))]);
    let decoded = kind
        .abi_decode(data)
        .context("Failed to decode address[] output")?;

    let DynSolValue::Tuple(mut values) = decoded else {
        bail!("unexpected output shape (expected single-value tuple)");
    };
    let Some(DynSolValue::Array(items)) = values.pop() else {
        bail!("unexpected output shape (expected address array)");
    };

    items
        .into_iter()
        .map(|item| {
            item.as_address()
                .context("array element is not an address")
        })
        .collect()
}
