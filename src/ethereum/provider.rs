//! Ethereum provider abstraction and Alloy implementations
//!
//! The contract handle only ever talks to the node through this trait;
//! transport choice (HTTP, WebSocket, IPC) is made once at startup.

use std::path::PathBuf;

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::{Filter, Log, TransactionReceipt, TransactionRequest};
use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Abstract Ethereum provider trait
///
/// Everything the crowdfund handle needs from a node, abstracting over
/// the specific Alloy transport.
#[async_trait::async_trait]
pub trait EthereumProvider: Send + Sync + 'static {
    /// Get the current block number
    async fn block_number(&self) -> Result<u64>;

    /// Get client version (for node detection)
    async fn client_version(&self) -> Result<String>;

    /// Get node-managed accounts (for `eth_sendTransaction`)
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Execute a call (eth_call)
    async fn call(&self, request: TransactionRequest) -> Result<Bytes>;

    /// Submit a transaction through a node-managed account (eth_sendTransaction)
    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256>;

    /// Get transaction receipt
    async fn get_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>>;

    /// Fetch logs matching a filter
    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>>;

    /// Subscribe to logs matching a filter (WebSocket/IPC only)
    async fn subscribe_logs(&self, filter: &Filter) -> Result<mpsc::Receiver<Log>>;

    /// Check if subscriptions are supported
    fn supports_subscriptions(&self) -> bool;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

/// One-line description of the node behind a provider, for connect logging
pub async fn node_banner(provider: &dyn EthereumProvider) -> String {
    match provider.client_version().await {
        Ok(version) => format!("{} at {}", version, provider.endpoint_name()),
        Err(_) => provider.endpoint_name(),
    }
}

// All three transports end up behind the same filler stack.
type ConnectedProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Enum-based provider that stores concrete types for each transport
pub enum AlloyProvider {
    Http {
        provider: ConnectedProvider,
        endpoint: String,
    },
    WebSocket {
        provider: ConnectedProvider,
        endpoint: String,
    },
    #[cfg(unix)]
    Ipc {
        provider: ConnectedProvider,
        endpoint: String,
    },
}

/// Create a provider from configuration
pub async fn create_provider(config: ProviderConfig) -> Result<Box<dyn EthereumProvider>> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            debug!(endpoint = %url, "connected HTTP provider");
            Ok(Box::new(AlloyProvider::Http {
                provider,
                endpoint: url,
            }))
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            debug!(endpoint = %url, "connected WebSocket provider");
            Ok(Box::new(AlloyProvider::WebSocket {
                provider,
                endpoint: url,
            }))
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc_path = path.to_string_lossy().to_string();
            let ipc = IpcConnect::new(ipc_path);
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?;
            let endpoint_display = path.display().to_string();
            debug!(endpoint = %endpoint_display, "connected IPC provider");
            Ok(Box::new(AlloyProvider::Ipc {
                provider,
                endpoint: endpoint_display,
            }))
        }
    }
}

// Macro to reduce code duplication for provider method implementations
macro_rules! impl_provider_method {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            AlloyProvider::Http { provider, .. } => provider.$method($($arg),*).await,
            AlloyProvider::WebSocket { provider, .. } => provider.$method($($arg),*).await,
            #[cfg(unix)]
            AlloyProvider::Ipc { provider, .. } => provider.$method($($arg),*).await,
        }
    };
}

#[async_trait::async_trait]
impl EthereumProvider for AlloyProvider {
    async fn block_number(&self) -> Result<u64> {
        Ok(impl_provider_method!(self, get_block_number)?)
    }

    async fn client_version(&self) -> Result<String> {
        Ok(impl_provider_method!(self, get_client_version)?)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(impl_provider_method!(self, get_accounts)?)
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        match self {
            AlloyProvider::Http { provider, .. } => Ok(provider.call(request.clone()).await?),
            AlloyProvider::WebSocket { provider, .. } => Ok(provider.call(request.clone()).await?),
            #[cfg(unix)]
            AlloyProvider::Ipc { provider, .. } => Ok(provider.call(request).await?),
        }
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256> {
        // eth_sendTransaction: the node owns the key and signs. Submitted as
        // a raw request so no local signer is ever required.
        let hash: B256 = match self {
            AlloyProvider::Http { provider, .. } => {
                provider
                    .raw_request("eth_sendTransaction".into(), (&request,))
                    .await?
            }
            AlloyProvider::WebSocket { provider, .. } => {
                provider
                    .raw_request("eth_sendTransaction".into(), (&request,))
                    .await?
            }
            #[cfg(unix)]
            AlloyProvider::Ipc { provider, .. } => {
                provider
                    .raw_request("eth_sendTransaction".into(), (&request,))
                    .await?
            }
        };
        Ok(hash)
    }

    async fn get_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        Ok(impl_provider_method!(self, get_transaction_receipt, hash)?)
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        Ok(impl_provider_method!(self, get_logs, filter)?)
    }

    async fn subscribe_logs(&self, filter: &Filter) -> Result<mpsc::Receiver<Log>> {
        match self {
            AlloyProvider::Http { .. } => {
                // HTTP doesn't support subscriptions, return immediately closed channel
                let (_, rx) = mpsc::channel(1);
                Ok(rx)
            }
            AlloyProvider::WebSocket { provider, .. } => {
                let sub = provider.subscribe_logs(filter).await?;
                Ok(forward_log_stream(sub))
            }
            #[cfg(unix)]
            AlloyProvider::Ipc { provider, .. } => {
                let sub = provider.subscribe_logs(filter).await?;
                Ok(forward_log_stream(sub))
            }
        }
    }

    fn supports_subscriptions(&self) -> bool {
        match self {
            AlloyProvider::Http { .. } => false,
            AlloyProvider::WebSocket { .. } => true,
            #[cfg(unix)]
            AlloyProvider::Ipc { .. } => true,
        }
    }

    fn endpoint_name(&self) -> String {
        match self {
            AlloyProvider::Http { endpoint, .. } => endpoint.clone(),
            AlloyProvider::WebSocket { endpoint, .. } => endpoint.clone(),
            #[cfg(unix)]
            AlloyProvider::Ipc { endpoint, .. } => endpoint.clone(),
        }
    }
}

fn forward_log_stream(
    sub: alloy::pubsub::Subscription<Log>,
) -> mpsc::Receiver<Log> {
    let (tx, rx) = mpsc::channel(100);
    tokio::spawn(async move {
        let mut stream = sub.into_stream();
        while let Some(log) = stream.next().await {
            if tx.send(log).await.is_err() {
                break;
            }
        }
    });
    rx
}
