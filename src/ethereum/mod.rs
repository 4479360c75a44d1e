//! Ethereum infrastructure - Alloy provider implementations

mod provider;

pub use provider::{create_provider, node_banner, EthereumProvider, ProviderConfig};
