//! Client bindings for the crowdfund contract deployments.
//!
//! The deployed contract exposes two functions and one event:
//! `startProject(string,string,uint256,uint256)`, `returnAllProjects()
//! -> address[]`, and `ProjectStarted`. This crate carries the ABI as a
//! single shared constant, the two known deployment addresses, and a
//! handle type that binds one address to the ABI over an Alloy provider.
//!
//! Construction is explicit and pure: the composition root builds a
//! provider, picks a deployment, and calls [`Crowdfund::new`]. There are
//! no process-wide handles.

pub mod abi;
pub mod config;
pub mod contract;
pub mod deployments;
pub mod ethereum;

pub use contract::{Crowdfund, ProjectStarted, StartProject};
pub use deployments::Deployment;
pub use ethereum::{create_provider, node_banner, EthereumProvider, ProviderConfig};
