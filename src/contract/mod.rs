//! Client-side handle for the crowdfund contract
//!
//! `Crowdfund` binds one deployment address to the shared ABI. Construction
//! is pure; every network round-trip happens when an operation is invoked.

mod events;
mod handle;

pub use events::ProjectStarted;
pub use handle::{Crowdfund, StartProject};
