//! Core types shared by every module.
//!
//! - **IDs**: Strongly-typed identifiers (ListenableId, SubscriptionId, BridgeId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for observability and bridges

mod config;
mod errors;
mod ids;

pub use config::{BridgeConfig, Config, ObservabilityConfig, ENV_LOG_FORMAT, ENV_LOG_LEVEL};
pub use errors::{Error, Result};
pub use ids::{BridgeId, ListenableId, SubscriptionId};
