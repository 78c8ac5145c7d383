//! Core services for strikeflow
//!
//! Shared by every crate of the workspace:
//! - Configuration loading (`config`)
//! - Error taxonomy (`error`)
//! - Logging bootstrap and component macros (`logging`)

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{ConfigError, CoordinatorError, Error, ProviderError, Result};
