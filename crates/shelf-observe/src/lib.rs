//! # Shelf Observe - Observability Layer
//!
//! Centralized structured logging setup for the persistence layer.

use anyhow::Result;

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat};

/// Initialize the observability stack with defaults.
pub fn init() -> Result<()> {
    init_logging(LogConfig::default())
}
