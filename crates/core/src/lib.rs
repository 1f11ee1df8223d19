//! MEmu Kit Core - shared types
//!
//! Configuration, error and logging plumbing used by the locator and the
//! memuc bridge.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{MemucConfig, DEFAULT_FAILURE_MARKERS};
pub use error::{CoreError, Result};

/// MEmu Kit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
