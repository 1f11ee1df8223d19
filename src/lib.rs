//! MEmu Kit - typed async bindings for the MEmu `memuc` control tool
//!
//! Every operation shells out to `memuc`, so the binding is a thin layer
//! that validates its arguments, builds the exact token list, runs the tool
//! and turns its plaintext output into typed values or errors.
//!
//! ## Architecture
//!
//! - `memu-core`: configuration, error and logging plumbing
//! - `memu-locator`: finds the `memuc` executable
//! - `memu-bridge`: command builder, response interpreter and [`MemucClient`]
//!
//! ## Example
//!
//! ```no_run
//! use memu_kit::prelude::*;
//!
//! # async fn run() -> Result<(), memu_kit::Error> {
//! let client = memu_kit::connect().await?;
//! for vm in client.list_vm_info(None, ListOptions::default()).await? {
//!     println!("{} {} running={}", vm.index, vm.name, vm.running);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use tracing::info;

pub use memu_bridge as bridge;
pub use memu_core as core;
pub use memu_locator as locator;

pub use memu_bridge::MemucClient;
pub use memu_core::MemucConfig;

/// Prelude module for convenient imports
pub mod prelude {
    pub use memu_bridge::{
        ConfigKey, Keystroke, ListOptions, MemucClient, MemucError, Outcome, StartOptions, TaskId,
        TaskStatus, VmInfo, VmTarget,
    };
    pub use memu_core::MemucConfig;
    pub use memu_locator::MemucLocator;
}

/// Errors raised while setting up a client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("{}", .0.user_message())]
    Config(#[from] memu_core::CoreError),
    /// memuc could not be found
    #[error(transparent)]
    Discovery(#[from] memu_locator::DiscoveryError),
    /// A memuc operation failed
    #[error(transparent)]
    Memuc(#[from] memu_bridge::MemucError),
}

/// Load the user configuration, locate memuc and build a client
pub async fn connect() -> Result<MemucClient, Error> {
    let config = MemucConfig::load().await?;
    connect_with(&config)
}

/// Locate memuc according to `config` and build a client
pub fn connect_with(config: &MemucConfig) -> Result<MemucClient, Error> {
    config.validate()?;

    let installation = memu_locator::MemucLocator::from_config(config).locate()?;
    info!("Using memuc at {:?}", installation.path);

    Ok(MemucClient::from_config(config, installation.path))
}
