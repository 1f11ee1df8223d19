//! memuc Locator
//!
//! Resolves the absolute path of the MEmu control tool from, in order:
//! - an explicit configured path
//! - the `MEMUC_PATH` and `MEMU_HOME` environment variables
//! - the MEmu uninstall entry in the Windows registry
//! - well-known install directories
//! - the `PATH`

pub mod detector;

pub use detector::{
    DiscoveryError, LocationSource, MemucInstallation, MemucLocator, MEMUC_EXECUTABLE,
    MEMUC_PATH_VAR, MEMU_HOME_VAR, UNINSTALL_KEYS,
};
