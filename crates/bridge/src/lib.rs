//! memuc Bridge
//!
//! Typed async access to the MEmu command line tool: selector validation,
//! command building, process dispatch and output interpretation.

pub mod apps;
pub mod client;
pub mod control;
pub mod device;
pub mod error;
pub mod invocation;
pub mod manage;
pub mod process;
pub mod response;
pub mod selector;
pub mod vm;

pub use client::MemucClient;
pub use control::StartOptions;
pub use error::{MemucError, Result};
pub use invocation::{Invocation, MemucCommand, DETACH_FLAG};
pub use manage::{ListOptions, DEFAULT_ANDROID_VERSION};
pub use process::{ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use response::{ParsedValue, ResponseInterpreter, ResultShape};
pub use selector::{SelectorError, VmSelector, VmTarget};
pub use vm::{AdbConnection, ConfigKey, Keystroke, Outcome, TaskId, TaskStatus, VmInfo};
