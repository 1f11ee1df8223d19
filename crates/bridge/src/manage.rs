//! VM Management
//!
//! Creating, removing, copying, listing and configuring VMs.

use std::path::Path;
use tracing::info;

use crate::client::{require_non_empty, MemucClient};
use crate::error::{MemucError, Result};
use crate::invocation::MemucCommand;
use crate::response::{ResultShape, CONFIG_VALUE_LABEL};
use crate::selector::VmTarget;
use crate::vm::{ConfigKey, Outcome, VmInfo};

/// Android image version memuc creates when none is given
pub const DEFAULT_ANDROID_VERSION: &str = "96";

/// `listvms` filters
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Only list running VMs (`-r`)
    pub running_only: bool,
    /// Include disk usage (`-s`)
    pub disk_info: bool,
}

impl MemucClient {
    /// Create a new VM and return its index.
    ///
    /// Returns `-1` when memuc reports success but prints no index.
    pub async fn create_vm(&self, android_version: &str) -> Result<i64> {
        require_non_empty("android version", android_version)?;
        info!("Creating VM with android version {}", android_version);

        let invocation = MemucCommand::new("create").arg(android_version).build();
        self.run_as(&invocation, ResultShape::Int).await
    }

    /// Delete a VM
    pub async fn delete_vm(&self, target: impl Into<VmTarget>) -> Result<bool> {
        let invocation = MemucCommand::for_vm("remove", &target.into())?.build();
        info!("Deleting VM: {}", invocation.command_line());
        self.run_bool(&invocation).await
    }

    /// Clone a VM, optionally naming the copy
    pub async fn clone_vm(
        &self,
        target: impl Into<VmTarget>,
        new_name: Option<&str>,
        detach: bool,
    ) -> Result<Outcome<bool>> {
        if let Some(name) = new_name {
            require_non_empty("clone name", name)?;
        }
        let invocation = MemucCommand::for_vm("clone", &target.into())?
            .option("-r", new_name)
            .detach(detach)
            .build();
        self.run_outcome(&invocation).await
    }

    /// Export a VM to an `.ova` file
    pub async fn export_vm(
        &self,
        target: impl Into<VmTarget>,
        file: &Path,
        detach: bool,
    ) -> Result<Outcome<bool>> {
        let command = MemucCommand::for_vm("export", &target.into())?;
        let file = absolute_path(file)?;

        let invocation = command
            .arg(file)
            .detach(detach)
            .build();
        info!("Exporting VM: {}", invocation.command_line());
        self.run_outcome(&invocation).await
    }

    /// Import a VM from an `.ova` file
    pub async fn import_vm(&self, file: &Path, detach: bool) -> Result<Outcome<bool>> {
        let file = absolute_path(file)?;
        let invocation = MemucCommand::new("import").arg(file).detach(detach).build();
        info!("Importing VM: {}", invocation.command_line());
        self.run_outcome(&invocation).await
    }

    /// Rename a VM
    pub async fn rename_vm(&self, target: impl Into<VmTarget>, new_name: &str) -> Result<bool> {
        let invocation = MemucCommand::for_vm("rename", &target.into())?;
        require_non_empty("new name", new_name)?;
        self.run_bool(&invocation.arg(new_name).build()).await
    }

    /// Compress a VM's disk
    pub async fn compress_vm(&self, target: impl Into<VmTarget>, detach: bool) -> Result<Outcome<bool>> {
        let invocation = MemucCommand::for_vm("compress", &target.into())?
            .detach(detach)
            .build();
        self.run_outcome(&invocation).await
    }

    /// Randomize a VM's device identity
    pub async fn randomize_vm(&self, target: impl Into<VmTarget>) -> Result<bool> {
        let invocation = MemucCommand::for_vm("randomize", &target.into())?.build();
        self.run_bool(&invocation).await
    }

    /// List VMs, optionally narrowed to one
    pub async fn list_vm_info(&self, target: Option<VmTarget>, options: ListOptions) -> Result<Vec<VmInfo>> {
        let invocation = MemucCommand::for_optional_vm("listvms", target.as_ref())?
            .flag_if(options.running_only, "-r")
            .flag_if(options.disk_info, "-s")
            .build();
        let shape = ResultShape::VmList {
            disk_info: options.disk_info,
        };
        self.run_as(&invocation, shape).await
    }

    /// Check whether a VM is running
    pub async fn vm_is_running(&self, target: impl Into<VmTarget>) -> Result<bool> {
        let invocation = MemucCommand::for_vm("isrunning", &target.into())?.build();
        self.run_as(&invocation, ResultShape::Running).await
    }

    /// Read a VM configuration value
    pub async fn get_configuration(&self, target: impl Into<VmTarget>, key: &str) -> Result<String> {
        let command = MemucCommand::for_vm("getconfigex", &target.into())?;
        let key = config_key(key)?;

        let invocation = command.arg(key.as_str()).build();
        let shape = ResultShape::Text {
            label: Some(CONFIG_VALUE_LABEL),
            markers: true,
        };
        self.run_as(&invocation, shape).await
    }

    /// Write a VM configuration value
    pub async fn set_configuration(&self, target: impl Into<VmTarget>, key: &str, value: &str) -> Result<bool> {
        let command = MemucCommand::for_vm("setconfigex", &target.into())?;
        let key = config_key(key)?;

        let invocation = command.arg(key.as_str()).arg(value).build();
        self.run_bool(&invocation).await
    }
}

fn config_key(key: &str) -> Result<ConfigKey> {
    ConfigKey::new(key).ok_or_else(|| MemucError::InvalidArgument("configuration key must not be empty".into()))
}

fn absolute_path(file: &Path) -> Result<String> {
    require_non_empty("file path", &file.to_string_lossy())?;
    let absolute = std::path::absolute(file)?;
    Ok(absolute.to_string_lossy().into_owned())
}
