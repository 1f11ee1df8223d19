//! App Management
//!
//! Installing, launching and listing Android packages inside a VM.

use std::path::Path;
use tracing::info;

use crate::client::{require_non_empty, MemucClient};
use crate::error::Result;
use crate::invocation::MemucCommand;
use crate::response::ResultShape;
use crate::selector::VmTarget;

impl MemucClient {
    /// Install an APK, optionally adding a desktop shortcut
    pub async fn install_apk(&self, target: impl Into<VmTarget>, apk: &Path, create_shortcut: bool) -> Result<bool> {
        let command = MemucCommand::for_vm("installapp", &target.into())?;
        let apk = apk.to_string_lossy();
        require_non_empty("apk path", &apk)?;

        let invocation = command
            .arg(apk.into_owned())
            .flag_if(create_shortcut, "-s")
            .build();
        info!("Installing APK: {}", invocation.command_line());
        self.run_bool(&invocation).await
    }

    /// Uninstall a package
    pub async fn uninstall_apk(&self, target: impl Into<VmTarget>, package: &str) -> Result<bool> {
        self.package_command("uninstallapp", target.into(), package).await
    }

    /// Launch a package
    pub async fn start_app(&self, target: impl Into<VmTarget>, package: &str) -> Result<bool> {
        self.package_command("startapp", target.into(), package).await
    }

    /// Force-stop a package
    pub async fn stop_app(&self, target: impl Into<VmTarget>, package: &str) -> Result<bool> {
        self.package_command("stopapp", target.into(), package).await
    }

    /// Create a desktop shortcut for a package
    pub async fn create_app_shortcut(&self, target: impl Into<VmTarget>, package: &str) -> Result<bool> {
        self.package_command("createshortcut", target.into(), package).await
    }

    /// Installed package names. Fails when the VM is not running.
    pub async fn list_installed_packages(&self, target: impl Into<VmTarget>) -> Result<Vec<String>> {
        let invocation = MemucCommand::for_vm("getappinfolist", &target.into())?.build();
        self.run_as(&invocation, ResultShape::Packages).await
    }

    async fn package_command(&self, subcommand: &str, target: VmTarget, package: &str) -> Result<bool> {
        let command = MemucCommand::for_vm(subcommand, &target)?;
        require_non_empty("package name", package)?;
        self.run_bool(&command.arg(package).build()).await
    }
}
