//! Device Interaction
//!
//! Input, sensors, networking, guest shell and ADB passthrough.

use tracing::debug;

use crate::client::{require_non_empty, MemucClient};
use crate::error::{MemucError, Result};
use crate::invocation::{Invocation, MemucCommand};
use crate::response::ResultShape;
use crate::selector::VmTarget;
use crate::vm::{AdbConnection, Keystroke};

/// Guest shell command that prints the VM's public address
const PUBLIC_IP_COMMAND: &str = "wget -O- whatismyip.akamai.com";

impl MemucClient {
    /// Press a hardware key
    pub async fn trigger_keystroke(&self, target: impl Into<VmTarget>, key: Keystroke) -> Result<bool> {
        let invocation = MemucCommand::for_vm("sendkey", &target.into())?
            .arg(key.as_str())
            .build();
        self.run_bool(&invocation).await
    }

    /// Shake the device
    pub async fn trigger_shake(&self, target: impl Into<VmTarget>) -> Result<bool> {
        self.simple("shake", target.into()).await
    }

    pub async fn connect_internet(&self, target: impl Into<VmTarget>) -> Result<bool> {
        self.simple("connect", target.into()).await
    }

    pub async fn disconnect_internet(&self, target: impl Into<VmTarget>) -> Result<bool> {
        self.simple("disconnect", target.into()).await
    }

    /// Type text into the focused field
    pub async fn input_text(&self, target: impl Into<VmTarget>, text: &str) -> Result<bool> {
        let command = MemucCommand::for_vm("input", &target.into())?;
        require_non_empty("input text", text)?;
        self.run_bool(&command.arg(text).build()).await
    }

    pub async fn rotate_window(&self, target: impl Into<VmTarget>) -> Result<bool> {
        self.simple("rotate", target.into()).await
    }

    pub async fn zoom_in(&self, target: impl Into<VmTarget>) -> Result<bool> {
        self.simple("zoomin", target.into()).await
    }

    pub async fn zoom_out(&self, target: impl Into<VmTarget>) -> Result<bool> {
        self.simple("zoomout", target.into()).await
    }

    /// Run a shell command in the guest and return its output.
    ///
    /// Only the exit code decides failure, the guest may print anything.
    pub async fn execute_command(&self, target: impl Into<VmTarget>, command: &str) -> Result<String> {
        let builder = MemucCommand::for_vm("execcmd", &target.into())?;
        require_non_empty("command", command)?;
        self.guest_text(&builder.arg(command).build()).await
    }

    /// Public IP address as seen from inside the guest
    pub async fn get_public_ip(&self, target: impl Into<VmTarget>) -> Result<String> {
        let invocation = MemucCommand::for_vm("execcmd", &target.into())?
            .arg(PUBLIC_IP_COMMAND)
            .build();
        self.guest_text(&invocation).await
    }

    /// Set the GPS location in decimal degrees
    pub async fn change_gps(&self, target: impl Into<VmTarget>, latitude: f64, longitude: f64) -> Result<bool> {
        let command = MemucCommand::for_vm("setgps", &target.into())?;
        validate_coordinate("latitude", latitude, 90.0)?;
        validate_coordinate("longitude", longitude, 180.0)?;

        let invocation = command.float(latitude).float(longitude).build();
        self.run_bool(&invocation).await
    }

    /// Set the accelerometer reading on each axis
    pub async fn set_accelerometer(&self, target: impl Into<VmTarget>, x: f64, y: f64, z: f64) -> Result<bool> {
        let command = MemucCommand::for_vm("accelerometer", &target.into())?;
        for (axis, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                return Err(MemucError::InvalidArgument(format!("accelerometer {} must be finite", axis)));
            }
        }

        let invocation = command.float(x).float(y).float(z).build();
        self.run_bool(&invocation).await
    }

    /// Pass arguments through to the VM's adb
    pub async fn send_adb_command(&self, target: impl Into<VmTarget>, args: &[&str]) -> Result<String> {
        let command = MemucCommand::for_vm("adb", &target.into())?;
        if args.iter().all(|arg| arg.trim().is_empty()) {
            return Err(MemucError::InvalidArgument("adb command must not be empty".into()));
        }
        self.guest_text(&command.args(args.iter().copied()).build()).await
    }

    /// Host and port memuc's adb is connected to
    pub async fn get_adb_connection(&self, target: impl Into<VmTarget>) -> Result<AdbConnection> {
        let invocation = MemucCommand::for_vm("adb", &target.into())?
            .args(["shell", "ifconfig"])
            .build();
        let connection: AdbConnection = self.run_as(&invocation, ResultShape::AdbConnection).await?;
        debug!("adb endpoint {}", connection.address());
        Ok(connection)
    }

    async fn simple(&self, subcommand: &str, target: VmTarget) -> Result<bool> {
        let invocation = MemucCommand::for_vm(subcommand, &target)?.build();
        self.run_bool(&invocation).await
    }

    async fn guest_text(&self, invocation: &Invocation) -> Result<String> {
        let shape = ResultShape::Text {
            label: None,
            markers: false,
        };
        self.run_as(invocation, shape).await
    }
}

fn validate_coordinate(what: &str, value: f64, limit: f64) -> Result<()> {
    if !value.is_finite() || value.abs() > limit {
        return Err(MemucError::InvalidArgument(format!(
            "{} must be within [-{}, {}], got {}",
            what, limit, limit, value
        )));
    }
    Ok(())
}
