//! VM Control
//!
//! Lifecycle commands and background task polling.

use tracing::info;

use crate::client::{require_non_empty, MemucClient};
use crate::error::Result;
use crate::invocation::MemucCommand;
use crate::response::ResultShape;
use crate::selector::VmTarget;
use crate::vm::{Outcome, TaskId, TaskStatus};

/// `start` options
#[derive(Debug, Clone, Copy, Default)]
pub struct StartOptions {
    /// Start without showing the emulator window (`-b`)
    pub headless: bool,
    /// Return a task id instead of waiting for boot (`-t`)
    pub detach: bool,
}

impl MemucClient {
    /// Start a VM
    pub async fn start_vm(&self, target: impl Into<VmTarget>, options: StartOptions) -> Result<Outcome<bool>> {
        let invocation = MemucCommand::for_vm("start", &target.into())?
            .flag_if(options.headless, "-b")
            .detach(options.detach)
            .build();
        info!("Starting VM: {}", invocation.command_line());
        self.run_outcome(&invocation).await
    }

    /// Stop a VM
    pub async fn stop_vm(&self, target: impl Into<VmTarget>, detach: bool) -> Result<Outcome<bool>> {
        let invocation = MemucCommand::for_vm("stop", &target.into())?
            .detach(detach)
            .build();
        info!("Stopping VM: {}", invocation.command_line());
        self.run_outcome(&invocation).await
    }

    /// Stop every VM
    pub async fn stop_all_vms(&self, detach: bool) -> Result<Outcome<bool>> {
        info!("Stopping all VMs");
        let invocation = MemucCommand::new("stopall").detach(detach).build();
        self.run_outcome(&invocation).await
    }

    /// Reboot a VM
    pub async fn reboot_vm(&self, target: impl Into<VmTarget>, detach: bool) -> Result<Outcome<bool>> {
        let invocation = MemucCommand::for_vm("reboot", &target.into())?
            .detach(detach)
            .build();
        info!("Rebooting VM: {}", invocation.command_line());
        self.run_outcome(&invocation).await
    }

    /// Tile all VM windows
    pub async fn sort_out_all_vms(&self) -> Result<bool> {
        self.run_bool(&MemucCommand::new("sortwin").build()).await
    }

    /// Poll a task started by a detached command
    pub async fn check_task_status(&self, task: &TaskId) -> Result<TaskStatus> {
        require_non_empty("task id", task.as_str())?;

        let invocation = MemucCommand::new("taskstatus").arg(task.as_str()).build();
        self.run_as(&invocation, ResultShape::TaskStatus).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::*;
    use crate::error::MemucError;
    use crate::process::ProcessOutput;
    use crate::selector::SelectorError;

    #[tokio::test]
    async fn test_start_vm_detached() {
        let client = client(expect_detached(&["start", "-i", "3", "-t"], "4096\r\n"));
        let options = StartOptions {
            headless: false,
            detach: true,
        };

        let outcome = client.start_vm(3u32, options).await.unwrap();
        assert_eq!(outcome, Outcome::Detached(TaskId::new("4096")));
    }

    #[tokio::test]
    async fn test_start_vm_headless() {
        let client = client(expect_run(&["start", "-n", "MEmu", "-b"], ok("SUCCESS: start vm finished.")));
        let options = StartOptions {
            headless: true,
            detach: false,
        };

        assert_eq!(client.start_vm("MEmu", options).await.unwrap(), Outcome::Completed(true));
    }

    #[tokio::test]
    async fn test_start_vm_conflicting_target() {
        let client = client(expect_nothing());
        let target = VmTarget {
            index: Some(1),
            name: Some("MEmu_1".into()),
        };

        let err = client.start_vm(target, StartOptions::default()).await.unwrap_err();
        assert!(matches!(err, MemucError::Selector(SelectorError::Conflicting { .. })));
    }

    #[tokio::test]
    async fn test_stop_vm_failure_marker() {
        let client = client(expect_run(&["stop", "-i", "0"], ok("ERROR: vm is not running")));
        let err = client.stop_vm(0u32, false).await.unwrap_err();

        match err {
            MemucError::OperationFailed { operation, exit_code, output } => {
                assert_eq!(operation, "stop");
                assert_eq!(exit_code, 0);
                assert_eq!(output, "ERROR: vm is not running");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stop_all_vms() {
        let client = client(expect_run(&["stopall"], ok("SUCCESS: stop all vm finished")));
        assert_eq!(client.stop_all_vms(false).await.unwrap(), Outcome::Completed(true));
    }

    #[tokio::test]
    async fn test_reboot_vm_detached_failure() {
        let client = client(expect_detached(&["reboot", "-i", "0", "-t"], "ERROR: vm not exist\r\n"));
        let err = client.reboot_vm(0u32, true).await.unwrap_err();
        assert_eq!(err.exit_code(), Some(-1));
    }

    #[tokio::test]
    async fn test_sort_out_all_vms() {
        let client = client(expect_run(&["sortwin"], ok("SUCCESS: sort out all vm windows.")));
        assert!(client.sort_out_all_vms().await.unwrap());
    }

    #[tokio::test]
    async fn test_check_task_status() {
        let client = client(expect_run(&["taskstatus", "4096"], ok("running\r\n")));
        let status = client.check_task_status(&TaskId::new("4096")).await.unwrap();

        assert_eq!(status, TaskStatus::Running);
        assert!(!status.is_finished());
    }

    #[tokio::test]
    async fn test_check_task_status_failed() {
        let client = client(expect_run(&["taskstatus", "7"], ProcessOutput::new(1, "FAILED\r\n")));
        assert_eq!(client.check_task_status(&TaskId::new("7")).await.unwrap(), TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_check_task_status_empty_id() {
        let client = client(expect_nothing());
        assert!(client.check_task_status(&TaskId::new("")).await.unwrap_err().is_caller_error());
    }
}
