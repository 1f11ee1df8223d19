//! memuc Response Interpreter
//!
//! Decides success or failure of a finished memuc run and parses its
//! plaintext output into the shape each operation declares. Every function
//! here is pure: the same output always yields the same value.

use std::sync::OnceLock;
use regex::Regex;
use tracing::{debug, warn};

use memu_core::MemucConfig;

use crate::error::{MemucError, Result};
use crate::process::{ProcessOutput, DETACHED_EXIT_CODE};
use crate::vm::{AdbConnection, TaskId, TaskStatus, VmInfo};

/// memuc prints this from `listvms` when no VM exists
const NO_VMS_MARKER: &str = "read failed";

/// `getappinfolist` output when the VM's package service is down
const PACKAGE_SERVICE_MISSING: &str = "Can't find service: package";

/// Label in front of `getconfigex` values
pub const CONFIG_VALUE_LABEL: &str = "Value:";

/// Prefix on every `getappinfolist` line
const PACKAGE_PREFIX: &str = "package:";

/// Field count of a `listvms` row without and with disk info
const VM_FIELDS: usize = 5;
const VM_FIELDS_WITH_DISK: usize = 6;

fn index_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"index:\s*(\d+)").expect("index pattern is valid"))
}

/// Expected result shape of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Success flag only
    Bool,
    /// New VM index, `-1` when memuc did not print one
    Int,
    /// Trimmed stdout; `label` is stripped when present, `markers` enables failure marker checks
    Text {
        label: Option<&'static str>,
        markers: bool,
    },
    /// `isrunning` answer
    Running,
    /// `listvms` rows; columns depend on whether disk info was requested
    VmList { disk_info: bool },
    /// `getappinfolist` package names
    Packages,
    /// Handle of a detached task
    TaskId,
    /// `taskstatus` answer
    TaskStatus,
    /// ADB endpoint from `adb shell ifconfig`
    AdbConnection,
}

/// Parsed value, tagged by shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedValue {
    Bool(bool),
    Int(i64),
    Text(String),
    VmList(Vec<VmInfo>),
    Packages(Vec<String>),
    TaskId(TaskId),
    TaskStatus(TaskStatus),
    AdbConnection(AdbConnection),
}

macro_rules! parsed_value_into {
    ($($target:ty => $variant:ident;)*) => {
        $(
            impl TryFrom<ParsedValue> for $target {
                type Error = ParsedValue;

                fn try_from(value: ParsedValue) -> std::result::Result<Self, Self::Error> {
                    match value {
                        ParsedValue::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

parsed_value_into! {
    bool => Bool;
    i64 => Int;
    String => Text;
    Vec<VmInfo> => VmList;
    Vec<String> => Packages;
    TaskId => TaskId;
    TaskStatus => TaskStatus;
    AdbConnection => AdbConnection;
}

/// Response interpreter
#[derive(Debug, Clone)]
pub struct ResponseInterpreter {
    failure_markers: Vec<String>,
}

impl Default for ResponseInterpreter {
    fn default() -> Self {
        Self::from_config(&MemucConfig::default())
    }
}

impl ResponseInterpreter {
    /// Interpreter with an explicit failure marker list
    pub fn new(failure_markers: Vec<String>) -> Self {
        Self { failure_markers }
    }

    pub fn from_config(config: &MemucConfig) -> Self {
        Self::new(config.failure_markers.clone())
    }

    pub fn failure_markers(&self) -> &[String] {
        &self.failure_markers
    }

    /// First configured failure marker contained in `text`
    pub fn marker_in(&self, text: &str) -> Option<&str> {
        self.failure_markers
            .iter()
            .map(String::as_str)
            .find(|marker| text.contains(marker))
    }

    /// Fail on a non-zero exit code, and on a failure marker when `markers` is set
    pub fn check(&self, operation: &str, output: &ProcessOutput, markers: bool) -> Result<()> {
        if output.exit_code != 0 {
            return Err(MemucError::failed(operation, output.exit_code, &output.text));
        }
        if markers {
            if let Some(marker) = self.marker_in(&output.text) {
                debug!("memuc {} output contains failure marker {:?}", operation, marker);
                return Err(MemucError::failed(operation, output.exit_code, &output.text));
            }
        }
        Ok(())
    }

    /// Parse `output` into `shape`
    pub fn interpret(&self, operation: &str, output: &ProcessOutput, shape: ResultShape) -> Result<ParsedValue> {
        Ok(match shape {
            ResultShape::Bool => ParsedValue::Bool(self.boolean(operation, output)?),
            ResultShape::Int => ParsedValue::Int(self.created_index(operation, output)?),
            ResultShape::Text { label, markers } => {
                ParsedValue::Text(self.text(operation, output, label, markers)?)
            }
            ResultShape::Running => ParsedValue::Bool(self.running(operation, output)?),
            ResultShape::VmList { disk_info } => {
                ParsedValue::VmList(self.vm_list(operation, output, disk_info)?)
            }
            ResultShape::Packages => ParsedValue::Packages(self.packages(operation, output)?),
            ResultShape::TaskId => ParsedValue::TaskId(self.task_id(operation, &output.text)?),
            ResultShape::TaskStatus => ParsedValue::TaskStatus(self.task_status(operation, output)?),
            ResultShape::AdbConnection => {
                ParsedValue::AdbConnection(self.adb_connection(operation, output)?)
            }
        })
    }

    pub fn boolean(&self, operation: &str, output: &ProcessOutput) -> Result<bool> {
        self.check(operation, output, true)?;
        Ok(true)
    }

    /// Index of a newly created VM.
    ///
    /// Returns `-1` when memuc reports success without an `index:` field.
    pub fn created_index(&self, operation: &str, output: &ProcessOutput) -> Result<i64> {
        self.check(operation, output, true)?;

        let index = index_pattern()
            .captures(&output.text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok());

        match index {
            Some(index) => Ok(index),
            None => {
                warn!("memuc {} succeeded without reporting an index", operation);
                Ok(-1)
            }
        }
    }

    pub fn text(
        &self,
        operation: &str,
        output: &ProcessOutput,
        label: Option<&str>,
        markers: bool,
    ) -> Result<String> {
        self.check(operation, output, markers)?;

        let text = output.text.trim();
        let value = match label {
            Some(label) => match text.find(label) {
                Some(at) => &text[at + label.len()..],
                None => return Err(MemucError::failed(operation, output.exit_code, &output.text)),
            },
            None => text,
        };

        Ok(value.trim().to_string())
    }

    /// `isrunning` prints `Running` or `Not Running`
    pub fn running(&self, operation: &str, output: &ProcessOutput) -> Result<bool> {
        let text = output.text.to_ascii_lowercase();
        if text.contains("not running") {
            return Ok(false);
        }
        if text.contains("running") {
            return Ok(true);
        }
        if output.exit_code != 0 {
            return Err(MemucError::failed(operation, output.exit_code, &output.text));
        }
        Ok(false)
    }

    pub fn vm_list(&self, operation: &str, output: &ProcessOutput, disk_info: bool) -> Result<Vec<VmInfo>> {
        if output.text.contains(NO_VMS_MARKER) {
            return Ok(Vec::new());
        }
        self.check(operation, output, false)?;
        Ok(parse_vm_list(&output.text, disk_info))
    }

    pub fn packages(&self, operation: &str, output: &ProcessOutput) -> Result<Vec<String>> {
        if output.text.contains(PACKAGE_SERVICE_MISSING) {
            return Err(MemucError::failed(operation, output.exit_code, &output.text));
        }
        self.check(operation, output, false)?;
        Ok(parse_packages(&output.text))
    }

    /// Task handle from the text a detached run printed
    pub fn task_id(&self, operation: &str, raw: &str) -> Result<TaskId> {
        let id = raw.trim();
        if id.is_empty() || self.marker_in(id).is_some() {
            return Err(MemucError::failed(operation, DETACHED_EXIT_CODE, raw));
        }
        Ok(TaskId::new(id))
    }

    pub fn task_status(&self, operation: &str, output: &ProcessOutput) -> Result<TaskStatus> {
        let text = output.text.to_ascii_lowercase();

        if text.contains("failed") {
            return Ok(TaskStatus::Failed);
        }
        if text.contains("running") {
            return Ok(TaskStatus::Running);
        }
        if text.contains("success") || (output.exit_code == 0 && self.marker_in(&output.text).is_none()) {
            return Ok(TaskStatus::Success);
        }

        Err(MemucError::failed(operation, output.exit_code, &output.text))
    }

    /// Endpoint from adb's `connected to <host>:<port>` banner
    pub fn adb_connection(&self, operation: &str, output: &ProcessOutput) -> Result<AdbConnection> {
        self.check(operation, output, false)?;

        let first = output.text.lines().next().unwrap_or_default();
        parse_adb_connection(first)
            .ok_or_else(|| MemucError::failed(operation, output.exit_code, &output.text))
    }
}

/// Parse one `listvms` row.
///
/// Rows are tab separated when they contain a tab, comma separated otherwise.
/// Columns are `index, title, window handle, running, pid[, disk usage]`.
/// The index is taken from the front and the remaining fixed columns from the
/// back, so a title containing the separator stays in one piece.
pub fn parse_vm_line(line: &str, disk_info: bool) -> Option<VmInfo> {
    let line = line.trim_end_matches(['\r', '\n']);
    let separator = if line.contains('\t') { '\t' } else { ',' };
    let expected = if disk_info { VM_FIELDS_WITH_DISK } else { VM_FIELDS };

    let (index, rest) = line.split_once(separator)?;
    let mut fields: Vec<&str> = rest.rsplitn(expected - 1, separator).collect();
    if fields.len() != expected - 1 {
        return None;
    }
    fields.reverse();

    let index = index.trim().parse().ok()?;
    let running = matches!(fields[2].trim().to_ascii_lowercase().as_str(), "1" | "true");
    let pid = match fields[3].trim() {
        "" => 0,
        pid => pid.parse().ok()?,
    };

    Some(VmInfo {
        index,
        name: fields[0].to_string(),
        top_level_window_handle: fields[1].trim().to_string(),
        running,
        pid,
        disk_usage: disk_info.then(|| fields[4].trim().to_string()),
    })
}

/// Parse `listvms` output, skipping blank and malformed lines
pub fn parse_vm_list(text: &str, disk_info: bool) -> Vec<VmInfo> {
    let mut vms = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_vm_line(line, disk_info) {
            Some(vm) => vms.push(vm),
            None => warn!("Skipping unparsable listvms line: {:?}", line),
        }
    }

    vms
}

/// Parse `getappinfolist` output into package names
pub fn parse_packages(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix(PACKAGE_PREFIX).unwrap_or(line).trim().to_string())
        .filter(|package| !package.is_empty())
        .collect()
}

/// Parse `... connected to 127.0.0.1:21503`
pub fn parse_adb_connection(line: &str) -> Option<AdbConnection> {
    let (_, endpoint) = line.split_once("connected to ")?;
    let (host, port) = endpoint.trim().rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }

    Some(AdbConnection {
        host: host.to_string(),
        port: port.trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> ResponseInterpreter {
        ResponseInterpreter::default()
    }

    #[test]
    fn test_boolean_success_and_failure() {
        let ok = ProcessOutput::new(0, "some unrelated chatter\n");
        assert!(interpreter().boolean("start", &ok).unwrap());

        let failed = ProcessOutput::new(1, "whatever");
        let err = interpreter().boolean("start", &failed).unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
        assert!(matches!(err, MemucError::OperationFailed { ref output, .. } if output == "whatever"));
    }

    #[test]
    fn test_boolean_failure_marker_with_zero_exit() {
        let output = ProcessOutput::new(0, "FAILED: vm is not exist\r\n");
        assert!(interpreter().boolean("remove", &output).is_err());
    }

    #[test]
    fn test_custom_failure_marker() {
        let interpreter = ResponseInterpreter::new(vec!["not exist".into()]);
        assert!(interpreter.boolean("remove", &ProcessOutput::new(0, "vm not exist")).is_err());
        assert!(interpreter.boolean("remove", &ProcessOutput::new(0, "FAILED")).is_ok());
    }

    #[test]
    fn test_created_index() {
        let output = ProcessOutput::new(0, "SUCCESS: create vm finished, index: 12\r\n");
        assert_eq!(interpreter().created_index("create", &output).unwrap(), 12);

        let output = ProcessOutput::new(0, "SUCCESS: create vm finished. index:3");
        assert_eq!(interpreter().created_index("create", &output).unwrap(), 3);
    }

    #[test]
    fn test_created_index_sentinel() {
        let output = ProcessOutput::new(0, "SUCCESS: create vm finished.");
        assert_eq!(interpreter().created_index("create", &output).unwrap(), -1);

        let output = ProcessOutput::new(2, "index: 4");
        assert!(interpreter().created_index("create", &output).is_err());
    }

    #[test]
    fn test_text_trims_and_strips_label() {
        let output = ProcessOutput::new(0, "Value: 1920\r\n");
        let value = interpreter()
            .text("getconfigex", &output, Some(CONFIG_VALUE_LABEL), true)
            .unwrap();
        assert_eq!(value, "1920");

        let output = ProcessOutput::new(0, "\n  203.0.113.7 \n");
        assert_eq!(interpreter().text("execcmd", &output, None, false).unwrap(), "203.0.113.7");
    }

    #[test]
    fn test_text_missing_label_is_failure() {
        let output = ProcessOutput::new(0, "vm is not exist\r\n");
        let err = interpreter()
            .text("getconfigex", &output, Some(CONFIG_VALUE_LABEL), true)
            .unwrap_err();
        assert!(matches!(err, MemucError::OperationFailed { exit_code: 0, .. }));
    }

    #[test]
    fn test_text_without_markers_keeps_error_words() {
        let output = ProcessOutput::new(0, "grep: ERROR: no match\n");
        assert!(interpreter().text("execcmd", &output, None, false).is_ok());
        assert!(interpreter().text("execcmd", &output, None, true).is_err());
    }

    #[test]
    fn test_running() {
        assert!(interpreter().running("isrunning", &ProcessOutput::new(0, "Running\r\n")).unwrap());
        assert!(!interpreter().running("isrunning", &ProcessOutput::new(0, "Not Running\r\n")).unwrap());
        assert!(!interpreter().running("isrunning", &ProcessOutput::new(1, "Not Running")).unwrap());
        assert!(interpreter().running("isrunning", &ProcessOutput::new(1, "ERROR")).is_err());
    }

    #[test]
    fn test_vm_list_tab_separated() {
        let output = ProcessOutput::new(0, "0\tMEmu\t1234\ttrue\t5678\n1\tMEmu_1\t2345\tfalse\t0\n");
        let vms = interpreter().vm_list("listvms", &output, false).unwrap();

        assert_eq!(vms.len(), 2);
        assert_eq!(vms[0].index, 0);
        assert!(vms[0].running);
        assert_eq!(vms[0].pid, 5678);
        assert_eq!(vms[1].index, 1);
        assert!(!vms[1].running);
        assert_eq!(vms[1].name, "MEmu_1");
        assert!(vms.iter().all(|vm| vm.disk_usage.is_none()));
    }

    #[test]
    fn test_vm_list_comma_separated_with_disk_info() {
        let text = "0,MEmu,0,0,0,2151677952\r\n1,MEmu_1,460318,1,4632,1873395712\r\n";
        let vms = parse_vm_list(text, true);

        assert_eq!(vms.len(), 2);
        assert_eq!(vms[0].disk_usage.as_deref(), Some("2151677952"));
        assert_eq!(vms[1].top_level_window_handle, "460318");
        assert!(vms[1].running);
        assert_eq!(vms[1].disk_usage_bytes(), Some(1873395712));
    }

    #[test]
    fn test_vm_list_skips_malformed_lines() {
        let text = "0,MEmu,0,0,0\nlog: adb server restarted\nx,broken,0,0,0\n\n1,MEmu_1,0,1,99\n";
        let vms = parse_vm_list(text, false);
        assert_eq!(vms.iter().map(|vm| vm.index).collect::<Vec<_>>(), vec![0, 1]);

        // disk info requested but rows only carry five fields
        assert!(parse_vm_list("0,MEmu,0,0,0\n", true).is_empty());
    }

    #[test]
    fn test_vm_list_name_containing_separator() {
        let vms = parse_vm_list("2,farm, batch 1,0,1,4632\r\n", false);
        assert_eq!(vms.len(), 1);
        assert_eq!(vms[0].index, 2);
        assert_eq!(vms[0].name, "farm, batch 1");
        assert_eq!(vms[0].top_level_window_handle, "0");
        assert!(vms[0].running);
        assert_eq!(vms[0].pid, 4632);

        let vms = parse_vm_list("3,a,b,c,0,0,0,1024\n", true);
        assert_eq!(vms[0].name, "a,b,c");
        assert_eq!(vms[0].disk_usage.as_deref(), Some("1024"));
    }

    #[test]
    fn test_vm_list_read_failed_is_empty() {
        let output = ProcessOutput::new(1, "read failed\r\n");
        assert!(interpreter().vm_list("listvms", &output, false).unwrap().is_empty());
    }

    #[test]
    fn test_packages() {
        let output = ProcessOutput::new(0, "package:com.android.settings\r\n\r\npackage:com.example.game\r\n");
        let packages = interpreter().packages("getappinfolist", &output).unwrap();
        assert_eq!(packages, vec!["com.android.settings", "com.example.game"]);
    }

    #[test]
    fn test_packages_vm_not_running() {
        let output = ProcessOutput::new(0, "cmd: Can't find service: package\r\n");
        assert!(interpreter().packages("getappinfolist", &output).is_err());
    }

    #[test]
    fn test_task_id() {
        assert_eq!(interpreter().task_id("start", "  8472\r\n").unwrap(), TaskId::new("8472"));
        assert!(interpreter().task_id("start", "\r\n").is_err());
        assert!(interpreter().task_id("start", "ERROR: invalid vm").is_err());
    }

    #[test]
    fn test_task_status() {
        let status = |code, text: &str| interpreter().task_status("taskstatus", &ProcessOutput::new(code, text));

        assert_eq!(status(0, "task 8472 FAILED: export error").unwrap(), TaskStatus::Failed);
        assert_eq!(status(1, "something failed somewhere").unwrap(), TaskStatus::Failed);
        assert_eq!(status(0, "task is running").unwrap(), TaskStatus::Running);
        assert_eq!(status(0, "SUCCESS").unwrap(), TaskStatus::Success);
        assert_eq!(status(0, "done").unwrap(), TaskStatus::Success);
        assert!(status(0, "ERROR: unknown task").is_err());
        assert!(status(3, "").is_err());
    }

    #[test]
    fn test_adb_connection() {
        let output = ProcessOutput::new(0, "already connected to 127.0.0.1:21503\r\neth0: ip 172.17.100.15\r\n");
        let connection = interpreter().adb_connection("adb", &output).unwrap();
        assert_eq!(connection.host, "127.0.0.1");
        assert_eq!(connection.port, 21503);
        assert_eq!(connection.address(), "127.0.0.1:21503");

        let output = ProcessOutput::new(0, "error: device offline\r\n");
        assert!(interpreter().adb_connection("adb", &output).is_err());
    }

    #[test]
    fn test_interpret_is_idempotent() {
        let interpreter = interpreter();
        let output = ProcessOutput::new(0, "0,MEmu,0,1,321\n");
        let shape = ResultShape::VmList { disk_info: false };

        let first = interpreter.interpret("listvms", &output, shape).unwrap();
        let second = interpreter.interpret("listvms", &output, shape).unwrap();
        assert_eq!(first, second);
        assert!(matches!(first, ParsedValue::VmList(ref vms) if vms.len() == 1));
    }

    #[test]
    fn test_parsed_value_conversion() {
        assert_eq!(bool::try_from(ParsedValue::Bool(true)), Ok(true));
        assert_eq!(i64::try_from(ParsedValue::Int(-1)), Ok(-1));
        assert_eq!(
            Vec::<String>::try_from(ParsedValue::Packages(vec!["com.example".into()])),
            Ok(vec!["com.example".to_string()])
        );
        assert_eq!(String::try_from(ParsedValue::Bool(false)), Err(ParsedValue::Bool(false)));
    }

    #[test]
    fn test_interpret_dispatch() {
        let interpreter = interpreter();
        let ok = ProcessOutput::new(0, "SUCCESS");

        assert_eq!(interpreter.interpret("stop", &ok, ResultShape::Bool).unwrap(), ParsedValue::Bool(true));
        assert_eq!(interpreter.interpret("create", &ok, ResultShape::Int).unwrap(), ParsedValue::Int(-1));
        assert_eq!(
            interpreter.interpret("taskstatus", &ok, ResultShape::TaskStatus).unwrap(),
            ParsedValue::TaskStatus(TaskStatus::Success)
        );
    }
}
