//! memuc Command Builder
//!
//! Turns a typed request into the literal token vector handed to memuc.
//! memuc parses positionally, so tokens always come out as
//! `subcommand [-i N | -n NAME] positional... flags... [-t]`.

use crate::selector::{SelectorError, VmSelector, VmTarget};

/// Trailing token asking memuc to run the command as a background task
pub const DETACH_FLAG: &str = "-t";

/// A fully built memuc invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    tokens: Vec<String>,
    detach: bool,
}

impl Invocation {
    /// Tokens passed to memuc, excluding the executable itself
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The memuc subcommand
    pub fn subcommand(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or_default()
    }

    /// Whether memuc should hand back a task id instead of blocking
    pub fn is_detached(&self) -> bool {
        self.detach
    }

    /// Space-joined tokens for logging
    pub fn command_line(&self) -> String {
        self.tokens.join(" ")
    }
}

/// memuc command builder
#[derive(Debug, Clone)]
pub struct MemucCommand {
    subcommand: String,
    selector: Option<VmSelector>,
    args: Vec<String>,
    flags: Vec<String>,
    detach: bool,
}

impl MemucCommand {
    /// A command that does not address a VM
    pub fn new(subcommand: &str) -> Self {
        Self {
            subcommand: subcommand.to_string(),
            selector: None,
            args: Vec::new(),
            flags: Vec::new(),
            detach: false,
        }
    }

    /// A command addressing exactly one VM.
    ///
    /// Fails before any token is produced when the target is ambiguous.
    pub fn for_vm(subcommand: &str, target: &VmTarget) -> Result<Self, SelectorError> {
        let selector = target.resolve()?;
        Ok(Self::new(subcommand).selector(selector))
    }

    /// A command that may optionally be narrowed to one VM
    pub fn for_optional_vm(subcommand: &str, target: Option<&VmTarget>) -> Result<Self, SelectorError> {
        match target {
            Some(target) => Self::for_vm(subcommand, target),
            None => Ok(Self::new(subcommand)),
        }
    }

    fn selector(mut self, selector: VmSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Append a positional argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several positional arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a numeric positional argument
    pub fn float(self, value: f64) -> Self {
        self.arg(format_float(value))
    }

    /// Append a trailing option flag
    pub fn flag(mut self, flag: &str) -> Self {
        self.flags.push(flag.to_string());
        self
    }

    /// Append a trailing option flag when `enabled`
    pub fn flag_if(self, enabled: bool, flag: &str) -> Self {
        if enabled {
            self.flag(flag)
        } else {
            self
        }
    }

    /// Append a trailing option flag followed by its value, when a value is given
    pub fn option(mut self, flag: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.flags.push(flag.to_string());
            self.flags.push(value.to_string());
        }
        self
    }

    /// Run as a background task
    pub fn detach(mut self, detach: bool) -> Self {
        self.detach = detach;
        self
    }

    pub fn build(self) -> Invocation {
        let mut tokens = Vec::with_capacity(4 + self.args.len() + self.flags.len());
        tokens.push(self.subcommand);

        if let Some(selector) = self.selector {
            tokens.extend(selector.to_args());
        }

        tokens.extend(self.args);
        tokens.extend(self.flags);

        if self.detach {
            tokens.push(DETACH_FLAG.to_string());
        }

        Invocation {
            tokens,
            detach: self.detach,
        }
    }
}

/// Locale-independent decimal rendering: `.` separator, no grouping,
/// shortest representation that round-trips.
pub fn format_float(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(invocation: &Invocation) -> Vec<&str> {
        invocation.tokens().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_start_by_index_detached() {
        let invocation = MemucCommand::for_vm("start", &VmTarget::index(3))
            .unwrap()
            .detach(true)
            .build();

        assert_eq!(tokens(&invocation), ["start", "-i", "3", "-t"]);
        assert!(invocation.is_detached());
        assert_eq!(invocation.tokens().iter().filter(|t| *t == "-i").count(), 1);
        assert_eq!(invocation.tokens().last().map(String::as_str), Some(DETACH_FLAG));
    }

    #[test]
    fn test_positional_before_flags() {
        let invocation = MemucCommand::for_vm("installapp", &VmTarget::name("MEmu_2"))
            .unwrap()
            .flag_if(true, "-s")
            .arg(r"C:\apks\app.apk")
            .build();

        assert_eq!(tokens(&invocation), ["installapp", "-n", "MEmu_2", r"C:\apks\app.apk", "-s"]);
        assert_eq!(invocation.subcommand(), "installapp");
        assert!(!invocation.is_detached());
    }

    #[test]
    fn test_disabled_flag_leaves_no_empty_token() {
        let invocation = MemucCommand::new("listvms")
            .flag_if(false, "-r")
            .flag_if(false, "-s")
            .build();

        assert_eq!(tokens(&invocation), ["listvms"]);
    }

    #[test]
    fn test_optional_vm() {
        let all = MemucCommand::for_optional_vm("listvms", None).unwrap().build();
        assert_eq!(tokens(&all), ["listvms"]);

        let one = MemucCommand::for_optional_vm("listvms", Some(&VmTarget::index(1)))
            .unwrap()
            .build();
        assert_eq!(tokens(&one), ["listvms", "-i", "1"]);
    }

    #[test]
    fn test_invalid_target_fails_before_build() {
        let target = VmTarget {
            index: Some(1),
            name: Some("MEmu_1".into()),
        };
        assert!(MemucCommand::for_vm("stop", &target).is_err());
        assert!(MemucCommand::for_vm("stop", &VmTarget::default()).is_err());
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(37.7749), "37.7749");
        assert_eq!(format_float(-122.4194), "-122.4194");
        assert_eq!(format_float(9.81), "9.81");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(1234567.5), "1234567.5");

        let invocation = MemucCommand::for_vm("setgps", &VmTarget::index(0))
            .unwrap()
            .float(37.7749)
            .float(-122.4194)
            .build();
        assert_eq!(tokens(&invocation), ["setgps", "-i", "0", "37.7749", "-122.4194"]);
    }

    #[test]
    fn test_option_with_value() {
        let invocation = MemucCommand::for_vm("clone", &VmTarget::index(0))
            .unwrap()
            .option("-r", Some("MEmu_copy"))
            .detach(true)
            .build();
        assert_eq!(tokens(&invocation), ["clone", "-i", "0", "-r", "MEmu_copy", "-t"]);

        let invocation = MemucCommand::for_vm("clone", &VmTarget::index(0))
            .unwrap()
            .option("-r", None)
            .build();
        assert_eq!(tokens(&invocation), ["clone", "-i", "0"]);
    }

    #[test]
    fn test_command_line() {
        let invocation = MemucCommand::new("stopall").detach(true).build();
        assert_eq!(invocation.command_line(), "stopall -t");
    }
}
