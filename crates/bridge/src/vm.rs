//! VM Records and Value Types
//!
//! Structured values extracted from memuc output.

use serde::{Deserialize, Serialize};

/// One row of `memuc listvms` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmInfo {
    /// VM index
    pub index: u32,
    /// VM title
    pub name: String,
    /// Top-level window handle, opaque
    pub top_level_window_handle: String,
    /// Whether the VM is running
    pub running: bool,
    /// Process ID, 0 when not running
    pub pid: u32,
    /// Disk usage, only present when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_usage: Option<String>,
}

impl VmInfo {
    /// Disk usage in bytes when memuc reported a plain integer
    pub fn disk_usage_bytes(&self) -> Option<u64> {
        self.disk_usage.as_deref().and_then(|d| d.trim().parse().ok())
    }
}

/// Opaque handle returned by a detached memuc command
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a detached task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Success,
    Running,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Success => "success",
            TaskStatus::Running => "running",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, TaskStatus::Running)
    }
}

/// Result of an operation that may run as a background task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// memuc ran to completion
    Completed(T),
    /// memuc accepted the task and returned its id
    Detached(TaskId),
}

impl<T> Outcome<T> {
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            Outcome::Detached(id) => Some(id),
            Outcome::Completed(_) => None,
        }
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Detached(_) => None,
        }
    }
}

/// Keys accepted by `memuc sendkey`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keystroke {
    Back,
    Home,
    Menu,
    VolumeUp,
    VolumeDown,
}

impl Keystroke {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keystroke::Back => "back",
            Keystroke::Home => "home",
            Keystroke::Menu => "menu",
            Keystroke::VolumeUp => "volumeup",
            Keystroke::VolumeDown => "volumedown",
        }
    }
}

impl std::str::FromStr for Keystroke {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "back" => Ok(Keystroke::Back),
            "home" => Ok(Keystroke::Home),
            "menu" => Ok(Keystroke::Menu),
            "volumeup" => Ok(Keystroke::VolumeUp),
            "volumedown" => Ok(Keystroke::VolumeDown),
            other => Err(format!("unknown key: {}", other)),
        }
    }
}

/// A VM configuration key for `getconfigex` / `setconfigex`.
///
/// The key set is open-ended; the constants cover the documented ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey(String);

impl ConfigKey {
    pub const NAME: &'static str = "name";
    pub const CPUS: &'static str = "cpus";
    pub const CPU_CAP: &'static str = "cpucap";
    pub const MEMORY: &'static str = "memory";
    pub const IS_FULL_SCREEN: &'static str = "is_full_screen";
    pub const IS_HIDE_TOOLBAR: &'static str = "is_hide_toolbar";
    pub const TURBO_MODE: &'static str = "turbo_mode";
    pub const GRAPHICS_RENDER_MODE: &'static str = "graphics_render_mode";
    pub const ENABLE_SU: &'static str = "enable_su";
    pub const ENABLE_AUDIO: &'static str = "enable_audio";
    pub const FPS: &'static str = "fps";
    pub const VIRTUAL_KEYBOARD_MODE: &'static str = "virtual_keyboard_mode";
    pub const SYNC_TIME: &'static str = "sync_time";
    pub const PHONE_LAYOUT: &'static str = "phone_layout";
    pub const START_WINDOW_MODE: &'static str = "start_window_mode";
    pub const WIN_X: &'static str = "win_x";
    pub const WIN_Y: &'static str = "win_y";
    pub const WIN_SCALING_PERCENT: &'static str = "win_scaling_percent2";
    pub const IS_CUSTOM_RESOLUTION: &'static str = "is_custom_resolution";
    pub const RESOLUTION_WIDTH: &'static str = "resolution_width";
    pub const RESOLUTION_HEIGHT: &'static str = "resolution_height";
    pub const VBOX_DPI: &'static str = "vbox_dpi";
    pub const LINENUM: &'static str = "linenum";
    pub const IMEI: &'static str = "imei";
    pub const IMSI: &'static str = "imsi";
    pub const SIM_SERIAL: &'static str = "simserial";
    pub const VM_BRAND: &'static str = "microvirt_vm_brand";
    pub const VM_MODEL: &'static str = "microvirt_vm_model";
    pub const VM_MANUFACTURER: &'static str = "microvirt_vm_manufacturer";
    pub const SELECTED_MAP: &'static str = "selected_map";
    pub const LATITUDE: &'static str = "latitude";
    pub const LONGITUDE: &'static str = "longitude";
    pub const PICTURE_PATH: &'static str = "picturepath";
    pub const MUSIC_PATH: &'static str = "musicpath";
    pub const MOVIE_PATH: &'static str = "moviepath";
    pub const DOWNLOAD_PATH: &'static str = "downloadpath";

    /// Wrap a key, rejecting the empty string
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Host and port of a VM's ADB endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdbConnection {
    pub host: String,
    pub port: u16,
}

impl AdbConnection {
    /// `host:port` form accepted by `adb connect`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
