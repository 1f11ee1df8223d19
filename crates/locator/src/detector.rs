//! memuc Detection
//!
//! Finds the memuc executable shipped with a MEmu installation.

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use which::which;

use memu_core::MemucConfig;

/// Environment variable pointing straight at the executable
pub const MEMUC_PATH_VAR: &str = "MEMUC_PATH";

/// Environment variable pointing at the MEmu install directory
pub const MEMU_HOME_VAR: &str = "MEMU_HOME";

/// File name of the control tool
pub const MEMUC_EXECUTABLE: &str = if cfg!(windows) { "memuc.exe" } else { "memuc" };

/// Uninstall keys under `HKEY_LOCAL_MACHINE` holding MEmu's `InstallLocation`
pub const UNINSTALL_KEYS: [&str; 2] = [
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\MEmu",
    r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall\MEmu",
];

/// Discovery errors
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("memuc not found, is MEmu installed?")]
    NotFound,
    #[error("memuc path is not an executable file: {0}")]
    InvalidPath(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the executable was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// Explicit path from configuration or caller
    Explicit,
    /// `MEMUC_PATH`
    MemucPathVar,
    /// `MEMU_HOME`
    MemuHomeVar,
    /// `InstallLocation` from the Windows uninstall registry
    Registry,
    /// Well-known install directory
    InstallDir,
    /// Found on `PATH`
    SearchPath,
}

/// Result of memuc detection
#[derive(Debug, Clone)]
pub struct MemucInstallation {
    pub path: PathBuf,
    pub source: LocationSource,
}

/// memuc locator
#[derive(Debug, Clone, Default)]
pub struct MemucLocator {
    explicit: Option<PathBuf>,
    memuc_path_var: Option<PathBuf>,
    memu_home_var: Option<PathBuf>,
    registry: bool,
    install_dirs: Vec<PathBuf>,
    search_path: bool,
}

impl MemucLocator {
    /// Locator reading the process environment and the usual install directories
    pub fn from_env() -> Self {
        Self {
            explicit: None,
            memuc_path_var: env::var_os(MEMUC_PATH_VAR).map(PathBuf::from),
            memu_home_var: env::var_os(MEMU_HOME_VAR).map(PathBuf::from),
            registry: true,
            install_dirs: Self::install_candidates(),
            search_path: true,
        }
    }

    /// Locator honouring the configured path before anything else
    pub fn from_config(config: &MemucConfig) -> Self {
        let mut locator = Self::from_env();
        locator.explicit = config.memuc_path.clone();
        locator
    }

    /// Locator that only consults what the caller adds
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    pub fn with_memuc_path_var(mut self, path: impl Into<PathBuf>) -> Self {
        self.memuc_path_var = Some(path.into());
        self
    }

    pub fn with_memu_home_var(mut self, dir: impl Into<PathBuf>) -> Self {
        self.memu_home_var = Some(dir.into());
        self
    }

    pub fn with_registry(mut self, enabled: bool) -> Self {
        self.registry = enabled;
        self
    }

    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dirs.push(dir.into());
        self
    }

    pub fn with_search_path(mut self, enabled: bool) -> Self {
        self.search_path = enabled;
        self
    }

    /// Well-known MEmu install directories
    fn install_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if cfg!(windows) {
            for drive in ["C", "D"] {
                candidates.push(PathBuf::from(format!(r"{}:\Program Files\Microvirt\MEmu", drive)));
                candidates.push(PathBuf::from(format!(r"{}:\Program Files (x86)\Microvirt\MEmu", drive)));
            }
            if let Some(local) = dirs::data_local_dir() {
                candidates.push(local.join("Microvirt").join("MEmu"));
            }
        }

        candidates
    }

    /// memuc inside an uninstall entry's `InstallLocation`
    pub fn memuc_in_install_location(location: &Path) -> PathBuf {
        location.join("Memu").join(MEMUC_EXECUTABLE)
    }

    #[cfg(windows)]
    fn registry_install_locations() -> Vec<PathBuf> {
        use winreg::enums::HKEY_LOCAL_MACHINE;
        use winreg::RegKey;

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        UNINSTALL_KEYS
            .iter()
            .filter_map(|key| match hklm.open_subkey(key) {
                Ok(entry) => entry.get_value::<String, _>("InstallLocation").ok(),
                Err(e) => {
                    debug!("Registry key {} unavailable: {}", key, e);
                    None
                }
            })
            .filter(|location| !location.trim().is_empty())
            .map(PathBuf::from)
            .collect()
    }

    #[cfg(not(windows))]
    fn registry_install_locations() -> Vec<PathBuf> {
        Vec::new()
    }

    fn is_executable_file(path: &Path) -> bool {
        path.is_file()
    }

    /// Resolve the executable path.
    ///
    /// An explicit path that does not exist is an error rather than a
    /// reason to keep searching.
    pub fn locate(&self) -> Result<MemucInstallation, DiscoveryError> {
        info!("Detecting memuc...");

        if let Some(ref path) = self.explicit {
            if Self::is_executable_file(path) {
                return Ok(Self::found(path, LocationSource::Explicit));
            }
            return Err(DiscoveryError::InvalidPath(path.clone()));
        }

        if let Some(ref path) = self.memuc_path_var {
            debug!("Checking {}={:?}", MEMUC_PATH_VAR, path);
            if Self::is_executable_file(path) {
                return Ok(Self::found(path, LocationSource::MemucPathVar));
            }
        }

        if let Some(ref dir) = self.memu_home_var {
            let path = dir.join(MEMUC_EXECUTABLE);
            debug!("Checking {}={:?}", MEMU_HOME_VAR, path);
            if Self::is_executable_file(&path) {
                return Ok(Self::found(&path, LocationSource::MemuHomeVar));
            }
        }

        if self.registry {
            for location in Self::registry_install_locations() {
                let path = Self::memuc_in_install_location(&location);
                debug!("Checking registry install location {:?}", path);
                if Self::is_executable_file(&path) {
                    return Ok(Self::found(&path, LocationSource::Registry));
                }
            }
        }

        for dir in &self.install_dirs {
            let path = dir.join(MEMUC_EXECUTABLE);
            if Self::is_executable_file(&path) {
                return Ok(Self::found(&path, LocationSource::InstallDir));
            }
        }

        if self.search_path {
            if let Ok(path) = which("memuc") {
                return Ok(Self::found(&path, LocationSource::SearchPath));
            }
        }

        Err(DiscoveryError::NotFound)
    }

    fn found(path: &Path, source: LocationSource) -> MemucInstallation {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        info!("Found memuc at {:?} ({:?})", path, source);
        MemucInstallation { path, source }
    }
}
