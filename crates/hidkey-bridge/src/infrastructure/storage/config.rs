//! TOML-based configuration for the bridge.
//!
//! Reads and writes `AppConfig` from `--config <path>` or the
//! platform-appropriate config file:
//! - Windows:  `%APPDATA%\hidkey\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/hidkey/config.toml` or `~/.config/hidkey/config.toml`
//! - macOS:    `~/Library/Application Support/hidkey/config.toml`
//!
//! # Layout
//!
//! ```toml
//! [bridge]
//! log_level = "info"
//! discovery_interval_ms = 1000
//! housekeeping_byte = 7
//!
//! [[devices]]
//! name = "panel"
//! path = ""
//! vendor_id = 121
//! product_id = 6
//! report_length = 8
//!
//! [[devices.inputs]]
//! name = "DI_K1"
//! byte = 6
//! bit = 4
//! key = "a"
//! ```
//!
//! An input with no `key` (or `key = ""`) is wired but unused.
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, so a config
//! only needs to spell out what differs from the defaults.

use std::path::{Path, PathBuf};

use hidkey_core::{BindingError, DigitalInput, KeyMappingTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::run_session::SessionContext;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The config parsed but describes something the bridge cannot run.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// An input is bound to a key that cannot be resolved.
    #[error("device {device}: {source}")]
    Binding {
        device: String,
        #[source]
        source: BindingError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Poll interval while waiting for configured devices to appear.
    #[serde(default = "default_discovery_interval_ms")]
    pub discovery_interval_ms: u64,
    /// Byte left out of diagnostic output.  It changes on every report.
    #[serde(default = "default_housekeeping_byte")]
    pub housekeeping_byte: Option<usize>,
}

/// One button panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Name used in logs and on the command line.
    pub name: String,
    /// Case-insensitive substring of the hidapi device path.  Empty matches
    /// any path.
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u16>,
    /// Length in bytes of every input report this device sends.
    #[serde(default = "default_report_length")]
    pub report_length: usize,
    /// Wired inputs, in the order their taps are emitted.
    #[serde(default)]
    pub inputs: Vec<DigitalInput>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_discovery_interval_ms() -> u64 {
    1000
}
fn default_housekeeping_byte() -> Option<usize> {
    Some(hidkey_core::domain::diagnostic::DEFAULT_HOUSEKEEPING_BYTE)
}
fn default_report_length() -> usize {
    8
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            discovery_interval_ms: default_discovery_interval_ms(),
            housekeeping_byte: default_housekeeping_byte(),
        }
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

impl AppConfig {
    /// A one-panel starter config with three switches on byte 6.
    pub fn sample() -> Self {
        let input = |name: &str, bit: u8, key: &str| DigitalInput {
            name: name.to_string(),
            byte: 6,
            bit,
            key: Some(key.to_string()),
        };
        Self {
            bridge: BridgeConfig::default(),
            devices: vec![DeviceConfig {
                name: "panel".to_string(),
                path: String::new(),
                vendor_id: Some(121),
                product_id: Some(6),
                report_length: default_report_length(),
                inputs: vec![input("DI_K1", 4, "a"), input("DI_K2", 5, "b"), input("DI_K3", 6, "c")],
            }],
        }
    }

    /// Looks a device up by name.
    pub fn device(&self, name: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Checks that every device can be turned into a session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty device list, a duplicate
    /// device name, a zero report length, or an input outside its report, and
    /// [`ConfigError::Binding`] for an unknown key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::Invalid("no devices configured".to_string()));
        }

        for (index, device) in self.devices.iter().enumerate() {
            if self.devices[..index].iter().any(|d| d.name == device.name) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate device name {:?}",
                    device.name
                )));
            }
            device.validate()?;
        }
        Ok(())
    }
}

impl DeviceConfig {
    /// Checks report length, input positions and key names.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::validate`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_length == 0 {
            return Err(ConfigError::Invalid(format!(
                "device {}: report_length must be at least 1",
                self.name
            )));
        }

        for input in &self.inputs {
            if input.byte >= self.report_length {
                return Err(ConfigError::Invalid(format!(
                    "device {}: input {} reads byte {} but reports are {} bytes",
                    self.name, input.name, input.byte, self.report_length
                )));
            }
            if input.bit > 7 {
                return Err(ConfigError::Invalid(format!(
                    "device {}: input {} has bit {} (must be 0-7)",
                    self.name, input.name, input.bit
                )));
            }
        }

        self.mapping_table().map(|_| ())
    }

    /// Resolves this device's inputs into a mapping table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Binding`] if an input names an unknown key.
    pub fn mapping_table(&self) -> Result<KeyMappingTable, ConfigError> {
        KeyMappingTable::from_inputs(&self.inputs).map_err(|source| ConfigError::Binding {
            device: self.name.clone(),
            source,
        })
    }

    /// Builds the context a session for this device runs with.
    ///
    /// # Errors
    ///
    /// Same as [`DeviceConfig::mapping_table`].
    pub fn session_context(&self) -> Result<SessionContext, ConfigError> {
        Ok(SessionContext {
            device_name: self.name.clone(),
            report_len: self.report_length,
            table: self.mapping_table()?,
        })
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig`.
///
/// With an explicit `path` the file must exist.  Without one the default
/// location is used, and a missing file yields `AppConfig::default()`.
/// The result is not validated.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, must_exist) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (config_file_path()?, false),
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !must_exist => {
            Ok(AppConfig::default())
        }
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Parses TOML text into an `AppConfig`.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Writes `config` to `path`, or to the default location.
///
/// Creates the parent directory if it does not exist.  Returns the path that
/// was written.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Resolves the platform config directory, including the `hidkey` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("hidkey"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("hidkey"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("hidkey"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
