//! Dev tools configuration (`devtools.toml`)
//!
//! Read once at startup and never changed while a session runs. Settings are
//! stored in TOML format in the platform-specific config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout::LayoutConfig;

/// File name inside [`config_dir`]
pub const CONFIG_FILE: &str = "devtools.toml";

/// Errors from reading or writing a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Which dev tools are active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevToolsConfig {
    /// Validate component props on every render (default: true)
    #[serde(default = "default_true")]
    pub props_check: bool,
    /// Show the debug menu and in-page error list (default: true)
    #[serde(default = "default_true")]
    pub ui: bool,
    /// Hot reload indicator in the menu (default: true)
    #[serde(default = "default_true")]
    pub hot_reload: bool,
    /// Callback graph placement
    #[serde(default)]
    pub layout: LayoutConfig,
}

fn default_true() -> bool {
    true
}

impl Default for DevToolsConfig {
    fn default() -> Self {
        Self {
            props_check: default_true(),
            ui: default_true(),
            hot_reload: default_true(),
            layout: LayoutConfig::default(),
        }
    }
}

impl DevToolsConfig {
    /// Everything off, as for a production run.
    pub fn disabled() -> Self {
        Self {
            props_check: false,
            ui: false,
            hot_reload: false,
            layout: LayoutConfig::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Devlens\config`
/// On macOS: `~/Library/Application Support/io.devlens.Devlens`
/// On Linux: `~/.config/Devlens`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.devlens", "", "Devlens")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `devtools.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> DevToolsConfig {
    let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE)) else {
        return DevToolsConfig::default();
    };
    if !path.exists() {
        return DevToolsConfig::default();
    }

    match load_from_path(&path) {
        Ok(config) => {
            for warning in validate(&config) {
                tracing::warn!("{warning}");
            }
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "using default dev tools config");
            DevToolsConfig::default()
        }
    }
}

/// Loads the configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<DevToolsConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    DevToolsConfig::from_toml_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the configuration to `path`, creating parent directories.
pub fn save_to_path(config: &DevToolsConfig, path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(io_err)
}

/// Check values that parse but make no sense.
///
/// Returns a list of warning messages.
pub fn validate(config: &DevToolsConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let spacings = [
        (config.layout.layer_spacing, "layout.layer_spacing"),
        (config.layout.node_spacing, "layout.node_spacing"),
    ];
    for (value, name) in spacings {
        if !value.is_finite() || value <= 0.0 {
            warnings.push(format!("{name} should be a positive number, got {value}"));
        }
    }
    if !config.ui && config.hot_reload {
        warnings.push("hot_reload has no visible indicator while ui is disabled".to_string());
    }
    warnings
}
