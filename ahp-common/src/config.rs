//! Configuration loading for the criteria analysis service
//!
//! The service builds one [`ServiceConfig`] at startup and hands it to the
//! router state. Nothing reads configuration from globals afterwards.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (and their environment fallbacks)
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)
//!
//! The TOML file itself is located in this order:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. Platform config file (`~/.config/ahp/config.toml`, then
//!    `/etc/ahp/config.toml` on Linux)
//!
//! A missing file is not an error; an explicit file that cannot be read or
//! parsed is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML file
pub const CONFIG_ENV_VAR: &str = "AHP_CA_CONFIG";

const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REPORTS_DIR: &str = "reports";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration as written in the TOML file
///
/// Every field is optional; missing values fall back to built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Interface to bind, e.g. "127.0.0.1"
    #[serde(default)]
    pub bind: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Directory generated reports are written to and served from
    #[serde(default)]
    pub reports_dir: Option<PathBuf>,

    /// CORS origins allowed to call the upload endpoint
    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,

    /// Request body limit for uploads
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

/// Command-line overrides (highest priority)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub reports_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind: String,
    pub port: u16,
    pub reports_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration: overrides, then TOML file, then defaults
    ///
    /// # Errors
    ///
    /// Returns error if a located TOML file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match resolve_config_path(overrides.config_path.as_deref(), CONFIG_ENV_VAR)
        {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                TomlConfig::from_file(&path)?
            }
            None => {
                warn!("No configuration file found, using built-in defaults");
                TomlConfig::default()
            }
        };

        let config = Self::merge(toml_config, overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply TOML values over defaults, then overrides over both
    pub fn merge(toml_config: TomlConfig, overrides: ConfigOverrides) -> Self {
        let defaults = Self::default();
        Self {
            bind: overrides.bind.or(toml_config.bind).unwrap_or(defaults.bind),
            port: overrides.port.or(toml_config.port).unwrap_or(defaults.port),
            reports_dir: overrides
                .reports_dir
                .or(toml_config.reports_dir)
                .unwrap_or(defaults.reports_dir),
            allowed_origins: toml_config
                .allowed_origins
                .unwrap_or(defaults.allowed_origins),
            max_upload_bytes: toml_config
                .max_upload_bytes
                .unwrap_or(defaults.max_upload_bytes),
            log_level: overrides
                .log_level
                .or(toml_config.logging.level)
                .unwrap_or(defaults.log_level),
        }
    }

    /// Reject values the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be positive".to_string()));
        }
        if self.reports_dir.as_os_str().is_empty() {
            return Err(Error::Config("reports_dir must not be empty".to_string()));
        }
        Ok(())
    }

    /// `bind:port` for the TCP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Locate the TOML file following the priority order in the module docs
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config file, only if present
    platform_config_file()
}

/// Get default configuration file path for the platform, if one exists
fn platform_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("ahp").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/ahp/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
