//! Configuration system for the trace frontend
//!
//! Provides:
//! - Config file discovery (CLI flag, env var, standard paths)
//! - TOML parsing with serde
//! - Environment variable overrides
//! - Validation

use crate::query::DEFAULT_SERVICE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete frontend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Process settings
    pub server: ServerSettings,

    /// HTTP settings
    pub web: WebSettings,

    /// Trace search settings
    pub trace: TraceSettings,

    /// Known clusters
    pub clusters: ClusterSettings,

    /// Trace store settings
    pub store: StoreSettings,
}

/// Process settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    /// Serve the trace API
    pub enabled: bool,

    /// Host to bind
    pub host: String,

    /// Port to bind
    pub port: u16,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Trace search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Service name object traces are recorded under
    pub service_name: String,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

/// Known clusters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    pub names: Vec<String>,
}

/// Trace store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// JSONL file with one trace per line
    pub path: Option<String>,

    /// Strip span logs from search results
    pub shallow_search: bool,
}

/// Configuration loader
pub struct ConfigLoader {
    /// Path to config file (if specified via CLI)
    cli_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self { cli_path: None }
    }

    /// Set the config path from CLI argument
    pub fn with_cli_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_path = path;
        self
    }

    /// Load configuration with the following precedence:
    /// 1. CLI --config flag
    /// 2. OBJTRACE_CONFIG environment variable
    /// 3. ~/.config/objtrace/config.toml
    /// 4. /etc/objtrace/config.toml
    /// 5. Default values
    pub fn load(&self) -> ConfigResult<FrontendConfig> {
        let mut config = match self.find_config_file() {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                Self::load_from_file(&path)?
            }
            None => {
                debug!("No config file found, using defaults");
                FrontendConfig::default()
            }
        };

        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        validate(&config)?;

        Ok(config)
    }

    /// Find the config file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!("CLI config path does not exist: {}", path.display());
        }

        if let Ok(env_path) = std::env::var("OBJTRACE_CONFIG") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Some(path);
            }
            warn!("OBJTRACE_CONFIG path does not exist: {}", env_path);
        }

        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Some(path);
            }
        }

        #[cfg(unix)]
        {
            let path = PathBuf::from("/etc/objtrace/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> ConfigResult<FrontendConfig> {
        let content = std::fs::read_to_string(path)?;
        let config: FrontendConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the default config file path for the current platform
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("objtrace").join("config.toml"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply environment variable overrides, reading variables through `var`
fn apply_env_overrides(config: &mut FrontendConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("OBJTRACE_LOG_LEVEL") {
        config.server.log_level = val;
    }

    if let Some(val) = var("OBJTRACE_WEB_HOST") {
        config.web.host = val;
    }
    if let Some(val) = var("OBJTRACE_WEB_PORT") {
        match val.parse() {
            Ok(port) => config.web.port = port,
            Err(_) => warn!("Ignoring invalid OBJTRACE_WEB_PORT: {}", val),
        }
    }
    if let Some(val) = var("OBJTRACE_WEB_ENABLED") {
        match val.parse() {
            Ok(enabled) => config.web.enabled = enabled,
            Err(_) => warn!("Ignoring invalid OBJTRACE_WEB_ENABLED: {}", val),
        }
    }

    if let Some(val) = var("OBJTRACE_SERVICE_NAME") {
        config.trace.service_name = val;
    }

    if let Some(val) = var("OBJTRACE_CLUSTERS") {
        config.clusters.names = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(val) = var("OBJTRACE_STORE_PATH") {
        config.store.path = Some(val);
    }
}

/// Validate configuration
fn validate(config: &FrontendConfig) -> ConfigResult<()> {
    if !VALID_LOG_LEVELS.contains(&config.server.log_level.to_lowercase().as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "Invalid log level: {}. Must be one of: {:?}",
            config.server.log_level, VALID_LOG_LEVELS
        )));
    }

    if config.web.port == 0 {
        return Err(ConfigError::ValidationError(
            "Web port cannot be 0".to_string(),
        ));
    }

    if config.trace.service_name.is_empty() {
        return Err(ConfigError::ValidationError(
            "Trace service name cannot be empty".to_string(),
        ));
    }

    if config.clusters.names.iter().any(|name| name.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "Cluster names cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Helper module for platform-specific directories
mod dirs {
    use std::path::PathBuf;

    /// Get the user's config directory
    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        }

        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".config"))
                })
        }

        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }
}
