//! TOML-based configuration for mdwarehouse.
//!
//! Supports a config file (mdwarehouse.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [warehouse]
//! url = "sqlite://${MDW_DATA_DIR}/warehouse.db"
//!
//! [warehouse.pool]
//! max_idle_conns = 5
//! pre_ping = true
//! busy_timeout_ms = 5000
//!
//! [api]
//! title = "Maryland Data Engineering API"
//! version = "1.0.0"
//!
//! [ingest]
//! county_suffix_policy = "keep_city"
//! register_new_counties = false
//! known_counties = ["Allegany", "Anne Arundel", "Baltimore City"]
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::{ConnectionError, WarehouseTarget};
use crate::counties::SuffixPolicy;

/// Warehouse file used when nothing else is configured.
pub const DEFAULT_WAREHOUSE_URL: &str = "sqlite://mdwarehouse.db";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid warehouse location: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Warehouse location and pool.
    pub warehouse: WarehouseSettings,

    /// Reporting surface metadata.
    pub api: ApiSettings,

    /// Ingestion behaviour.
    pub ingest: IngestSettings,
}

/// Warehouse configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WarehouseSettings {
    /// Warehouse URL (supports ${ENV_VAR} expansion).
    pub url: Option<String>,

    /// Connection pool settings.
    pub pool: PoolSettings,
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum number of idle connections kept for reuse.
    pub max_idle_conns: u32,

    /// Probe each connection with `SELECT 1` before handing it out.
    pub pre_ping: bool,

    /// SQLite busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_conns: 5,
            pre_ping: true,
            busy_timeout_ms: 5000,
        }
    }
}

/// Reporting surface metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSettings {
    pub title: String,

    /// Version string reported by the health check.
    pub version: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            title: "Maryland Data Engineering API".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

/// Ingestion settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestSettings {
    /// How "County"/"City" suffixes are treated when building lookup keys.
    pub county_suffix_policy: SuffixPolicy,

    /// Create new canonical counties for names seen in source data.
    ///
    /// When false the directory is closed: only counties already in the
    /// warehouse or listed in `known_counties` resolve.
    pub register_new_counties: bool,

    /// Counties registered before any source record is read.
    pub known_counties: Vec<String>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            county_suffix_policy: SuffixPolicy::default(),
            register_new_counties: true,
            known_counties: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `MDWAREHOUSE_CONFIG`
    /// 2. `./mdwarehouse.toml`
    /// 3. `~/.config/mdwarehouse/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("MDWAREHOUSE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("mdwarehouse.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("mdwarehouse").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.api.version.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "api.version must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve where the warehouse lives.
    ///
    /// `DATABASE_URL` overrides the configured `warehouse.url`; without either
    /// the default file `mdwarehouse.db` is used.
    pub fn warehouse_target(&self) -> Result<WarehouseTarget, SettingsError> {
        if let Ok(url) = env::var("DATABASE_URL") {
            return Ok(WarehouseTarget::from_str(&url)?);
        }
        match &self.warehouse.url {
            Some(url) => Ok(WarehouseTarget::from_str(&expand_env_vars(url)?)?),
            None => Ok(WarehouseTarget::from_str(DEFAULT_WAREHOUSE_URL)?),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        while let Some(&ch) = chars.peek() {
            if braced && ch == '}' {
                chars.next();
                break;
            }
            if !braced && !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            var_name.push(ch);
            chars.next();
        }

        if var_name.is_empty() && !braced {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
