//! Warehouse location parsing.
//!
//! Accepts `sqlite://path`, `sqlite:path`, `sqlite::memory:`, `:memory:`
//! and bare filesystem paths.

use std::path::PathBuf;

/// Error type for warehouse location parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Unsupported warehouse URL scheme: {0}. Supported: sqlite")]
    UnsupportedScheme(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Where the warehouse lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarehouseTarget {
    /// A SQLite database file.
    File(PathBuf),
    /// A private in-memory database, shared between the pool's connections.
    Memory,
}

impl WarehouseTarget {
    /// Parse a warehouse URL.
    ///
    /// Accepted forms: `sqlite://<path>`, `sqlite:<path>`, `sqlite::memory:`,
    /// `:memory:` and a bare filesystem path.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(url: &str) -> Result<Self, ConnectionError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "warehouse URL is empty".to_string(),
            ));
        }

        let rest = if let Some(rest) = url.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = url.strip_prefix("sqlite:") {
            rest
        } else if let Some((scheme, _)) = url.split_once("://") {
            return Err(ConnectionError::UnsupportedScheme(scheme.to_string()));
        } else {
            url
        };

        // Drop query options such as `?mode=rwc`
        let rest = rest.split('?').next().unwrap_or(rest);

        match rest {
            ":memory:" | "" => Ok(WarehouseTarget::Memory),
            path => Ok(WarehouseTarget::File(PathBuf::from(path))),
        }
    }

    /// Human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            WarehouseTarget::File(path) => path.display().to_string(),
            WarehouseTarget::Memory => ":memory:".to_string(),
        }
    }
}
