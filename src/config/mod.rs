//! Configuration module for mdwarehouse.
//!
//! Handles the warehouse location, environment variables, and settings.
//! A [`Settings`] value is built once by the caller and passed down; nothing
//! in the crate reads configuration lazily.

mod connection;
mod settings;

pub use connection::{ConnectionError, WarehouseTarget};
pub use settings::{
    expand_env_vars, ApiSettings, IngestSettings, PoolSettings, Settings, SettingsError,
    WarehouseSettings, DEFAULT_WAREHOUSE_URL,
};
