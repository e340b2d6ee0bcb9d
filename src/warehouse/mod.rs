//! Warehouse access layer.
//!
//! Everything above this module talks to the warehouse through the
//! [`Warehouse`] trait: run one statement with named parameters, get back
//! engine-neutral [`Row`]s. The SQLite implementation owns a
//! [`ConnectionPool`] that probes connections before handing them out.
//!
//! ```text
//! ┌───────────────────────┐      ┌──────────────────────┐
//! │  QueryEngine          │ ───▶ │  dyn Warehouse       │
//! │  (variant fallback)   │      │  fetch_all / ping    │
//! └───────────────────────┘      └──────────┬───────────┘
//!                                           │
//!                                ┌──────────▼───────────┐
//!                                │  SqliteWarehouse     │
//!                                │  └─ ConnectionPool   │
//!                                └──────────────────────┘
//! ```

mod pool;
pub mod schema;
mod sqlite;
mod value;

use std::sync::Arc;

pub use pool::{AccessMode, ConnectionPool, PooledConnection};
pub use sqlite::SqliteWarehouse;
pub use value::{QueryParams, Row, Value};

/// Errors raised while talking to the warehouse.
///
/// Any of these returned from [`Warehouse::fetch_all`] counts as a
/// data-access failure for query resolution.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to open warehouse {target}: {source}")]
    Open {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Column not found in result: {0}")]
    MissingColumn(String),

    #[error("Unexpected NULL in column {0}")]
    UnexpectedNull(String),

    #[error("Column {column} does not hold a valid {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
    },

    #[error("Warehouse unavailable: {0}")]
    Unavailable(String),
}

pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// A store that can run parameterized read queries.
pub trait Warehouse: Send + Sync {
    /// Run one statement and return every row.
    ///
    /// Parameters the statement does not reference are ignored.
    fn fetch_all(&self, sql: &str, params: &QueryParams) -> WarehouseResult<Vec<Row>>;

    /// Round-trip a trivial statement to prove the warehouse is reachable.
    fn ping(&self) -> WarehouseResult<()>;
}

impl<W: Warehouse + ?Sized> Warehouse for &W {
    fn fetch_all(&self, sql: &str, params: &QueryParams) -> WarehouseResult<Vec<Row>> {
        (**self).fetch_all(sql, params)
    }

    fn ping(&self) -> WarehouseResult<()> {
        (**self).ping()
    }
}

impl<W: Warehouse + ?Sized> Warehouse for Arc<W> {
    fn fetch_all(&self, sql: &str, params: &QueryParams) -> WarehouseResult<Vec<Row>> {
        (**self).fetch_all(sql, params)
    }

    fn ping(&self) -> WarehouseResult<()> {
        (**self).ping()
    }
}

/// Decode a typed record from a result row.
///
/// Columns that some schema generations lack are declared as `Option`
/// fields by the implementor instead of being probed at runtime.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> WarehouseResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> WarehouseResult<Self> {
        Ok(row.clone())
    }
}
