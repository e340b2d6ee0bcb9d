//! SQLite-backed [`Warehouse`].

use std::sync::Arc;

use rusqlite::types::ToSql;

use super::pool::{AccessMode, ConnectionPool, PooledConnection};
use super::{QueryParams, Row, Value, Warehouse, WarehouseResult};
use crate::config::{PoolSettings, WarehouseTarget};

/// Warehouse stored in a SQLite database.
#[derive(Debug)]
pub struct SqliteWarehouse {
    pool: ConnectionPool,
}

impl SqliteWarehouse {
    /// Build a warehouse handle. No connection is opened for file targets.
    pub fn open(
        target: WarehouseTarget,
        settings: PoolSettings,
        mode: AccessMode,
    ) -> WarehouseResult<Self> {
        let pool = ConnectionPool::new(target, settings, mode)?;
        Ok(Self { pool })
    }

    /// Open a private in-memory warehouse (for testing).
    pub fn open_in_memory() -> WarehouseResult<Self> {
        Self::open(
            WarehouseTarget::Memory,
            PoolSettings::default(),
            AccessMode::ReadWrite,
        )
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Check out a raw connection for writes.
    pub fn connection(&self) -> WarehouseResult<PooledConnection<'_>> {
        self.pool.get()
    }

    /// Run a batch of statements with no result rows.
    pub fn execute_batch(&self, sql: &str) -> WarehouseResult<()> {
        self.pool.get()?.execute_batch(sql)?;
        Ok(())
    }
}

impl Warehouse for SqliteWarehouse {
    fn fetch_all(&self, sql: &str, params: &QueryParams) -> WarehouseResult<Vec<Row>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;

        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        // rusqlite rejects names the statement does not declare
        let mut declared: Vec<(String, &Value)> = Vec::with_capacity(params.len());
        for (name, value) in params.iter() {
            let placeholder = format!(":{}", name);
            if stmt.parameter_index(&placeholder)?.is_some() {
                declared.push((placeholder, value));
            }
        }
        let bound: Vec<(&str, &dyn ToSql)> = declared
            .iter()
            .map(|(name, value)| (name.as_str(), *value as &dyn ToSql))
            .collect();

        let mut rows = stmt.query(bound.as_slice())?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(Value::from(row.get_ref(i)?));
            }
            out.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(out)
    }

    fn ping(&self) -> WarehouseResult<()> {
        let conn = self.pool.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}
