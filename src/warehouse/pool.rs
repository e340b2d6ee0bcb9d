//! A small synchronous SQLite connection pool.
//!
//! Connections are opened lazily, so building a pool never touches the
//! warehouse. With `pre_ping` enabled every connection is probed with
//! `SELECT 1` before it is handed out; connections that fail the probe are
//! discarded and replaced.

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};

use super::{WarehouseError, WarehouseResult};
use crate::config::{PoolSettings, WarehouseTarget};

/// How the pool opens its connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Reporting: the warehouse file must exist and is never written.
    ReadOnly,
    /// Ingestion: the file is created if missing.
    ReadWrite,
}

pub struct ConnectionPool {
    target: WarehouseTarget,
    location: String,
    flags: OpenFlags,
    settings: PoolSettings,
    idle: Mutex<Vec<Connection>>,
    /// Keeps a shared in-memory database alive between checkouts.
    _anchor: Option<Mutex<Connection>>,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("target", &self.target)
            .field("flags", &self.flags)
            .field("idle", &self.idle.lock().len())
            .finish()
    }
}

impl ConnectionPool {
    /// Build a pool for `target`.
    ///
    /// File targets are not opened until the first checkout. In-memory
    /// targets get a uniquely named shared-cache database and ignore
    /// [`AccessMode::ReadOnly`].
    pub fn new(
        target: WarehouseTarget,
        settings: PoolSettings,
        mode: AccessMode,
    ) -> WarehouseResult<Self> {
        let (location, flags, anchor) = match &target {
            WarehouseTarget::File(path) => {
                let flags = match mode {
                    AccessMode::ReadOnly => {
                        OpenFlags::SQLITE_OPEN_READ_ONLY
                            | OpenFlags::SQLITE_OPEN_URI
                            | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    }
                    AccessMode::ReadWrite => OpenFlags::default(),
                };
                (path.display().to_string(), flags, None)
            }
            WarehouseTarget::Memory => {
                let location = format!(
                    "file:mdwarehouse-{}?mode=memory&cache=shared",
                    uuid::Uuid::new_v4()
                );
                let flags = OpenFlags::default();
                let anchor = Connection::open_with_flags(&location, flags).map_err(|source| {
                    WarehouseError::Open {
                        target: target.describe(),
                        source,
                    }
                })?;
                (location, flags, Some(Mutex::new(anchor)))
            }
        };

        Ok(Self {
            target,
            location,
            flags,
            settings,
            idle: Mutex::new(Vec::new()),
            _anchor: anchor,
        })
    }

    pub fn target(&self) -> &WarehouseTarget {
        &self.target
    }

    /// Number of idle connections waiting for reuse.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Check out a connection.
    pub fn get(&self) -> WarehouseResult<PooledConnection<'_>> {
        loop {
            let candidate = self.idle.lock().pop();
            let Some(conn) = candidate else {
                break;
            };
            if !self.settings.pre_ping {
                return Ok(PooledConnection::new(conn, self));
            }
            match probe(&conn) {
                Ok(()) => return Ok(PooledConnection::new(conn, self)),
                Err(e) => {
                    tracing::debug!(
                        target_db = %self.target.describe(),
                        error = %e,
                        "discarding connection that failed pre-ping"
                    );
                }
            }
        }

        let conn = self.connect()?;
        if self.settings.pre_ping {
            probe(&conn)?;
        }
        Ok(PooledConnection::new(conn, self))
    }

    fn connect(&self) -> WarehouseResult<Connection> {
        let conn = Connection::open_with_flags(&self.location, self.flags).map_err(|source| {
            WarehouseError::Open {
                target: self.target.describe(),
                source,
            }
        })?;
        conn.busy_timeout(Duration::from_millis(self.settings.busy_timeout_ms))?;
        if !self.flags.contains(OpenFlags::SQLITE_OPEN_READ_ONLY) {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        tracing::trace!(target_db = %self.target.describe(), "opened warehouse connection");
        Ok(conn)
    }

    fn release(&self, conn: Connection) {
        let mut idle = self.idle.lock();
        if idle.len() < self.settings.max_idle_conns as usize {
            idle.push(conn);
        }
    }
}

fn probe(conn: &Connection) -> WarehouseResult<()> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// A checked-out connection, returned to the pool on drop.
#[derive(Debug)]
pub struct PooledConnection<'a> {
    conn: Option<Connection>,
    pool: &'a ConnectionPool,
}

impl<'a> PooledConnection<'a> {
    fn new(conn: Connection, pool: &'a ConnectionPool) -> Self {
        Self {
            conn: Some(conn),
            pool,
        }
    }
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection present until drop")
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection present until drop")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}
