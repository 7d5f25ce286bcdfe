//! Local SQLite slice backend.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections for slice storage.
//! - Apply schema migrations before the store is used.
//! - Implement the key-value slice contract over the `slices` table.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and migrations applied.
//! - One row per slice name; upserts replace the payload wholesale.

use super::migrations::apply_migrations;
use crate::store::backend::SliceBackend;
use crate::store::slice::SliceName;
use crate::store::{DbResult, StoreResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite slice database file and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(Connection::open(path), "file")
}

/// Opens an in-memory slice database, mainly for tests.
pub fn open_store_in_memory() -> DbResult<Connection> {
    open_with(Connection::open_in_memory(), "memory")
}

fn open_with(opened: rusqlite::Result<Connection>, mode: &str) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=store status=start mode={mode}");

    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=store status=error mode={mode} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=store status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=store status=error mode={mode} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}

/// SQLite-backed slice store.
pub struct SqliteSliceBackend {
    conn: Connection,
}

impl SqliteSliceBackend {
    /// Wraps an already-bootstrapped connection (see [`open_store`]).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl SliceBackend for SqliteSliceBackend {
    fn fetch(&self, slice: &SliceName) -> StoreResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM slices WHERE name = ?1;",
                [slice.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn upsert(&self, slice: &SliceName, payload: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO slices (name, payload, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(name) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![slice.as_str(), payload],
        )?;
        Ok(())
    }
}
