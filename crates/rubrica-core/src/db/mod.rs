//! SQLite database module for rubrica
//!
//! Query helpers are free functions over a `&Connection` so the store can run
//! several of them inside one transaction.

pub mod codes;
pub mod notas;
pub mod roster;
pub mod rubrics;
mod schema;

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::{RubricaError, Result};

pub use schema::{create_schema, SchemaCreateResult, CURRENT_SCHEMA_VERSION};

/// Database file name inside the store directory
pub const DB_FILE: &str = "rubrica.db";

/// How long a writer waits for another connection's lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// SQLite database for rubrica
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database at the given store root
    pub fn open(store_root: &Path) -> Result<Self> {
        let db_path = store_root.join(DB_FILE);

        let conn = Connection::open(&db_path).map_err(|e| {
            RubricaError::Database(format!(
                "failed to open database at {}: {}",
                db_path.display(),
                e
            ))
        })?;

        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| RubricaError::Database(format!("failed to set busy timeout: {}", e)))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| RubricaError::Database(format!("failed to enable WAL mode: {}", e)))?;

        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| RubricaError::Database(format!("failed to enable foreign keys: {}", e)))?;

        match create_schema(&conn)
            .map_err(|e| RubricaError::Database(format!("failed to create database schema: {}", e)))?
        {
            SchemaCreateResult::Created => {
                tracing::info!(path = %db_path.display(), "created database");
            }
            SchemaCreateResult::Current => {}
            SchemaCreateResult::TooNew(version) => {
                return Err(RubricaError::Database(format!(
                    "database schema version {} is newer than supported version {}",
                    version, CURRENT_SCHEMA_VERSION
                )));
            }
        }

        Ok(Database { conn })
    }

    /// Connection for single-statement reads and writes
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front, so two connections running this for
    /// the same rows serialize instead of both reading stale state. The
    /// transaction commits only when `f` returns `Ok`.
    pub fn immediate<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(|e| crate::map_db_err!(operation, e))?;

        let value = f(&tx)?;

        tx.commit().map_err(|e| crate::map_db_err!(operation, e))?;
        Ok(value)
    }

    pub fn schema_version(&self) -> Result<i32> {
        let value: String = self.conn.query_row(
            "SELECT value FROM store_meta WHERE key = 'schema_version'",
            [],
            |r| r.get(0),
        )?;
        value
            .parse()
            .map_err(|_| RubricaError::Database(format!("bad schema version: {}", value)))
    }

    /// Row counts per table, for `rubrica status`
    pub fn counts(&self) -> Result<Vec<(&'static str, i64)>> {
        const TABLES: [&str; 6] = [
            "teachers",
            "courses",
            "course_groups",
            "rubrics",
            "notas",
            "calificaciones",
        ];

        TABLES
            .iter()
            .map(|table| {
                let count: i64 = self.conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", table),
                    [],
                    |r| r.get(0),
                )?;
                Ok((*table, count))
            })
            .collect()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let _ = self.conn.pragma_update(None, "wal_checkpoint", "PASSIVE");
    }
}

/// Timestamps are stored as RFC 3339 text
pub(crate) fn parse_timestamp(s: &str) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

/// Decode a rubric state column; unknown values are a conversion failure
pub(crate) fn parse_state(s: &str) -> rusqlite::Result<crate::rubric::RubricState> {
    s.parse::<crate::rubric::RubricState>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

/// Decode a JSON column
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(s: &str) -> rusqlite::Result<T> {
    serde_json::from_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
