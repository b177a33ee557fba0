//! SQLite connector for local runs and integration tests.
//!
//! The credential bundle's `dbname` is the database path; `:memory:` opens a
//! private in-memory database. Host, port, username and password are ignored.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::credentials::CredentialBundle;
use crate::store::connector::{StoreConnector, StoreSession};
use crate::store::types::{Dialect, Row, StoreError, StoreResult, Value};

#[derive(Debug, Clone, Default)]
pub struct SqliteConnector;

impl SqliteConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoreConnector for SqliteConnector {
    async fn connect(
        &self,
        credentials: &CredentialBundle,
        timeout: Duration,
    ) -> StoreResult<Box<dyn StoreSession>> {
        let path = credentials.dbname();
        tracing::debug!(path = %path, "opening SQLite database");

        let opened = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(StoreError::ConnectFailure(format!(
                        "parent directory does not exist: {}",
                        parent.display()
                    )));
                }
            }
            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX;
            Connection::open_with_flags(path, flags)
        };
        let conn = opened.map_err(|e| {
            StoreError::ConnectFailure(format!("failed to open '{}': {}", path, e))
        })?;

        conn.busy_timeout(timeout)
            .map_err(|e| StoreError::ConnectFailure(format!("failed to set busy timeout: {}", e)))?;

        Ok(Box::new(SqliteSession { conn }))
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }
}

/// A live SQLite connection.
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    fn control(&self, sql: &str) -> StoreResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| StoreError::Driver(format!("{} failed: {}", sql, e)))
    }
}

#[async_trait]
impl StoreSession for SqliteSession {
    async fn query(&mut self, sql: &str) -> StoreResult<Vec<Row>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| StoreError::Statement(format!("failed to prepare query: {}", e)))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let count = columns.len();

        let mut rows = Vec::new();
        let mut query_rows = stmt
            .query([])
            .map_err(|e| StoreError::Statement(format!("failed to execute query: {}", e)))?;
        while let Some(row) = query_rows
            .next()
            .map_err(|e| StoreError::Statement(format!("failed to fetch row: {}", e)))?
        {
            let mut values = Vec::with_capacity(count);
            for idx in 0..count {
                let value = row.get_ref(idx).map_err(|e| {
                    StoreError::Statement(format!("failed to read column {}: {}", idx, e))
                })?;
                values.push(convert(value));
            }
            rows.push(Row::new(columns.clone(), values));
        }
        Ok(rows)
    }

    /// Steps the statement to completion, so writes with a `RETURNING`
    /// clause run like any other write. Returns the rows changed.
    async fn execute(&mut self, sql: &str) -> StoreResult<u64> {
        let before = self.conn.total_changes();
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| StoreError::Statement(format!("failed to prepare statement: {}", e)))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| StoreError::Statement(format!("failed to execute statement: {}", e)))?;
        while rows
            .next()
            .map_err(|e| StoreError::Statement(format!("failed to execute statement: {}", e)))?
            .is_some()
        {}
        drop(rows);
        drop(stmt);
        Ok(self.conn.total_changes().saturating_sub(before))
    }

    async fn begin(&mut self) -> StoreResult<()> {
        self.control("BEGIN")
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.control("COMMIT")
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.control("ROLLBACK")
    }

    async fn ping(&mut self) -> StoreResult<()> {
        self.conn
            .query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| StoreError::Driver(format!("ping failed: {}", e)))
    }

    async fn close(self: Box<Self>) {
        let SqliteSession { conn } = *self;
        if let Err((_, e)) = conn.close() {
            tracing::warn!(error = %e, "SQLite close failed");
        }
    }
}

fn convert(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Text(format!("<{} bytes>", b.len())),
    }
}
