//! Store value types, statement classification and error definitions.

use thiserror::Error;

use crate::credentials::CredentialError;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials could not be resolved before connecting.
    #[error("credentials unavailable: {0}")]
    Credentials(#[from] CredentialError),

    /// The store refused or failed the connection attempt.
    #[error("connect failed: {0}")]
    ConnectFailure(String),

    /// The store did not complete the connection within the bound.
    #[error("connect timed out after {0} seconds")]
    ConnectTimeout(u64),

    /// Operation attempted while the manager is Closed.
    #[error("not connected")]
    NotConnected,

    /// Statement execution failed; the transaction was rolled back.
    #[error("statement failed: {0}")]
    Statement(String),

    /// Rollback itself failed after a statement error.
    #[error("rollback failed: {0}")]
    Rollback(String),

    /// Driver-level failure outside a statement (begin, ping, setup).
    #[error("driver error: {0}")]
    Driver(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// SQL dialect spoken by a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

/// Whether a statement returns rows or mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
}

impl StatementKind {
    /// Classify by prefix: a leading `SELECT` (any case) is a read.
    pub fn classify(statement: &str) -> Self {
        let head = statement.trim_start();
        match head.get(..6) {
            Some(prefix) if prefix.eq_ignore_ascii_case("select") => StatementKind::Read,
            _ => StatementKind::Write,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Read => "read",
            StatementKind::Write => "write",
        }
    }
}

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Look up a value by column name.
    pub fn get_named(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Quote text as a SQL string literal by doubling single quotes.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
