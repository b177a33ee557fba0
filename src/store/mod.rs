//! Transactional store subsystem.
//!
//! # Data Flow
//! ```text
//! ConnectionManager (manager.rs)
//!     → CredentialResolver (first open only)
//!     → StoreConnector (connector.rs) → postgres.rs | sqlite.rs
//!     → StoreSession: query | begin/execute/commit | rollback
//! ```
//!
//! # Design Decisions
//! - One session per manager; statements run one at a time
//! - Statements are plain SQL text, classified by a `SELECT` prefix
//! - Failures become `StoreError` values at the manager boundary

pub mod connector;
pub mod manager;
pub mod postgres;
pub mod sqlite;
pub mod types;

use std::sync::Arc;

use crate::config::{StoreConfig, StoreDriver};

pub use connector::{StoreConnector, StoreSession};
pub use manager::{ConnectionHealth, ConnectionManager, ConnectionState};
pub use postgres::PostgresConnector;
pub use sqlite::SqliteConnector;
pub use types::{quote_literal, Dialect, Row, StatementKind, StoreError, StoreResult, Value};

/// Build the connector selected by configuration.
pub fn connector_for(config: &StoreConfig) -> Arc<dyn StoreConnector> {
    match config.driver {
        StoreDriver::Postgres => Arc::new(PostgresConnector::new(config.ssl_mode)),
        StoreDriver::Sqlite => Arc::new(SqliteConnector::new()),
    }
}
