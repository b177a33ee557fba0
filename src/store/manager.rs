//! Connection manager.
//!
//! # State Machine
//! ```text
//! Closed --open ok--> Open
//! Open --close--> Closed
//! Open --statement error--> Open (transaction rolled back)
//! ```
//!
//! # Design Decisions
//! - `open` reports failure as `false`; the caller decides to retry or exit
//! - Operations on a Closed manager fail fast with `NotConnected`, no implicit reconnect
//! - A dropped connection is not detected until the next statement or `probe`

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::credentials::CredentialResolver;
use crate::observability::metrics;
use crate::store::connector::{StoreConnector, StoreSession};
use crate::store::types::{Dialect, Row, StatementKind, StoreError, StoreResult};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
}

/// Result of a liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionHealth {
    /// The store answered the probe.
    Connected,
    /// Open locally but the store did not answer; reconnect required.
    Degraded(String),
    /// No connection is open.
    Closed,
}

/// Owns at most one live connection to the transactional store.
pub struct ConnectionManager {
    resolver: CredentialResolver,
    connector: Arc<dyn StoreConnector>,
    connect_timeout: Duration,
    session: Option<Box<dyn StoreSession>>,
}

impl ConnectionManager {
    pub fn new(
        resolver: CredentialResolver,
        connector: Arc<dyn StoreConnector>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            connector,
            connect_timeout,
            session: None,
        }
    }

    /// Resolve credentials if needed and connect.
    ///
    /// Returns false and stays Closed on any failure. Already Open is a success.
    pub async fn open(&mut self) -> bool {
        match self.try_open().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Connection failed");
                false
            }
        }
    }

    /// Like [`open`](Self::open) but surfaces the reason for failure.
    pub async fn try_open(&mut self) -> StoreResult<()> {
        if self.session.is_some() {
            tracing::debug!("Connection already open");
            return Ok(());
        }

        let credentials = self.resolver.resolve().await?;
        let session = self.connector.connect(credentials, self.connect_timeout).await?;
        self.session = Some(session);
        metrics::record_store_connected(true);

        tracing::info!(
            host = %credentials.host(),
            port = credentials.port(),
            database = %credentials.dbname(),
            "Connected to database"
        );
        Ok(())
    }

    /// Run one statement.
    ///
    /// Reads return their full result set. Writes are committed in the same
    /// call and return an empty result; if the write fails the transaction
    /// is rolled back once and the connection stays Open.
    pub async fn execute(&mut self, statement: &str) -> StoreResult<Vec<Row>> {
        let session = self.session.as_mut().ok_or(StoreError::NotConnected)?;
        let kind = StatementKind::classify(statement);
        let start = Instant::now();

        let result = match kind {
            StatementKind::Read => session
                .query(statement)
                .await
                .map_err(into_statement_error),
            StatementKind::Write => run_write(session.as_mut(), statement)
                .await
                .map(|_| Vec::new()),
        };

        metrics::record_statement(kind.as_str(), result.is_ok(), start);
        if let Err(e) = &result {
            tracing::warn!(kind = kind.as_str(), error = %e, "Query execution error");
        }
        result
    }

    /// Round-trip a trivial statement to see whether the store still answers.
    pub async fn probe(&mut self) -> ConnectionHealth {
        let Some(session) = self.session.as_mut() else {
            return ConnectionHealth::Closed;
        };
        match session.ping().await {
            Ok(()) => ConnectionHealth::Connected,
            Err(e) => {
                tracing::warn!(error = %e, "Liveness probe failed");
                ConnectionHealth::Degraded(e.to_string())
            }
        }
    }

    /// Close the connection. A no-op when already Closed.
    pub async fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
            metrics::record_store_connected(false);
            tracing::info!("Disconnected from database");
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.session.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn dialect(&self) -> Dialect {
        self.connector.dialect()
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("resolver", &self.resolver)
            .field("dialect", &self.connector.dialect())
            .field("connect_timeout", &self.connect_timeout)
            .field("state", &self.state())
            .finish()
    }
}

async fn run_write(session: &mut dyn StoreSession, statement: &str) -> StoreResult<()> {
    session.begin().await.map_err(into_statement_error)?;

    let outcome = match session.execute(statement).await {
        Ok(_) => session.commit().await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Err(rollback) = session.rollback().await {
                tracing::error!(error = %rollback, "Rollback failed");
                return Err(StoreError::Rollback(format!("{} (after: {})", rollback, e)));
            }
            Err(into_statement_error(e))
        }
    }
}

fn into_statement_error(e: StoreError) -> StoreError {
    match e {
        StoreError::Statement(_) | StoreError::Rollback(_) => e,
        other => StoreError::Statement(other.to_string()),
    }
}
