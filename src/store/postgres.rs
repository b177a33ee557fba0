//! PostgreSQL connector.
//!
//! # Responsibilities
//! - Connect with a bounded timeout, optionally over TLS
//! - Drive the connection task and stop it on close
//! - Surface result sets through the simple-query protocol (values as text)

use std::time::Duration;

use async_trait::async_trait;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio::task::JoinHandle;
use tokio_postgres::config::SslMode as PgSslMode;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use crate::config::SslMode;
use crate::credentials::CredentialBundle;
use crate::store::connector::{StoreConnector, StoreSession};
use crate::store::types::{Dialect, Row, StoreError, StoreResult, Value};

/// Opens PostgreSQL sessions (Aurora PostgreSQL in production).
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    ssl_mode: SslMode,
}

impl PostgresConnector {
    pub fn new(ssl_mode: SslMode) -> Self {
        Self { ssl_mode }
    }

    fn pg_config(
        &self,
        credentials: &CredentialBundle,
        timeout: Duration,
    ) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(credentials.host())
            .port(credentials.port())
            .dbname(credentials.dbname())
            .user(credentials.username())
            .password(credentials.password())
            .connect_timeout(timeout)
            .application_name("failover-coordinator")
            .ssl_mode(match self.ssl_mode {
                SslMode::Disable => PgSslMode::Disable,
                SslMode::Prefer => PgSslMode::Prefer,
                SslMode::Require => PgSslMode::Require,
            });
        config
    }
}

#[async_trait]
impl StoreConnector for PostgresConnector {
    async fn connect(
        &self,
        credentials: &CredentialBundle,
        timeout: Duration,
    ) -> StoreResult<Box<dyn StoreSession>> {
        let config = self.pg_config(credentials, timeout);
        tracing::debug!(
            host = %credentials.host(),
            port = credentials.port(),
            ssl_mode = ?self.ssl_mode,
            "connecting to PostgreSQL"
        );

        let attempt = async {
            if self.ssl_mode == SslMode::Disable {
                let (client, connection) = config.connect(NoTls).await.map_err(connect_error)?;
                Ok::<_, StoreError>((client, spawn_driver(connection)))
            } else {
                let tls = TlsConnector::builder()
                    .build()
                    .map_err(|e| StoreError::ConnectFailure(format!("TLS setup failed: {}", e)))?;
                let (client, connection) = config
                    .connect(MakeTlsConnector::new(tls))
                    .await
                    .map_err(connect_error)?;
                Ok((client, spawn_driver(connection)))
            }
        };

        let (client, driver) = tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| StoreError::ConnectTimeout(timeout.as_secs()))??;

        Ok(Box::new(PostgresSession { client, driver }))
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }
}

fn spawn_driver<F>(connection: F) -> JoinHandle<()>
where
    F: std::future::Future<Output = Result<(), tokio_postgres::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "PostgreSQL connection error");
        }
    })
}

fn connect_error(e: tokio_postgres::Error) -> StoreError {
    StoreError::ConnectFailure(format_postgres_error(&e))
}

fn format_postgres_error(error: &tokio_postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut message = db_error.message().to_string();
    if let Some(detail) = db_error.detail().filter(|d| !d.trim().is_empty()) {
        message.push_str(&format!(" (detail: {})", detail));
    }
    format!("{} (code: {})", message, db_error.code().code())
}

/// A live PostgreSQL connection.
pub struct PostgresSession {
    client: Client,
    driver: JoinHandle<()>,
}

impl PostgresSession {
    async fn simple(&self, sql: &str) -> StoreResult<Vec<SimpleQueryMessage>> {
        if self.client.is_closed() {
            return Err(StoreError::Driver("connection closed".to_string()));
        }
        self.client
            .simple_query(sql)
            .await
            .map_err(|e| StoreError::Statement(format_postgres_error(&e)))
    }

    async fn control(&self, sql: &str) -> StoreResult<()> {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| {
                StoreError::Driver(format!("{} failed: {}", sql, format_postgres_error(&e)))
            })
    }
}

#[async_trait]
impl StoreSession for PostgresSession {
    async fn query(&mut self, sql: &str) -> StoreResult<Vec<Row>> {
        let messages = self.simple(sql).await?;
        let mut rows = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                let columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                let values = (0..row.len())
                    .map(|i| match row.get(i) {
                        Some(text) => Value::Text(text.to_string()),
                        None => Value::Null,
                    })
                    .collect();
                rows.push(Row::new(columns, values));
            }
        }
        Ok(rows)
    }

    async fn execute(&mut self, sql: &str) -> StoreResult<u64> {
        let messages = self.simple(sql).await?;
        Ok(messages
            .iter()
            .map(|m| match m {
                SimpleQueryMessage::CommandComplete(n) => *n,
                _ => 0,
            })
            .sum())
    }

    async fn begin(&mut self) -> StoreResult<()> {
        self.control("BEGIN").await
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.control("COMMIT").await
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.control("ROLLBACK").await
    }

    async fn ping(&mut self) -> StoreResult<()> {
        self.simple("SELECT 1").await.map(|_| ())
    }

    async fn close(self: Box<Self>) {
        let PostgresSession { client, driver } = *self;
        drop(client);
        let abort = driver.abort_handle();
        if tokio::time::timeout(Duration::from_secs(1), driver).await.is_err() {
            abort.abort();
        }
    }
}
