//! Driver seams between the connection manager and a relational engine.

use std::time::Duration;

use async_trait::async_trait;

use crate::credentials::CredentialBundle;
use crate::store::types::{Dialect, Row, StoreResult};

/// Opens sessions against one kind of store.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Establish a session, giving up after `timeout`.
    async fn connect(
        &self,
        credentials: &CredentialBundle,
        timeout: Duration,
    ) -> StoreResult<Box<dyn StoreSession>>;

    fn dialect(&self) -> Dialect;
}

/// A single live connection. Driven by one caller at a time.
#[async_trait]
pub trait StoreSession: Send {
    /// Run a row-returning statement.
    async fn query(&mut self, sql: &str) -> StoreResult<Vec<Row>>;

    /// Run a mutating statement inside the open transaction.
    async fn execute(&mut self, sql: &str) -> StoreResult<u64>;

    async fn begin(&mut self) -> StoreResult<()>;

    async fn commit(&mut self) -> StoreResult<()>;

    async fn rollback(&mut self) -> StoreResult<()>;

    /// Cheap liveness round-trip.
    async fn ping(&mut self) -> StoreResult<()>;

    /// Release the underlying resource.
    async fn close(self: Box<Self>);
}
