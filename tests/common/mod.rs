//! Shared fakes and helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use failover_coordinator::credentials::{
    CredentialBundle, CredentialError, CredentialResolver, CredentialResult, SecretSource,
};
use failover_coordinator::health::{HealthCheckRecord, LoopReport, StatusLine, StatusSink};
use failover_coordinator::routing::{
    ClusterEndpoint, RoutingControlState, RoutingControlTransport, RoutingError, RoutingResult,
};
use failover_coordinator::store::{
    ConnectionManager, Dialect, Row, StoreConnector, StoreError, StoreResult, StoreSession, Value,
};

/// Build the JSON secret document for a bundle.
pub fn secret_json(host: &str, port: u16, dbname: &str) -> String {
    serde_json::json!({
        "host": host,
        "port": port,
        "dbname": dbname,
        "username": "coordinator",
        "password": "s3cret",
    })
    .to_string()
}

/// Secret source that always returns the same document and counts reads.
pub struct StaticSecretSource {
    document: Option<String>,
    pub fetches: AtomicUsize,
}

impl StaticSecretSource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A backend that is never reachable.
    pub fn unavailable() -> Self {
        Self {
            document: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretSource for StaticSecretSource {
    async fn fetch(&self, secret_id: &str) -> CredentialResult<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.document.clone().ok_or_else(|| {
            CredentialError::Unavailable(format!("secret '{}' unreachable", secret_id))
        })
    }
}

/// Resolver over a static secret pointing at `dbname`.
pub fn resolver_for(host: &str, port: u16, dbname: &str) -> CredentialResolver {
    let source = StaticSecretSource::new(secret_json(host, port, dbname));
    CredentialResolver::new(Arc::new(source), "test/db")
}

/// Counters shared between a [`ScriptedConnector`] and its sessions.
#[derive(Default)]
pub struct Script {
    pub connects: AtomicUsize,
    pub network_calls: AtomicUsize,
    pub begins: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
    pub closes: AtomicUsize,
    pub fail_connect: AtomicBool,
    pub fail_execute: AtomicBool,
    pub fail_rollback: AtomicBool,
    pub fail_ping: AtomicBool,
    pub writes: Mutex<Vec<String>>,
}

impl Script {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }
}

/// In-process store whose failures are switched on by the test.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    pub script: Arc<Script>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreConnector for ScriptedConnector {
    async fn connect(
        &self,
        _credentials: &CredentialBundle,
        _timeout: Duration,
    ) -> StoreResult<Box<dyn StoreSession>> {
        self.script.connects.fetch_add(1, Ordering::SeqCst);
        self.script.network_calls.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_connect.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectFailure("connection refused".to_string()));
        }
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
        }))
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }
}

struct ScriptedSession {
    script: Arc<Script>,
}

impl ScriptedSession {
    fn touch(&self) {
        self.script.network_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreSession for ScriptedSession {
    async fn query(&mut self, _sql: &str) -> StoreResult<Vec<Row>> {
        self.touch();
        Ok(vec![Row::new(
            vec!["?column?".to_string()],
            vec![Value::Integer(1)],
        )])
    }

    async fn execute(&mut self, sql: &str) -> StoreResult<u64> {
        self.touch();
        if self.script.fail_execute.load(Ordering::SeqCst) {
            return Err(StoreError::Statement(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }
        if let Ok(mut writes) = self.script.writes.lock() {
            writes.push(sql.to_string());
        }
        Ok(1)
    }

    async fn begin(&mut self) -> StoreResult<()> {
        self.touch();
        self.script.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.touch();
        self.script.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.touch();
        self.script.rollbacks.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_rollback.load(Ordering::SeqCst) {
            return Err(StoreError::Driver("connection reset".to_string()));
        }
        Ok(())
    }

    async fn ping(&mut self) -> StoreResult<()> {
        self.touch();
        if self.script.fail_ping.load(Ordering::SeqCst) {
            return Err(StoreError::Driver(
                "server closed the connection unexpectedly".to_string(),
            ));
        }
        Ok(())
    }

    async fn close(self: Box<Self>) {
        self.script.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Manager over a [`ScriptedConnector`], plus the connector for inspection.
pub fn scripted_manager() -> (ConnectionManager, ScriptedConnector) {
    let connector = ScriptedConnector::new();
    let manager = ConnectionManager::new(
        resolver_for("db.internal", 5432, "appdb"),
        Arc::new(connector.clone()),
        Duration::from_secs(5),
    );
    (manager, connector)
}

/// Routing transport holding one state per control in memory.
pub struct MemoryRoutingTransport {
    states: Mutex<HashMap<String, RoutingControlState>>,
    pub gets: AtomicUsize,
    pub updates: AtomicUsize,
    pub endpoints_seen: Mutex<Vec<String>>,
}

impl MemoryRoutingTransport {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            gets: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            endpoints_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_state(control_arn: &str, state: RoutingControlState) -> Self {
        let transport = Self::new();
        if let Ok(mut states) = transport.states.lock() {
            states.insert(control_arn.to_string(), state);
        }
        transport
    }

    fn lock_states(
        &self,
    ) -> RoutingResult<MutexGuard<'_, HashMap<String, RoutingControlState>>> {
        self.states
            .lock()
            .map_err(|_| RoutingError::Transport("poisoned".to_string()))
    }

    fn saw(&self, endpoint: &ClusterEndpoint) {
        if let Ok(mut seen) = self.endpoints_seen.lock() {
            seen.push(endpoint.as_str().to_string());
        }
    }
}

#[async_trait]
impl RoutingControlTransport for MemoryRoutingTransport {
    async fn get_state(
        &self,
        endpoint: &ClusterEndpoint,
        control_arn: &str,
    ) -> RoutingResult<RoutingControlState> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.saw(endpoint);
        let states = self.lock_states()?;
        states.get(control_arn).copied().ok_or_else(|| {
            RoutingError::Transport(format!("ResourceNotFoundException: {}", control_arn))
        })
    }

    async fn update_state(
        &self,
        endpoint: &ClusterEndpoint,
        control_arn: &str,
        state: RoutingControlState,
    ) -> RoutingResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.saw(endpoint);
        if state == RoutingControlState::Unknown {
            return Err(RoutingError::UnexpectedState(state.to_string()));
        }
        let mut states = self.lock_states()?;
        states.insert(control_arn.to_string(), state);
        Ok(())
    }
}

/// Routing transport whose endpoint is unreachable.
#[derive(Default)]
pub struct UnreachableTransport {
    pub calls: AtomicUsize,
}

#[async_trait]
impl RoutingControlTransport for UnreachableTransport {
    async fn get_state(
        &self,
        endpoint: &ClusterEndpoint,
        _control_arn: &str,
    ) -> RoutingResult<RoutingControlState> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(dispatch_failure(endpoint))
    }

    async fn update_state(
        &self,
        endpoint: &ClusterEndpoint,
        _control_arn: &str,
        _state: RoutingControlState,
    ) -> RoutingResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(dispatch_failure(endpoint))
    }
}

fn dispatch_failure(endpoint: &ClusterEndpoint) -> RoutingError {
    RoutingError::Transport(format!("dispatch failure: {} unreachable", endpoint))
}

/// Events a [`ChannelSink`] forwards to the test.
#[derive(Debug, Clone)]
pub enum SinkEvent {
    Status(StatusLine),
    Recent(Vec<HealthCheckRecord>),
    Shutdown(LoopReport),
}

/// Status sink that forwards everything over a channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StatusSink for ChannelSink {
    fn status(&mut self, line: &StatusLine) {
        let _ = self.tx.send(SinkEvent::Status(line.clone()));
    }

    fn recent(&mut self, records: &[HealthCheckRecord]) {
        let _ = self.tx.send(SinkEvent::Recent(records.to_vec()));
    }

    fn shutdown(&mut self, report: &LoopReport) {
        let _ = self.tx.send(SinkEvent::Shutdown(report.clone()));
    }
}

/// A listener that accepts TCP connections into its backlog but never answers.
///
/// Keep the returned listener alive for the duration of the test.
pub async fn start_black_hole() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// A local port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
