//! Connection manager lifecycle against real and scripted stores.

use std::sync::Arc;
use std::time::{Duration, Instant};

use failover_coordinator::credentials::CredentialResolver;
use failover_coordinator::config::SslMode;
use failover_coordinator::store::{
    ConnectionHealth, ConnectionManager, ConnectionState, PostgresConnector, SqliteConnector,
    StoreError, Value,
};

mod common;
use common::{resolver_for, Script, StaticSecretSource};

#[tokio::test]
async fn test_open_write_read_close_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coordinator.db");
    let mut manager = ConnectionManager::new(
        resolver_for("localhost", 0, path.to_str().unwrap()),
        Arc::new(SqliteConnector::new()),
        Duration::from_secs(5),
    );

    assert_eq!(manager.state(), ConnectionState::Closed);
    assert!(manager.open().await);
    assert_eq!(manager.state(), ConnectionState::Open);

    let created = manager
        .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
        .await
        .unwrap();
    assert!(created.is_empty());
    let inserted = manager
        .execute("INSERT INTO t (name) VALUES ('x')")
        .await
        .unwrap();
    assert!(inserted.is_empty());

    let rows = manager.execute("SELECT name FROM t").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_named("name"), Some(&Value::Text("x".to_string())));

    manager.close().await;
    assert_eq!(manager.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_open_twice_keeps_one_connection() {
    let (mut manager, connector) = common::scripted_manager();
    assert!(manager.open().await);
    assert!(manager.open().await);
    assert_eq!(Script::count(&connector.script.connects), 1);
}

#[tokio::test]
async fn test_black_hole_times_out_then_not_connected() {
    let (_listener, addr) = common::start_black_hole().await;
    let mut manager = ConnectionManager::new(
        resolver_for("127.0.0.1", addr.port(), "appdb"),
        Arc::new(PostgresConnector::new(SslMode::Disable)),
        Duration::from_secs(1),
    );

    let start = Instant::now();
    assert!(!manager.open().await);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(900), "returned too early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(4), "timeout not honored: {:?}", elapsed);
    assert_eq!(manager.state(), ConnectionState::Closed);

    let err = manager.execute("SELECT 1").await.unwrap_err();
    assert!(matches!(err, StoreError::NotConnected));
}

#[tokio::test]
async fn test_try_open_reports_timeout() {
    let (_listener, addr) = common::start_black_hole().await;
    let mut manager = ConnectionManager::new(
        resolver_for("127.0.0.1", addr.port(), "appdb"),
        Arc::new(PostgresConnector::new(SslMode::Disable)),
        Duration::from_secs(1),
    );

    let err = manager.try_open().await.unwrap_err();
    assert!(matches!(err, StoreError::ConnectTimeout(1)), "got {:?}", err);
}

#[tokio::test]
async fn test_refused_port_fails_fast() {
    let port = common::closed_port().await;
    let mut manager = ConnectionManager::new(
        resolver_for("127.0.0.1", port, "appdb"),
        Arc::new(PostgresConnector::new(SslMode::Disable)),
        Duration::from_secs(5),
    );

    let start = Instant::now();
    assert!(!manager.open().await);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(!manager.is_open());
}

#[tokio::test]
async fn test_not_connected_touches_nothing() {
    let (mut manager, connector) = common::scripted_manager();

    let err = manager.execute("INSERT INTO t VALUES (1)").await.unwrap_err();
    assert!(matches!(err, StoreError::NotConnected));
    assert_eq!(Script::count(&connector.script.network_calls), 0);
    assert!(!manager.resolver().is_resolved());
}

#[tokio::test]
async fn test_write_failure_rolls_back_once_and_stays_open() {
    let (mut manager, connector) = common::scripted_manager();
    assert!(manager.open().await);
    Script::set(&connector.script.fail_execute, true);

    let err = manager.execute("INSERT INTO t VALUES (1)").await.unwrap_err();
    assert!(matches!(err, StoreError::Statement(_)), "got {:?}", err);
    assert_eq!(Script::count(&connector.script.rollbacks), 1);
    assert_eq!(Script::count(&connector.script.commits), 0);
    assert_eq!(manager.state(), ConnectionState::Open);

    Script::set(&connector.script.fail_execute, false);
    manager.execute("INSERT INTO t VALUES (2)").await.unwrap();
    assert_eq!(Script::count(&connector.script.commits), 1);
    assert_eq!(Script::count(&connector.script.rollbacks), 1);
}

#[tokio::test]
async fn test_failed_rollback_is_surfaced() {
    let (mut manager, connector) = common::scripted_manager();
    assert!(manager.open().await);
    Script::set(&connector.script.fail_execute, true);
    Script::set(&connector.script.fail_rollback, true);

    let err = manager.execute("UPDATE t SET x = 1").await.unwrap_err();
    assert!(matches!(err, StoreError::Rollback(_)), "got {:?}", err);
    assert_eq!(Script::count(&connector.script.rollbacks), 1);
}

#[tokio::test]
async fn test_read_failure_does_not_roll_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reads.db");
    let mut manager = ConnectionManager::new(
        resolver_for("localhost", 0, path.to_str().unwrap()),
        Arc::new(SqliteConnector::new()),
        Duration::from_secs(5),
    );
    assert!(manager.open().await);

    let err = manager.execute("SELECT * FROM missing_table").await.unwrap_err();
    assert!(matches!(err, StoreError::Statement(_)));
    assert!(manager.is_open());
    assert!(manager.execute("SELECT 1").await.is_ok());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (mut manager, _connector) = common::scripted_manager();
    manager.close().await;
    assert_eq!(manager.state(), ConnectionState::Closed);

    assert!(manager.open().await);
    manager.close().await;
    manager.close().await;
    assert_eq!(manager.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_probe_reports_degraded() {
    let (mut manager, connector) = common::scripted_manager();
    assert_eq!(manager.probe().await, ConnectionHealth::Closed);

    assert!(manager.open().await);
    assert_eq!(manager.probe().await, ConnectionHealth::Connected);

    Script::set(&connector.script.fail_ping, true);
    assert!(matches!(manager.probe().await, ConnectionHealth::Degraded(_)));
    assert!(manager.is_open());
}

#[tokio::test]
async fn test_credentials_resolved_once_across_reconnects() {
    let source = Arc::new(StaticSecretSource::new(common::secret_json("db", 5432, "appdb")));
    let connector = common::ScriptedConnector::new();
    let mut manager = ConnectionManager::new(
        CredentialResolver::new(source.clone(), "test/db"),
        Arc::new(connector.clone()),
        Duration::from_secs(5),
    );

    assert!(manager.open().await);
    manager.close().await;
    assert!(manager.open().await);

    assert_eq!(source.fetch_count(), 1);
    assert_eq!(Script::count(&connector.script.connects), 2);
}

#[tokio::test]
async fn test_unavailable_secret_keeps_closed() {
    let source = Arc::new(StaticSecretSource::unavailable());
    let connector = common::ScriptedConnector::new();
    let mut manager = ConnectionManager::new(
        CredentialResolver::new(source.clone(), "test/db"),
        Arc::new(connector.clone()),
        Duration::from_secs(5),
    );

    let err = manager.try_open().await.unwrap_err();
    assert!(matches!(err, StoreError::Credentials(_)));
    assert_eq!(Script::count(&connector.script.connects), 0);
    assert_eq!(manager.state(), ConnectionState::Closed);
}
