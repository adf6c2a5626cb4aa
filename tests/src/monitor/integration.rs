#![cfg(test)]
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pingr_common::command::{CHANGE_HOST, CommandError};
use pingr_common::config::Config;
use pingr_common::network::target::HostSpec;
use pingr_common::ping::ProbeMethod;
use pingr_core::invoke::Invoker;
use pingr_core::monitor::{Monitor, MonitorHandle, Snapshot};
use pingr_core::prober::{Prober, TcpProber};
use serde_json::json;
use tokio::net::TcpListener;

fn config() -> Config {
    Config {
        interval: Duration::from_millis(20),
        timeout: Duration::from_millis(500),
        window: 5,
        force_tcp: true,
        ..Config::default()
    }
}

async fn listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

async fn start(addr: SocketAddr) -> MonitorHandle {
    let cfg = config();
    let prober: Arc<dyn Prober> = Arc::new(TcpProber::new(cfg.timeout));
    let spec: HostSpec = addr.to_string().parse().unwrap();
    Monitor::spawn(spec, &cfg, prober).await.unwrap()
}

async fn wait_until(handle: &MonitorHandle, pred: impl FnMut(&Snapshot) -> bool) -> Snapshot {
    let mut rx = handle.snapshots();
    let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("snapshot condition not reached")
        .unwrap()
        .clone();
    snapshot
}

/// Probes a local listener over TCP and checks the live window fills up.
#[tokio::test]
async fn watch_local_listener() {
    let (_listener, addr) = listener().await;
    let handle = start(addr).await;

    let snapshot = wait_until(&handle, |s| s.received >= 3).await;

    assert_eq!(snapshot.method, ProbeMethod::Tcp);
    assert_eq!(snapshot.slots.len(), 5);
    assert!(snapshot.lines().iter().any(|l| l.starts_with("connected to 127.0.0.1")));
    handle.shutdown().await;
}

/// Switching hosts through the named command boundary retargets the probes.
#[tokio::test]
async fn change_host_through_invoke() {
    let (_first, first_addr) = listener().await;
    let (_second, second_addr) = listener().await;
    let handle = start(first_addr).await;
    wait_until(&handle, |s| s.received >= 1).await;

    let invoker: Arc<dyn Invoker> = Arc::new(handle.clone());
    let reply = invoker
        .invoke(CHANGE_HOST, json!({ "newHost": second_addr.to_string() }))
        .await
        .unwrap();
    assert_eq!(reply["host"], second_addr.to_string());

    let expected = second_addr.to_string();
    let snapshot = wait_until(&handle, |s| s.host == expected && s.received >= 2).await;
    assert!(snapshot.sent >= 2);

    let status = handle.status().await.unwrap();
    assert_eq!(status.host, second_addr.to_string());
    handle.shutdown().await;
}

/// A bad host is reported back and the monitor keeps its old target.
#[tokio::test]
async fn failed_change_keeps_probing() {
    let (_listener, addr) = listener().await;
    let handle = start(addr).await;

    let err = handle
        .invoke(CHANGE_HOST, json!({ "newHost": "bad:port" }))
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::InvalidHost(_)));

    let before = handle.status().await.unwrap().sent;
    let snapshot = wait_until(&handle, |s| s.sent > before).await;
    assert_eq!(snapshot.host, addr.to_string());
    handle.shutdown().await;
}

/// Overlapping calls are all answered; the last one processed wins.
#[tokio::test]
async fn concurrent_changes_are_all_answered() {
    let (_a, a) = listener().await;
    let (_b, b) = listener().await;
    let handle = start(a).await;

    let mut tasks = Vec::new();
    for target in [b, a, b] {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle
                .invoke(CHANGE_HOST, json!({ "newHost": target.to_string() }))
                .await
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    let status = handle.status().await.unwrap();
    assert!(status.host == a.to_string() || status.host == b.to_string());
    handle.shutdown().await;
}

#[tokio::test]
async fn unresolvable_initial_host_is_an_error() {
    let cfg = config();
    let prober: Arc<dyn Prober> = Arc::new(TcpProber::new(cfg.timeout));
    let result = Monitor::spawn(HostSpec::new("", None), &cfg, prober).await;
    assert!(result.is_err());
}
