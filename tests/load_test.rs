//! Concurrency tests for the circuit-breaking dialer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use proxy_dialer::{CircuitState, Dialer, LoadBalancedDialer, Network, ProxyDialer};

mod common;

const TARGET: &str = "example.com:443";

#[tokio::test(start_paused = true)]
async fn test_single_probe_under_concurrent_dials() {
    let relay = common::ScriptedDialer::new();
    relay.fail(true);
    let dialer = Arc::new(common::proxy_dialer(&relay, "open_threshold=1&half_open_timeout=5s"));

    dialer.dial(Network::Tcp, TARGET).await.unwrap_err();
    tokio::time::advance(Duration::from_secs(5)).await;

    relay.fail(false);
    relay.hold.store(true, Ordering::SeqCst);

    let concurrency = 20;
    let rejected = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();
    for _ in 0..concurrency {
        let dialer = dialer.clone();
        let rejected = rejected.clone();
        handles.push(tokio::spawn(async move {
            let result = dialer.dial(Network::Tcp, TARGET).await;
            if matches!(&result, Err(e) if e.is_circuit_open()) {
                rejected.fetch_add(1, Ordering::SeqCst);
            }
            result.is_ok()
        }));
    }

    while rejected.load(Ordering::SeqCst) < concurrency - 1 {
        tokio::task::yield_now().await;
    }

    // Only the probe reached the relay and it is still outstanding.
    assert_eq!(relay.calls(), 2);
    let snapshot = dialer.snapshot();
    assert_eq!(snapshot.state, CircuitState::HalfOpen);
    assert!(snapshot.probe_in_flight);

    relay.release.add_permits(1);
    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(dialer.snapshot().state, CircuitState::Closed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failures_open_circuit() {
    let relay = common::ScriptedDialer::new();
    relay.fail(true);
    let dialer = Arc::new(common::proxy_dialer(&relay, "open_threshold=50&half_open_timeout=1h"));

    let concurrency = 20;
    let dials_per_task = 25;
    let rejected = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..concurrency {
        let dialer = dialer.clone();
        let rejected = rejected.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..dials_per_task {
                if let Err(e) = dialer.dial(Network::Tcp, TARGET).await {
                    if e.is_circuit_open() {
                        rejected.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let total = concurrency * dials_per_task;
    assert_eq!(dialer.snapshot().state, CircuitState::Open);
    assert!(relay.calls() >= 50);
    assert_eq!(relay.calls() + rejected.load(Ordering::SeqCst), total);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_load_balanced_failover_throughput() {
    let healthy = common::ScriptedDialer::new();
    let broken = common::ScriptedDialer::new();
    broken.fail(true);

    let upstreams: Vec<Arc<dyn Dialer>> = vec![
        Arc::new(common::proxy_dialer(&healthy, "")),
        Arc::new(common::proxy_dialer(&broken, "open_threshold=5&half_open_timeout=1h")),
    ];
    let dialer = Arc::new(LoadBalancedDialer::new(upstreams).unwrap());

    let concurrency = 10;
    let dials_per_task = 50;
    let start = Instant::now();

    let mut handles = Vec::new();
    for _ in 0..concurrency {
        let dialer = dialer.clone();
        handles.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..dials_per_task {
                if dialer.dial(Network::Tcp, TARGET).await.is_ok() {
                    ok += 1;
                }
            }
            ok
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        succeeded += handle.await.unwrap();
    }
    let elapsed = start.elapsed();

    println!(
        "{} dials in {:?} ({:.0} dials/sec)",
        concurrency * dials_per_task,
        elapsed,
        (concurrency * dials_per_task) as f64 / elapsed.as_secs_f64()
    );

    // The broken upstream stops being dialed once its circuit opens.
    assert_eq!(succeeded, concurrency * dials_per_task);
    assert!(broken.calls() < 5 + concurrency);
}

#[tokio::test]
async fn test_all_upstreams_open_fails_fast() {
    let relay = common::ScriptedDialer::new();
    relay.fail(true);
    let url = common::proxy_url("open_threshold=1&half_open_timeout=1h");
    let upstream = Arc::new(ProxyDialer::from_url(relay.clone(), &url).unwrap());
    let dialer = LoadBalancedDialer::new(vec![upstream.clone() as Arc<dyn Dialer>]).unwrap();

    dialer.dial(Network::Tcp, TARGET).await.unwrap_err();
    assert_eq!(upstream.snapshot().state, CircuitState::Open);

    let err = dialer.dial(Network::Tcp, TARGET).await.unwrap_err();
    match err {
        proxy_dialer::DialError::AllUpstreamsFailed { attempted, last } => {
            assert_eq!(attempted, 1);
            assert!(last.is_circuit_open());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(relay.calls(), 1);
}
