//! Nonce sequencer properties against a scripted node.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use nftdex_runtime::chain::ChainClient;
use nftdex_runtime::error::DexError;
use nftdex_runtime::nonce::NonceSequencer;

use common::{CHAIN_ID, TEST_KEY, start_mock_node};

fn sequencer(uri: &str) -> NonceSequencer {
    let chain = Arc::new(ChainClient::new(uri, TEST_KEY, CHAIN_ID).unwrap());
    NonceSequencer::new(chain)
}

#[tokio::test]
async fn serial_acquires_track_pending_count() {
    let (server, state) = start_mock_node().await;
    let nonces = sequencer(&server.uri());

    state.tx_count.store(5, Ordering::SeqCst);
    let lease = nonces.acquire().await.unwrap();
    assert_eq!(lease.nonce(), 5);
    lease.dispatched();

    // The node sees the dispatched transaction in its pending pool.
    state.tx_count.store(6, Ordering::SeqCst);
    let lease = nonces.acquire().await.unwrap();
    assert_eq!(lease.nonce(), 6);
    lease.dispatched();

    state.tx_count.store(7, Ordering::SeqCst);
    let lease = nonces.acquire().await.unwrap();
    assert_eq!(lease.nonce(), 7);
}

#[tokio::test]
async fn floor_covers_pending_pool_lag() {
    let (server, state) = start_mock_node().await;
    let nonces = sequencer(&server.uri());

    // The node's pending view never advances: the floor must still hand out
    // distinct values for consecutive dispatches.
    state.tx_count.store(3, Ordering::SeqCst);

    let lease = nonces.acquire().await.unwrap();
    assert_eq!(lease.nonce(), 3);
    lease.dispatched();

    let lease = nonces.acquire().await.unwrap();
    assert_eq!(lease.nonce(), 4);
    lease.dispatched();

    let lease = nonces.acquire().await.unwrap();
    assert_eq!(lease.nonce(), 5);
}

#[tokio::test]
async fn concurrent_acquires_are_distinct_and_gap_free() {
    let (server, _state) = start_mock_node().await;
    let nonces = sequencer(&server.uri());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let nonces = nonces.clone();
        handles.push(tokio::spawn(async move {
            let lease = nonces.acquire().await.unwrap();
            let nonce = lease.nonce();
            // Simulate the dispatch happening while the lease is held.
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            lease.dispatched();
            nonce
        }));
    }

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.unwrap());
    }
    seen.sort_unstable();

    let expected: Vec<u64> = (0..8).collect();
    assert_eq!(seen, expected, "nonces must be distinct and gap-free");
}

#[tokio::test]
async fn pending_failure_falls_back_to_latest() {
    let (server, state) = start_mock_node().await;
    let nonces = sequencer(&server.uri());

    state.fail_pending_count.store(true, Ordering::SeqCst);
    state.latest_tx_count.store(4, Ordering::SeqCst);

    let lease = nonces.acquire().await.unwrap();
    assert_eq!(lease.nonce(), 4);
}

#[tokio::test]
async fn both_count_queries_failing_is_a_typed_error() {
    let (server, state) = start_mock_node().await;
    let nonces = sequencer(&server.uri());

    state.fail_all_counts.store(true, Ordering::SeqCst);

    let err = nonces.acquire().await.unwrap_err();
    assert!(matches!(err, DexError::Chain(_)), "got {err:?}");
}

#[tokio::test]
async fn reset_requeries_the_chain() {
    let (server, state) = start_mock_node().await;
    let nonces = sequencer(&server.uri());

    state.tx_count.store(0, Ordering::SeqCst);
    let lease = nonces.acquire().await.unwrap();
    lease.dispatched();

    // Floor says 1, chain still says 0. After reset, trust the chain again —
    // e.g. the operator cleared a stuck local session.
    let lease = nonces.acquire().await.unwrap();
    assert_eq!(lease.nonce(), 1);
    drop(lease);

    nonces.reset().await;
    let lease = nonces.acquire().await.unwrap();
    assert_eq!(lease.nonce(), 0);
}
