//! Nonce sequencing for the single signing account.
//!
//! Every write transaction must carry a distinct, gap-free nonce. Concurrent
//! HTTP requests all write through one wallet, so acquisition is serialized:
//! [`NonceSequencer::acquire`] returns a [`NonceLease`] that holds the
//! sequencer's mutex until the transaction is dispatched (or the attempt is
//! abandoned). Only one request at a time may be constructing and submitting
//! its transaction.
//!
//! The value handed out is `max(pending_count, local_floor)`: the chain is
//! re-queried under the lock on every acquisition, and the floor — advanced
//! only when a dispatch succeeds — covers the window where a just-accepted
//! transaction is not yet visible in the node's pending count.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::chain::{ChainClient, CountView};
use crate::error::DexError;

#[derive(Debug)]
struct NonceState {
    /// Next nonce this process expects, based on its own dispatches.
    /// `None` after startup or `reset()` — trust only the chain.
    floor: Option<u64>,
}

#[derive(Clone)]
pub struct NonceSequencer {
    chain: Arc<ChainClient>,
    state: Arc<Mutex<NonceState>>,
}

/// An exclusive claim on one nonce value.
///
/// The lease keeps the sequencer locked; drop it to abandon the attempt
/// (the value will be observed again on the next acquisition), or call
/// [`dispatched`](Self::dispatched) once the node has accepted the
/// transaction.
#[derive(Debug)]
pub struct NonceLease {
    nonce: u64,
    guard: OwnedMutexGuard<NonceState>,
}

impl NonceLease {
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Mark the leased nonce as consumed by an accepted transaction,
    /// advancing the sequencer's floor past it.
    pub fn dispatched(mut self) {
        self.guard.floor = Some(self.nonce + 1);
    }
}

impl NonceSequencer {
    pub fn new(chain: Arc<ChainClient>) -> Self {
        Self {
            chain,
            state: Arc::new(Mutex::new(NonceState { floor: None })),
        }
    }

    /// Lease the next nonce for the signing account.
    ///
    /// Queries the node's pending-inclusive transaction count under the lock;
    /// if that fails, falls back to the latest-confirmed count before giving
    /// up. Concurrent callers wait until the current lease is resolved.
    pub async fn acquire(&self) -> Result<NonceLease, DexError> {
        let guard = self.state.clone().lock_owned().await;
        let address = self.chain.address();

        let chain_count = match self.chain.transaction_count(address, CountView::Pending).await {
            Ok(count) => count,
            Err(pending_err) => {
                tracing::warn!(
                    error = %pending_err,
                    "Pending transaction count query failed, falling back to latest"
                );
                self.chain
                    .transaction_count(address, CountView::Latest)
                    .await?
            }
        };

        let nonce = match guard.floor {
            Some(floor) => chain_count.max(floor),
            None => chain_count,
        };

        tracing::debug!(nonce, chain_count, floor = ?guard.floor, "Nonce leased");
        Ok(NonceLease { nonce, guard })
    }

    /// Forget the local floor so the next [`acquire`](Self::acquire) trusts
    /// only the chain. Escape hatch for recovering from interference by
    /// transactions sent outside this process.
    pub async fn reset(&self) {
        let mut guard = self.state.lock().await;
        guard.floor = None;
        tracing::info!("Nonce state reset, next acquisition will requery the chain");
    }
}
