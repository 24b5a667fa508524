//! Contract write gateway — the single path for state-changing transactions.
//!
//! Combines a target (or contract creation), pre-encoded calldata, and an
//! optional value into a signed, submitted transaction. One nonce lease per
//! call, held across dispatch; the returned hash is available immediately and
//! confirmation is the caller's separate concern.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::chain::ChainClient;
use crate::error::DexError;
use crate::nonce::NonceSequencer;

/// Destination of a write: an existing contract or a deployment.
#[derive(Debug, Clone)]
pub enum WriteTarget {
    Call(Address),
    Create,
}

/// A fully-described write request, ready for nonce assignment and dispatch.
#[derive(Debug, Clone)]
pub struct WriteCall {
    pub target: WriteTarget,
    /// ABI-encoded calldata, or creation code for deployments.
    pub input: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Confirmed,
    Failed,
}

/// Operator-visible record of a dispatched transaction. A record that never
/// leaves `submitted` marks a transaction the network may have dropped; this
/// service does not retry or replace it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub tx_hash: String,
    pub label: String,
    pub nonce: u64,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
}

#[derive(Default)]
pub struct SubmissionTracker {
    records: DashMap<String, SubmissionRecord>,
}

impl SubmissionTracker {
    pub fn record(&self, record: SubmissionRecord) {
        self.records.insert(record.tx_hash.clone(), record);
    }

    pub fn mark(&self, tx_hash: &str, status: SubmissionStatus) {
        if let Some(mut record) = self.records.get_mut(tx_hash) {
            record.status = status;
        }
    }

    /// Records still awaiting a confirmation outcome.
    pub fn pending(&self) -> Vec<SubmissionRecord> {
        let mut out: Vec<SubmissionRecord> = self
            .records
            .iter()
            .filter(|r| r.status == SubmissionStatus::Submitted)
            .map(|r| r.value().clone())
            .collect();
        out.sort_by_key(|r| r.nonce);
        out
    }

    pub fn all(&self) -> Vec<SubmissionRecord> {
        let mut out: Vec<SubmissionRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();
        out.sort_by_key(|r| r.nonce);
        out
    }
}

pub struct ContractWriteGateway {
    chain: Arc<ChainClient>,
    nonces: NonceSequencer,
    tracker: Arc<SubmissionTracker>,
}

impl ContractWriteGateway {
    pub fn new(chain: Arc<ChainClient>, nonces: NonceSequencer) -> Self {
        Self {
            chain,
            nonces,
            tracker: Arc::new(SubmissionTracker::default()),
        }
    }

    pub fn tracker(&self) -> Arc<SubmissionTracker> {
        self.tracker.clone()
    }

    /// Sign and dispatch one transaction, returning its hash without waiting
    /// for it to mine.
    ///
    /// The nonce lease is held from acquisition through dispatch, so
    /// concurrent writes serialize here. Gas limit and price are resolved
    /// explicitly; rejection by the node (bad nonce, insufficient funds,
    /// failed simulation) surfaces as [`DexError::Rejected`] with the node's
    /// message, and the leased nonce is simply re-observed by the next writer.
    pub async fn submit(&self, label: &str, call: WriteCall) -> Result<B256, DexError> {
        let lease = self.nonces.acquire().await?;

        let base = TransactionRequest::default()
            .with_from(self.chain.address())
            .with_value(call.value)
            .with_chain_id(self.chain.chain_id());

        let tx = match call.target {
            WriteTarget::Call(to) => base.with_to(to).with_input(call.input),
            WriteTarget::Create => base.with_deploy_code(call.input),
        };

        let gas_limit = self.chain.estimate_gas(tx.clone()).await?;
        let gas_price = self.chain.gas_price().await?;

        let nonce = lease.nonce();
        let tx = tx
            .with_nonce(nonce)
            .with_gas_limit(gas_limit)
            .with_gas_price(gas_price);

        let pending = self
            .chain
            .provider()
            .send_transaction(tx)
            .await
            .map_err(|e| {
                tracing::error!(label, nonce, error = %e, "Transaction rejected");
                DexError::Rejected(format!("{label}: {e}"))
            })?;

        let tx_hash = *pending.tx_hash();
        lease.dispatched();

        self.tracker.record(SubmissionRecord {
            tx_hash: format!("0x{}", hex::encode(tx_hash.as_slice())),
            label: label.to_string(),
            nonce,
            submitted_at: Utc::now(),
            status: SubmissionStatus::Submitted,
        });

        tracing::info!(label, tx = %tx_hash, "Transaction submitted");
        Ok(tx_hash)
    }

    /// Wait for a submitted transaction and settle its tracker record.
    ///
    /// A reverted execution marks the record failed; a transaction that never
    /// shows up within `timeout` stays `submitted` — visible in
    /// [`SubmissionTracker::pending`] rather than silently lost.
    pub async fn confirm(
        &self,
        tx_hash: B256,
        confirmations: u64,
        timeout: std::time::Duration,
    ) -> Result<alloy::rpc::types::TransactionReceipt, DexError> {
        let key = format!("0x{}", hex::encode(tx_hash.as_slice()));
        match self
            .chain
            .wait_for_confirmation(tx_hash, confirmations, timeout)
            .await
        {
            Ok(receipt) => {
                self.tracker.mark(&key, SubmissionStatus::Confirmed);
                Ok(receipt)
            }
            Err(e) => {
                if matches!(e, DexError::Reverted { .. }) {
                    self.tracker.mark(&key, SubmissionStatus::Failed);
                }
                Err(e)
            }
        }
    }
}
