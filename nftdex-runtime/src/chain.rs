//! Chain client for the EVM node behind the service.
//!
//! Wraps a configured alloy provider with a local signer and exposes the read
//! and diagnostic primitives the domain services need. Transaction dispatch
//! goes through [`crate::gateway::ContractWriteGateway`], which assigns nonces
//! explicitly; confirmation is a separate, bounded polling operation so
//! callers decide how long a receipt is worth waiting for.

use std::time::Duration;

use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
};
use alloy::providers::{Identity, Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use serde::Serialize;

use crate::error::DexError;

/// The concrete provider type produced by `ProviderBuilder::new().wallet(...).connect_http(...)`.
pub type HttpProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
    Ethereum,
>;

/// Which view of the account's transaction count to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountView {
    /// Includes transactions accepted into the node's pending pool.
    Pending,
    /// Latest mined block only.
    Latest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub block_number: u64,
    pub gas_price: String,
}

/// A chain client wrapping an alloy provider with a local signer.
pub struct ChainClient {
    provider: HttpProvider,
    address: Address,
    chain_id: u64,
    receipt_poll_interval: Duration,
}

impl ChainClient {
    /// Create a new chain client from an RPC URL and hex-encoded private key.
    ///
    /// The private key may carry a "0x" prefix. No network traffic happens
    /// here; call [`check_connectivity`](Self::check_connectivity) before
    /// serving requests.
    pub fn new(rpc_url: &str, private_key: &str, chain_id: u64) -> Result<Self, DexError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| DexError::Config(format!("Invalid private key: {e}")))?;
        let address = signer.address();

        let wallet = EthereumWallet::from(signer);

        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| DexError::Config(format!("Invalid RPC URL: {e}")))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self {
            provider,
            address,
            chain_id,
            receipt_poll_interval: Duration::from_millis(500),
        })
    }

    /// Override the receipt polling cadence (tests use a short interval).
    pub fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self
    }

    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }

    /// The address of the service's signing account.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Verify the node is reachable and serves the configured chain.
    ///
    /// A hard startup prerequisite: the binary refuses to accept traffic if
    /// this fails.
    pub async fn check_connectivity(&self) -> Result<(), DexError> {
        let reported = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| DexError::Connectivity(format!("Node unreachable: {e}")))?;

        if reported != self.chain_id {
            return Err(DexError::Connectivity(format!(
                "Chain ID mismatch: node reports {reported}, configured {}",
                self.chain_id
            )));
        }

        let block = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| DexError::Connectivity(format!("Block number query failed: {e}")))?;

        tracing::info!(chain_id = reported, block, "Chain connectivity verified");
        Ok(())
    }

    pub async fn network_info(&self) -> Result<NetworkInfo, DexError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| DexError::Chain(format!("Chain ID query failed: {e}")))?;
        let block_number = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| DexError::Chain(format!("Block number query failed: {e}")))?;
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| DexError::Chain(format!("Gas price query failed: {e}")))?;

        Ok(NetworkInfo {
            chain_id,
            block_number,
            gas_price: gas_price.to_string(),
        })
    }

    /// Transaction count for an account, against the requested view.
    pub async fn transaction_count(
        &self,
        address: Address,
        view: CountView,
    ) -> Result<u64, DexError> {
        let call = self.provider.get_transaction_count(address);
        let result = match view {
            CountView::Pending => call.pending().await,
            CountView::Latest => call.latest().await,
        };
        result.map_err(|e| DexError::Chain(format!("Transaction count query failed: {e}")))
    }

    pub async fn get_balance(&self, address: Address) -> Result<U256, DexError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| DexError::Chain(format!("Balance query failed: {e}")))
    }

    pub async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, DexError> {
        self.provider
            .estimate_gas(tx)
            .await
            .map_err(|e| DexError::Rejected(format!("Gas estimation failed: {e}")))
    }

    pub async fn gas_price(&self) -> Result<u128, DexError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| DexError::Chain(format!("Gas price query failed: {e}")))
    }

    /// Whether an address carries deployed code.
    pub async fn is_contract_deployed(&self, address: Address) -> Result<bool, DexError> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .map_err(|e| DexError::Chain(format!("Code query failed: {e}")))?;
        Ok(!code.is_empty())
    }

    /// Poll for a receipt until the transaction is mined to the requested
    /// depth, or `timeout` elapses.
    ///
    /// A mined-but-reverted transaction is a [`DexError::Reverted`] — distinct
    /// from "not yet found", which keeps polling until the deadline and then
    /// surfaces [`DexError::NeverConfirmed`].
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: B256,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<TransactionReceipt, DexError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| DexError::Chain(format!("Receipt query failed: {e}")))?;

            if let Some(receipt) = receipt {
                if !receipt.status() {
                    return Err(DexError::Reverted {
                        tx_hash: format!("{tx_hash}"),
                    });
                }

                let mined_in = receipt.block_number.unwrap_or(0);
                let head = self
                    .provider
                    .get_block_number()
                    .await
                    .map_err(|e| DexError::Chain(format!("Block number query failed: {e}")))?;

                if head + 1 >= mined_in + confirmations {
                    tracing::info!(
                        tx = %tx_hash,
                        block = mined_in,
                        gas_used = receipt.gas_used as u64,
                        "Transaction confirmed"
                    );
                    return Ok(receipt);
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(DexError::NeverConfirmed {
                    tx_hash: format!("{tx_hash}"),
                    waited_secs: timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hardhat account #0 — test key only.
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_chain_client_creation() {
        let client = ChainClient::new("http://localhost:8545", TEST_KEY, 31337).unwrap();
        assert_eq!(client.chain_id(), 31337);
        assert_eq!(
            format!("{}", client.address()).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(ChainClient::new("http://localhost:8545", "not-a-key", 1).is_err());
    }

    #[test]
    fn test_invalid_rpc_url() {
        assert!(ChainClient::new("not a url", TEST_KEY, 1).is_err());
    }
}
