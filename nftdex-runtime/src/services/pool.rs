//! Liquidity pool service — factory pool creation and Pair liquidity ops.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use serde::Serialize;

use crate::chain::ChainClient;
use crate::contracts::{IPair, IPairFactory};
use crate::error::DexError;
use crate::gateway::{ContractWriteGateway, WriteCall, WriteTarget};
use crate::registry::ContractRegistry;
use crate::services::{format_wei, parse_address, parse_ether_amount, token_ids_to_u256};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolReserves {
    /// Ether-denominated decimal string.
    pub eth_reserve: String,
    pub nft_reserve: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolCreation {
    pub pool_address: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolPrices {
    pub current: String,
    pub sell: String,
}

/// Detailed state of one pool, or a bare `exists: false` marker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserves: Option<PoolReserves>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<PoolPrices>,
}

pub struct PoolService {
    chain: Arc<ChainClient>,
    gateway: Arc<ContractWriteGateway>,
    registry: Arc<ContractRegistry>,
    confirmations: u64,
    confirmation_timeout: Duration,
}

impl PoolService {
    pub fn new(
        chain: Arc<ChainClient>,
        gateway: Arc<ContractWriteGateway>,
        registry: Arc<ContractRegistry>,
        confirmations: u64,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            chain,
            gateway,
            registry,
            confirmations,
            confirmation_timeout,
        }
    }

    /// Create a pool for an NFT collection through the factory.
    ///
    /// The new pool's address is read from the `PoolCreated` event and
    /// registered as the active pair.
    pub async fn create_pool(&self, nft_contract: &str) -> Result<PoolCreation, DexError> {
        let factory = self.registry.factory().await?;
        let nft = parse_address("nftContract", nft_contract)?;

        let call = IPairFactory::createPoolCall { nftContract: nft };
        let tx_hash = self
            .gateway
            .submit(
                "PairFactory.createPool",
                WriteCall {
                    target: WriteTarget::Call(factory),
                    input: call.abi_encode().into(),
                    value: U256::ZERO,
                },
            )
            .await?;

        let receipt = self
            .gateway
            .confirm(tx_hash, self.confirmations, self.confirmation_timeout)
            .await?;

        let pool_address = parse_pool_created_event(&receipt).ok_or_else(|| {
            DexError::Chain("PoolCreated event missing from createPool receipt".into())
        })?;

        self.registry.set_pair(pool_address).await;
        tracing::info!(pool = %pool_address, nft = %nft, "Pool created");

        Ok(PoolCreation {
            pool_address: format!("{pool_address}"),
            tx_hash: format!("0x{}", hex::encode(tx_hash.as_slice())),
        })
    }

    /// Pool address for a collection, or `None` if the factory has none.
    pub async fn pool_address(&self, nft_contract: &str) -> Result<Option<Address>, DexError> {
        let factory_address = self.registry.factory().await?;
        let nft = parse_address("nftContract", nft_contract)?;

        let factory = IPairFactory::new(factory_address, self.chain.provider().clone());
        let pool = factory
            .getPoolAddress(nft)
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getPoolAddress() failed: {e}")))?;

        Ok((pool != Address::ZERO).then_some(pool))
    }

    pub async fn all_pools(&self) -> Result<Vec<String>, DexError> {
        let factory_address = self.registry.factory().await?;
        let factory = IPairFactory::new(factory_address, self.chain.provider().clone());

        let pools = factory
            .getAllPools()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getAllPools() failed: {e}")))?;

        Ok(pools.into_iter().map(|p| format!("{p}")).collect())
    }

    /// Seed a fresh pool with its first NFTs and ether.
    pub async fn add_initial_liquidity(
        &self,
        token_ids: &[u64],
        eth_amount: Option<&str>,
    ) -> Result<String, DexError> {
        let call = IPair::addInitialLiquidityCall {
            nftTokenIds: token_ids_to_u256(token_ids),
        };
        self.liquidity_write("Pair.addInitialLiquidity", call.abi_encode(), eth_amount)
            .await
    }

    pub async fn add_liquidity(
        &self,
        token_ids: &[u64],
        eth_amount: Option<&str>,
    ) -> Result<String, DexError> {
        let call = IPair::addLiquidityCall {
            nftTokenIds: token_ids_to_u256(token_ids),
        };
        self.liquidity_write("Pair.addLiquidity", call.abi_encode(), eth_amount)
            .await
    }

    /// Burn LP tokens and withdraw the listed NFTs plus proportional ether.
    pub async fn remove_liquidity(
        &self,
        lp_token_amount: &str,
        token_ids: &[u64],
    ) -> Result<String, DexError> {
        let call = IPair::removeLiquidityCall {
            lpTokenAmount: parse_ether_amount("lpTokenAmount", lp_token_amount)?,
            nftTokenIds: token_ids_to_u256(token_ids),
        };
        self.liquidity_write("Pair.removeLiquidity", call.abi_encode(), None)
            .await
    }

    async fn liquidity_write(
        &self,
        label: &str,
        input: Vec<u8>,
        eth_amount: Option<&str>,
    ) -> Result<String, DexError> {
        let pair = self.registry.pair().await?;
        let value = match eth_amount {
            Some(amount) => parse_ether_amount("ethAmount", amount)?,
            None => U256::ZERO,
        };

        let tx_hash = self
            .gateway
            .submit(
                label,
                WriteCall {
                    target: WriteTarget::Call(pair),
                    input: input.into(),
                    value,
                },
            )
            .await?;

        self.gateway
            .confirm(tx_hash, self.confirmations, self.confirmation_timeout)
            .await?;

        Ok(format!("0x{}", hex::encode(tx_hash.as_slice())))
    }

    /// Reserves of the registered pair.
    pub async fn reserves(&self) -> Result<PoolReserves, DexError> {
        let pair = self.registry.pair().await?;
        self.reserves_of(pair).await
    }

    pub async fn reserves_of(&self, pool: Address) -> Result<PoolReserves, DexError> {
        let pair = IPair::new(pool, self.chain.provider().clone());
        let reserves = pair
            .getPoolReserves()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getPoolReserves() failed: {e}")))?;

        Ok(PoolReserves {
            eth_reserve: format_wei(reserves.ethReserve),
            nft_reserve: reserves.nftReserveCount.try_into().unwrap_or(0),
        })
    }

    /// Existence, reserves, and spot prices for a collection's pool.
    pub async fn pool_info(&self, nft_contract: &str) -> Result<PoolInfo, DexError> {
        let Some(pool) = self.pool_address(nft_contract).await? else {
            return Ok(PoolInfo {
                exists: false,
                pool_address: None,
                reserves: None,
                prices: None,
            });
        };

        let reserves = self.reserves_of(pool).await?;

        let pair = IPair::new(pool, self.chain.provider().clone());
        let current = pair
            .getCurrentPrice()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getCurrentPrice() failed: {e}")))?;
        let sell = pair
            .getSellPrice()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getSellPrice() failed: {e}")))?;

        Ok(PoolInfo {
            exists: true,
            pool_address: Some(format!("{pool}")),
            reserves: Some(reserves),
            prices: Some(PoolPrices {
                current: format_wei(current),
                sell: format_wei(sell),
            }),
        })
    }
}

/// Extract the pool address from a `PoolCreated(address indexed poolAddress,
/// address indexed nftContract)` log.
fn parse_pool_created_event(receipt: &alloy::rpc::types::TransactionReceipt) -> Option<Address> {
    for log in receipt.inner.logs() {
        let topics = log.topics();
        if topics.len() >= 3 {
            return Some(Address::from_word(topics[1]));
        }
    }
    None
}
