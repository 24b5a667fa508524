//! Trading service — buys, sells, and price/history queries against the Pair.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use serde::Serialize;

use crate::chain::ChainClient;
use crate::contracts::IPair;
use crate::error::DexError;
use crate::gateway::{ContractWriteGateway, WriteCall, WriteTarget};
use crate::registry::ContractRegistry;
use crate::services::{format_wei, parse_ether_amount};

/// A decoded on-chain trade record, prices in ether units.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub trader: String,
    pub is_buy: bool,
    pub price: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyQuote {
    pub total_cost: String,
    pub fee: String,
}

pub struct TradeService {
    chain: Arc<ChainClient>,
    gateway: Arc<ContractWriteGateway>,
    registry: Arc<ContractRegistry>,
    confirmations: u64,
    confirmation_timeout: Duration,
}

impl TradeService {
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

    /// Buy one NFT from the pool, paying at most `max_price` ether.
    ///
    /// The cap is both the contract-side slippage bound and the attached
    /// value; the pool refunds the difference from the actual price.
    pub async fn buy(&self, max_price: &str) -> Result<String, DexError> {
        let pair = self.registry.pair().await?;
        let max_price_wei = parse_ether_amount("maxPrice", max_price)?;

        let call = IPair::buyNFTCall {
            maxPrice: max_price_wei,
        };

        let tx_hash = self
            .gateway
            .submit(
                "Pair.buyNFT",
                WriteCall {
                    target: WriteTarget::Call(pair),
                    input: call.abi_encode().into(),
                    value: max_price_wei,
                },
            )
            .await?;

        self.gateway
            .confirm(tx_hash, self.confirmations, self.confirmation_timeout)
            .await?;

        Ok(format!("0x{}", hex::encode(tx_hash.as_slice())))
    }

    /// Sell an NFT into the pool for at least `min_price` ether.
    pub async fn sell(&self, token_id: u64, min_price: &str) -> Result<String, DexError> {
        let pair = self.registry.pair().await?;

        let call = IPair::sellNFTCall {
            tokenId: U256::from(token_id),
            minPrice: parse_ether_amount("minPrice", min_price)?,
        };

        let tx_hash = self
            .gateway
            .submit(
                "Pair.sellNFT",
                WriteCall {
                    target: WriteTarget::Call(pair),
                    input: call.abi_encode().into(),
                    value: U256::ZERO,
                },
            )
            .await?;

        self.gateway
            .confirm(tx_hash, self.confirmations, self.confirmation_timeout)
            .await?;

        Ok(format!("0x{}", hex::encode(tx_hash.as_slice())))
    }

    pub async fn current_price(&self) -> Result<String, DexError> {
        let pair = self.pair_instance().await?;
        let price = pair
            .getCurrentPrice()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getCurrentPrice() failed: {e}")))?;
        Ok(format_wei(price))
    }

    pub async fn sell_price(&self) -> Result<String, DexError> {
        let pair = self.pair_instance().await?;
        let price = pair
            .getSellPrice()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getSellPrice() failed: {e}")))?;
        Ok(format_wei(price))
    }

    pub async fn buy_quote(&self) -> Result<BuyQuote, DexError> {
        let pair = self.pair_instance().await?;
        let quote = pair
            .getBuyQuote()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getBuyQuote() failed: {e}")))?;

        Ok(BuyQuote {
            total_cost: format_wei(quote.totalCost),
            fee: format_wei(quote.fee),
        })
    }

    /// Full trade history, oldest first, as recorded by the pair contract.
    pub async fn trade_history(&self) -> Result<Vec<TradeRecord>, DexError> {
        let pair = self.pair_instance().await?;
        let trades = pair
            .getTradeHistory()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getTradeHistory() failed: {e}")))?;

        Ok(trades.into_iter().map(decode_trade).collect())
    }

    pub async fn recent_trades(&self, count: u64) -> Result<Vec<TradeRecord>, DexError> {
        let pair = self.pair_instance().await?;
        let trades = pair
            .getRecentTrades(U256::from(count))
            .call()
            .await
            .map_err(|e| DexError::Call(format!("getRecentTrades() failed: {e}")))?;

        Ok(trades.into_iter().map(decode_trade).collect())
    }

    async fn pair_instance(
        &self,
    ) -> Result<IPair::IPairInstance<crate::chain::HttpProvider>, DexError> {
        let address: Address = self.registry.pair().await?;
        Ok(IPair::new(address, self.chain.provider().clone()))
    }
}

fn decode_trade(trade: IPair::TradeInfo) -> TradeRecord {
    TradeRecord {
        trader: format!("{}", trade.trader),
        is_buy: trade.isBuy,
        price: format_wei(trade.price),
        timestamp: trade.timestamp.try_into().unwrap_or(0),
    }
}
