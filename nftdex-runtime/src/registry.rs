//! Process-lifetime registry of deployed contract addresses.

use alloy::primitives::Address;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::DexError;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ContractAddresses {
    #[serde(rename = "nftContract")]
    pub nft: Option<Address>,
    #[serde(rename = "pairContract")]
    pub pair: Option<Address>,
    #[serde(rename = "pairFactory")]
    pub factory: Option<Address>,
}

/// Role → address mapping, populated at deploy time or set explicitly by the
/// operator. Not persisted across restarts.
#[derive(Debug, Default)]
pub struct ContractRegistry {
    addresses: RwLock<ContractAddresses>,
}

impl ContractRegistry {
    pub fn new(initial: ContractAddresses) -> Self {
        Self {
            addresses: RwLock::new(initial),
        }
    }

    pub async fn snapshot(&self) -> ContractAddresses {
        *self.addresses.read().await
    }

    /// Merge the provided addresses; `None` fields leave existing entries.
    pub async fn update(&self, update: ContractAddresses) {
        let mut addresses = self.addresses.write().await;
        if let Some(nft) = update.nft {
            addresses.nft = Some(nft);
        }
        if let Some(pair) = update.pair {
            addresses.pair = Some(pair);
        }
        if let Some(factory) = update.factory {
            addresses.factory = Some(factory);
        }
        tracing::info!(
            nft = ?addresses.nft,
            pair = ?addresses.pair,
            factory = ?addresses.factory,
            "Contract addresses updated"
        );
    }

    pub async fn set_nft(&self, address: Address) {
        self.addresses.write().await.nft = Some(address);
    }

    pub async fn set_pair(&self, address: Address) {
        self.addresses.write().await.pair = Some(address);
    }

    pub async fn set_factory(&self, address: Address) {
        self.addresses.write().await.factory = Some(address);
    }

    pub async fn nft(&self) -> Result<Address, DexError> {
        self.snapshot().await.nft.ok_or(DexError::NotDeployed("NFT"))
    }

    pub async fn pair(&self) -> Result<Address, DexError> {
        self.snapshot().await.pair.ok_or(DexError::NotDeployed("Pair"))
    }

    pub async fn factory(&self) -> Result<Address, DexError> {
        self.snapshot()
            .await
            .factory
            .ok_or(DexError::NotDeployed("PairFactory"))
    }
}
