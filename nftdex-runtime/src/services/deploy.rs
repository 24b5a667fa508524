//! Contract deployment service.
//!
//! Loads creation bytecode from the artifact tree, ABI-encodes constructor
//! arguments, submits the deployment through the write gateway, and records
//! the resulting address in the registry.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolValue};
use serde::Serialize;

use crate::artifacts::ArtifactLoader;
use crate::chain::ChainClient;
use crate::contracts::IStandardNFT;
use crate::error::DexError;
use crate::gateway::{ContractWriteGateway, WriteCall, WriteTarget};
use crate::registry::ContractRegistry;
use crate::services::{parse_address, parse_ether_amount};

#[derive(Debug, Clone)]
pub struct NftDeployParams {
    pub name: String,
    pub symbol: String,
    pub base_uri: String,
    pub max_supply: u64,
    pub max_mint_per_address: u64,
    /// Ether-denominated decimal string.
    pub mint_price: String,
}

/// Outcome of a confirmed deployment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub contract_address: String,
    pub tx_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
    /// Ether spent on the deployment transaction.
    pub deployment_cost: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftInfo {
    pub name: String,
    pub symbol: String,
    pub total_supply: String,
    pub balance: String,
}

pub struct DeployService {
    chain: Arc<ChainClient>,
    gateway: Arc<ContractWriteGateway>,
    artifacts: Arc<ArtifactLoader>,
    registry: Arc<ContractRegistry>,
    confirmations: u64,
    confirmation_timeout: Duration,
}

impl DeployService {
    pub fn new(
        chain: Arc<ChainClient>,
        gateway: Arc<ContractWriteGateway>,
        artifacts: Arc<ArtifactLoader>,
        registry: Arc<ContractRegistry>,
        confirmations: u64,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            chain,
            gateway,
            artifacts,
            registry,
            confirmations,
            confirmation_timeout,
        }
    }

    /// Deploy `StandardNFT` and register its address.
    pub async fn deploy_nft(&self, params: NftDeployParams) -> Result<Deployment, DexError> {
        tracing::info!(
            name = %params.name,
            symbol = %params.symbol,
            max_supply = params.max_supply,
            "Deploying NFT contract"
        );

        let mint_price = parse_ether_amount("mintPrice", &params.mint_price)?;
        let ctor_args = (
            params.name,
            params.symbol,
            params.base_uri,
            U256::from(params.max_supply),
            U256::from(params.max_mint_per_address),
            mint_price,
        )
            .abi_encode_params();

        let (deployment, address) = self.deploy("StandardNFT", ctor_args, U256::ZERO).await?;
        self.registry.set_nft(address).await;
        Ok(deployment)
    }

    /// Deploy a `Pair` bound to an NFT collection and register its address.
    pub async fn deploy_pair(&self, nft_contract: &str) -> Result<Deployment, DexError> {
        let nft = parse_address("nftContract", nft_contract)?;
        tracing::info!(nft = %nft, "Deploying Pair contract");

        let ctor_args = (nft,).abi_encode_params();
        let (deployment, address) = self.deploy("Pair", ctor_args, U256::ZERO).await?;
        self.registry.set_pair(address).await;
        Ok(deployment)
    }

    /// Deploy the `PairFactory` and register its address.
    pub async fn deploy_pair_factory(&self) -> Result<Deployment, DexError> {
        tracing::info!("Deploying PairFactory contract");

        let (deployment, address) = self.deploy("PairFactory", Vec::new(), U256::ZERO).await?;
        self.registry.set_factory(address).await;
        Ok(deployment)
    }

    async fn deploy(
        &self,
        contract_name: &str,
        ctor_args: Vec<u8>,
        value: U256,
    ) -> Result<(Deployment, Address), DexError> {
        let artifact = self.artifacts.load(contract_name, None).await?;

        let mut creation_code = artifact.bytecode.to_vec();
        creation_code.extend_from_slice(&ctor_args);

        let tx_hash = self
            .gateway
            .submit(
                &format!("{contract_name}.deploy"),
                WriteCall {
                    target: WriteTarget::Create,
                    input: creation_code.into(),
                    value,
                },
            )
            .await?;

        let receipt = self
            .gateway
            .confirm(tx_hash, self.confirmations, self.confirmation_timeout)
            .await?;

        let contract_address = receipt.contract_address.ok_or_else(|| {
            DexError::Chain(format!(
                "Deployment receipt for {contract_name} carries no contract address"
            ))
        })?;

        // Post-deploy verification: the address should now carry code.
        match self.chain.is_contract_deployed(contract_address).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(contract = contract_name, address = %contract_address,
                    "Deployed address carries no code")
            }
            Err(e) => tracing::warn!("Deployment code check failed: {e}"),
        }

        let gas_used: u64 = receipt.gas_used.try_into().unwrap_or(u64::MAX);
        let cost = U256::from(receipt.gas_used) * U256::from(receipt.effective_gas_price);

        tracing::info!(
            contract = contract_name,
            address = %contract_address,
            gas_used,
            "Contract deployed"
        );

        let deployment = Deployment {
            contract_address: format!("{contract_address}"),
            tx_hash: format!("0x{}", hex::encode(tx_hash.as_slice())),
            block_number: receipt.block_number.unwrap_or(0),
            gas_used,
            deployment_cost: format_ether(cost),
        };
        Ok((deployment, contract_address))
    }

    /// Mint one NFT to `to`, optionally attaching ether for a paid mint.
    pub async fn mint_nft(
        &self,
        to: &str,
        uri: &str,
        value: Option<&str>,
    ) -> Result<String, DexError> {
        let nft = self.registry.nft().await?;
        let to = parse_address("to", to)?;
        let value = match value {
            Some(amount) => parse_ether_amount("value", amount)?,
            None => U256::ZERO,
        };

        let call = IStandardNFT::mintCall {
            to,
            uri: uri.to_string(),
        };

        let tx_hash = self
            .gateway
            .submit(
                "StandardNFT.mint",
                WriteCall {
                    target: WriteTarget::Call(nft),
                    input: call.abi_encode().into(),
                    value,
                },
            )
            .await?;

        self.gateway
            .confirm(tx_hash, self.confirmations, self.confirmation_timeout)
            .await?;

        Ok(format!("0x{}", hex::encode(tx_hash.as_slice())))
    }

    /// Read the registered NFT collection's descriptive state.
    pub async fn nft_info(&self) -> Result<NftInfo, DexError> {
        let address = self.registry.nft().await?;
        let nft = IStandardNFT::new(address, self.chain.provider().clone());

        let name = nft
            .name()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("name() failed: {e}")))?;
        let symbol = nft
            .symbol()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("symbol() failed: {e}")))?;
        let total_supply = nft
            .totalSupply()
            .call()
            .await
            .map_err(|e| DexError::Call(format!("totalSupply() failed: {e}")))?;
        let balance = nft
            .balanceOf(self.chain.address())
            .call()
            .await
            .map_err(|e| DexError::Call(format!("balanceOf() failed: {e}")))?;

        Ok(NftInfo {
            name,
            symbol,
            total_supply: total_supply.to_string(),
            balance: balance.to_string(),
        })
    }

    /// Contract names with a usable build artifact.
    pub async fn available_contracts(&self) -> Result<Vec<String>, DexError> {
        self.artifacts.list_available().await
    }
}
