//! Contract deployment and address-registry endpoints.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use nftdex_runtime::registry::ContractAddresses;
use nftdex_runtime::services::deploy::NftDeployParams;

use crate::ApiState;
use crate::response::{ApiResult, success};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployNftRequest {
    pub name: String,
    pub symbol: String,
    #[serde(rename = "baseURI")]
    pub base_uri: String,
    pub max_supply: u64,
    pub max_mint_per_address: u64,
    /// Ether-denominated decimal string.
    pub mint_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployPairRequest {
    pub nft_contract_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub to: String,
    pub uri: String,
    /// Ether to attach for a paid mint.
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressesRequest {
    pub nft_contract: Option<String>,
    pub pair_contract: Option<String>,
    pub pair_factory: Option<String>,
}

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/deploy/nft", post(deploy_nft))
        .route("/deploy/nft/mint", post(mint_nft))
        .route("/deploy/nft/info", get(nft_info))
        .route("/deploy/pair", post(deploy_pair))
        .route("/deploy/pair-factory", post(deploy_pair_factory))
        .route("/deploy/contracts", get(deployed_contracts))
        .route("/deploy/addresses", post(update_addresses))
        .route("/deploy/artifacts", get(available_artifacts))
}

async fn deploy_nft(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<DeployNftRequest>,
) -> ApiResult {
    let deployment = state
        .deploy
        .deploy_nft(NftDeployParams {
            name: request.name.clone(),
            symbol: request.symbol.clone(),
            base_uri: request.base_uri,
            max_supply: request.max_supply,
            max_mint_per_address: request.max_mint_per_address,
            mint_price: request.mint_price,
        })
        .await?;

    Ok(success(deployment, "NFT contract deployed successfully"))
}

async fn deploy_pair(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<DeployPairRequest>,
) -> ApiResult {
    let deployment = state
        .deploy
        .deploy_pair(&request.nft_contract_address)
        .await?;
    Ok(success(deployment, "Pair contract deployed successfully"))
}

async fn deploy_pair_factory(State(state): State<Arc<ApiState>>) -> ApiResult {
    let deployment = state.deploy.deploy_pair_factory().await?;
    Ok(success(
        deployment,
        "PairFactory contract deployed successfully",
    ))
}

async fn mint_nft(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<MintRequest>,
) -> ApiResult {
    let tx_hash = state
        .deploy
        .mint_nft(&request.to, &request.uri, request.value.as_deref())
        .await?;
    Ok(success(
        json!({"txHash": tx_hash, "to": request.to}),
        "NFT minted successfully",
    ))
}

async fn nft_info(State(state): State<Arc<ApiState>>) -> ApiResult {
    let info = state.deploy.nft_info().await?;
    Ok(success(info, "NFT info retrieved successfully"))
}

async fn deployed_contracts(State(state): State<Arc<ApiState>>) -> ApiResult {
    let addresses = state.registry.snapshot().await;
    Ok(success(
        addresses,
        "Deployed contract addresses retrieved successfully",
    ))
}

async fn update_addresses(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<UpdateAddressesRequest>,
) -> ApiResult {
    let parse = |field: &str, value: Option<String>| {
        value
            .map(|v| {
                v.parse().map_err(|e| {
                    nftdex_runtime::DexError::Validation(format!("Invalid {field} address: {e}"))
                })
            })
            .transpose()
    };

    let update = ContractAddresses {
        nft: parse("nftContract", request.nft_contract)?,
        pair: parse("pairContract", request.pair_contract)?,
        factory: parse("pairFactory", request.pair_factory)?,
    };

    state.registry.update(update).await;
    let addresses = state.registry.snapshot().await;
    Ok(success(addresses, "Contract addresses updated successfully"))
}

async fn available_artifacts(State(state): State<Arc<ApiState>>) -> ApiResult {
    let contracts = state.deploy.available_contracts().await?;
    Ok(success(
        json!({"contracts": contracts}),
        "Available contracts retrieved successfully",
    ))
}
