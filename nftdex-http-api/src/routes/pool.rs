//! Liquidity pool endpoints.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::ApiState;
use crate::response::{ApiResult, success};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolRequest {
    pub nft_contract_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityRequest {
    pub nft_token_ids: Vec<u64>,
    /// Ether to deposit alongside the NFTs.
    pub eth_amount: Option<String>,
    /// Route to `addInitialLiquidity` for a fresh pool.
    #[serde(default)]
    pub initial: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLiquidityRequest {
    pub lp_token_amount: String,
    pub nft_token_ids: Vec<u64>,
}

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/pool", get(all_pools))
        .route("/pool/create", post(create_pool))
        .route("/pool/add-liquidity", post(add_liquidity))
        .route("/pool/remove-liquidity", post(remove_liquidity))
        .route("/pool/reserves", get(reserves))
        .route("/pool/{nft_contract_address}", get(pool_info))
}

async fn create_pool(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreatePoolRequest>,
) -> ApiResult {
    let creation = state.pool.create_pool(&request.nft_contract_address).await?;
    Ok(success(creation, "Pool created successfully"))
}

async fn add_liquidity(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AddLiquidityRequest>,
) -> ApiResult {
    let tx_hash = if request.initial {
        state
            .pool
            .add_initial_liquidity(&request.nft_token_ids, request.eth_amount.as_deref())
            .await?
    } else {
        state
            .pool
            .add_liquidity(&request.nft_token_ids, request.eth_amount.as_deref())
            .await?
    };

    Ok(success(
        json!({
            "txHash": tx_hash,
            "nftTokenIds": request.nft_token_ids,
            "ethAmount": request.eth_amount,
        }),
        "Liquidity added successfully",
    ))
}

async fn remove_liquidity(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<RemoveLiquidityRequest>,
) -> ApiResult {
    let tx_hash = state
        .pool
        .remove_liquidity(&request.lp_token_amount, &request.nft_token_ids)
        .await?;

    Ok(success(
        json!({
            "txHash": tx_hash,
            "lpTokenAmount": request.lp_token_amount,
            "nftTokenIds": request.nft_token_ids,
        }),
        "Liquidity removed successfully",
    ))
}

async fn all_pools(State(state): State<Arc<ApiState>>) -> ApiResult {
    let pools = state.pool.all_pools().await?;
    let count = pools.len();
    Ok(success(
        json!({"pools": pools, "count": count}),
        "All pools retrieved successfully",
    ))
}

async fn reserves(State(state): State<Arc<ApiState>>) -> ApiResult {
    let reserves = state.pool.reserves().await?;
    Ok(success(reserves, "Pool reserves retrieved successfully"))
}

async fn pool_info(
    State(state): State<Arc<ApiState>>,
    Path(nft_contract_address): Path<String>,
) -> ApiResult {
    let info = state.pool.pool_info(&nft_contract_address).await?;
    let message = if info.exists {
        "Pool info retrieved successfully"
    } else {
        "Pool does not exist"
    };
    Ok(success(info, message))
}
