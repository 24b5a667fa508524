//! Wallet and node diagnostics, plus the operator nonce escape hatch.

use alloy::primitives::utils::format_ether;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use nftdex_runtime::error::DexError;

use crate::ApiState;
use crate::response::{ApiResult, success};

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    /// Defaults to the service's signing account.
    pub address: Option<String>,
}

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/web3/network", get(network))
        .route("/web3/balance", get(balance))
        .route("/web3/pending", get(pending))
        .route("/web3/reset-nonce", post(reset_nonce))
}

async fn network(State(state): State<Arc<ApiState>>) -> ApiResult {
    let info = state.chain.network_info().await?;
    Ok(success(info, "Network info retrieved successfully"))
}

async fn balance(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult {
    let address = match query.address.as_deref() {
        Some(address) => address
            .parse()
            .map_err(|e| DexError::Validation(format!("Invalid address: {e}")))?,
        None => state.chain.address(),
    };

    let balance = state.chain.get_balance(address).await?;
    Ok(success(
        json!({
            "address": format!("{address}"),
            "balance": format_ether(balance),
        }),
        "Balance retrieved successfully",
    ))
}

/// Transactions dispatched by this process that have not settled.
async fn pending(State(state): State<Arc<ApiState>>) -> ApiResult {
    let pending = state.tracker.pending();
    let count = pending.len();
    Ok(success(
        json!({"submissions": pending, "count": count}),
        "Pending submissions retrieved successfully",
    ))
}

async fn reset_nonce(State(state): State<Arc<ApiState>>) -> ApiResult {
    state.nonces.reset().await;
    Ok(success(json!({}), "Nonce reset successfully"))
}
