//! Trading endpoints: buys, sells, prices, and on-chain trade history.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::ApiState;
use crate::response::{ApiResult, paginated, success};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    /// Ether-denominated decimal string; also the attached value.
    pub max_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub token_id: u64,
    pub min_price: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    #[serde(rename = "type")]
    pub price_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub count: Option<u64>,
}

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/trade/buy", post(buy))
        .route("/trade/sell", post(sell))
        .route("/trade/price", get(price))
        .route("/trade/quote", get(quote))
        .route("/trade/reserves", get(reserves))
        .route("/trade/history", get(history))
        .route("/trade/recent", get(recent))
}

async fn buy(State(state): State<Arc<ApiState>>, Json(request): Json<BuyRequest>) -> ApiResult {
    tracing::info!(max_price = %request.max_price, "Buying NFT");
    let tx_hash = state.trade.buy(&request.max_price).await?;

    Ok(success(
        json!({
            "txHash": tx_hash,
            "maxPrice": request.max_price,
            "type": "buy",
        }),
        "NFT bought successfully",
    ))
}

async fn sell(State(state): State<Arc<ApiState>>, Json(request): Json<SellRequest>) -> ApiResult {
    tracing::info!(token_id = request.token_id, min_price = %request.min_price, "Selling NFT");
    let tx_hash = state
        .trade
        .sell(request.token_id, &request.min_price)
        .await?;

    Ok(success(
        json!({
            "txHash": tx_hash,
            "tokenId": request.token_id,
            "minPrice": request.min_price,
            "type": "sell",
        }),
        "NFT sold successfully",
    ))
}

async fn price(State(state): State<Arc<ApiState>>, Query(query): Query<PriceQuery>) -> ApiResult {
    let data = match query.price_type.as_deref() {
        Some("current") => json!({"current": state.trade.current_price().await?}),
        Some("sell") => json!({"sell": state.trade.sell_price().await?}),
        Some("buy") => json!({"buy": state.trade.buy_quote().await?}),
        _ => {
            let current = state.trade.current_price().await?;
            let sell = state.trade.sell_price().await?;
            let buy = state.trade.buy_quote().await?;
            json!({"current": current, "sell": sell, "buy": buy})
        }
    };

    Ok(success(data, "Price retrieved successfully"))
}

async fn quote(State(state): State<Arc<ApiState>>) -> ApiResult {
    let quote = state.trade.buy_quote().await?;
    Ok(success(quote, "Buy quote retrieved successfully"))
}

async fn reserves(State(state): State<Arc<ApiState>>) -> ApiResult {
    let reserves = state.pool.reserves().await?;
    Ok(success(reserves, "Pool reserves retrieved successfully"))
}

async fn history(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult {
    let limit = query.limit.unwrap_or(50).max(1);
    let offset = query.offset.unwrap_or(0);

    let trades = state.trade.trade_history().await?;
    let total = trades.len();
    let page: Vec<_> = trades.into_iter().skip(offset).take(limit).collect();

    Ok(paginated(
        page,
        total,
        offset / limit + 1,
        limit,
        "Trade history retrieved successfully",
    ))
}

async fn recent(State(state): State<Arc<ApiState>>, Query(query): Query<RecentQuery>) -> ApiResult {
    let count = query.count.unwrap_or(10);
    let trades = state.trade.recent_trades(count).await?;
    let returned = trades.len();

    Ok(success(
        json!({"trades": trades, "count": returned}),
        "Recent trades retrieved successfully",
    ))
}
