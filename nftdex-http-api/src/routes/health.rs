use axum::{Json, Router, routing::get};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "NFT DEX API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
    }))
}
