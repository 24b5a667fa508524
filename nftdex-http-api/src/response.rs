//! Response envelope and error mapping.
//!
//! Every endpoint answers `{success, message, data}` on success and
//! `{success: false, error: {message, code, type}}` on failure, with the HTTP
//! status mirrored in `code`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

use nftdex_runtime::error::DexError;

pub type ApiResult = Result<Json<Value>, ApiError>;

pub fn success(data: impl Serialize, message: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}

/// Paginated list envelope: `data.items` plus page arithmetic.
pub fn paginated(
    items: impl Serialize,
    total: usize,
    page: usize,
    limit: usize,
    message: &str,
) -> Json<Value> {
    let total_pages = total.div_ceil(limit.max(1));
    Json(json!({
        "success": true,
        "message": message,
        "data": {
            "items": items,
            "pagination": {
                "total": total,
                "page": page,
                "limit": limit,
                "totalPages": total_pages,
            },
        },
    }))
}

pub struct ApiError(pub DexError);

impl From<DexError> for ApiError {
    fn from(e: DexError) -> Self {
        ApiError(e)
    }
}

/// Status and error-type classification for each failure.
fn classify(error: &DexError) -> (StatusCode, &'static str) {
    match error {
        DexError::Validation(_) => (StatusCode::BAD_REQUEST, "ValidationError"),
        DexError::NotDeployed(_) => (StatusCode::BAD_REQUEST, "ContractError"),
        DexError::Artifact(_) => (StatusCode::NOT_FOUND, "ContractError"),
        DexError::Call(_) => (StatusCode::BAD_GATEWAY, "ContractError"),
        DexError::Rejected(_) => (StatusCode::BAD_GATEWAY, "BlockchainError"),
        DexError::Reverted { .. } => (StatusCode::BAD_GATEWAY, "BlockchainError"),
        DexError::Chain(_) => (StatusCode::BAD_GATEWAY, "BlockchainError"),
        DexError::NeverConfirmed { .. } => (StatusCode::GATEWAY_TIMEOUT, "BlockchainError"),
        DexError::Connectivity(_) => (StatusCode::SERVICE_UNAVAILABLE, "BlockchainError"),
        DexError::Config(_) | DexError::Serialization(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "InternalError")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = classify(&self.0);
        tracing::error!(error = %self.0, status = %status, "Request failed");

        let body = Json(json!({
            "success": false,
            "error": {
                "message": self.0.to_string(),
                "code": status.as_u16(),
                "type": error_type,
            },
        }));
        (status, body).into_response()
    }
}
