// handlers/system.rs - Service descriptor and health recorder

use axum::extract::State;
use serde_json::json;
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::SharedState;

/// GET / - name, version and route list
pub async fn root_get() -> ApiResult<serde_json::Value> {
    Ok(ApiResponse::success(json!({
        "name": "Alert Feedback API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "alerts": "GET /api/alerts/?limit&skip",
            "alert": "GET /api/alerts/:alert_id/",
            "feedback": "POST /api/feedback/",
            "register": "POST /api/register/",
            "token": "POST /api/token/",
            "token_refresh": "POST /api/token/refresh/",
            "health": "GET /health"
        }
    })))
}

/// GET /health - 200 when the document store answers, 503 otherwise
pub async fn health_get(State(state): State<SharedState>) -> ApiResult<serde_json::Value> {
    match state.store.ping().await {
        Ok(()) => Ok(ApiResponse::success(json!({ "status": "healthy", "store": "connected" }))),
        Err(e) => {
            warn!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Document store unavailable"))
        }
    }
}
