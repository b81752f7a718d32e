// handlers/auth/refresh.rs - POST /api/token/refresh/ handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// POST /api/token/refresh/ - trade a refresh token for a fresh access token
///
/// Expected Input:
/// ```json
/// { "refresh": "jwt" }
/// ```
///
/// Expired, tampered or access-type tokens answer 401.
pub async fn refresh_post(
    State(state): State<SharedState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<RefreshResponse> {
    let Json(request) = payload?;

    let refresh = request
        .refresh
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::field_error("refresh", "This field is required."))?;

    let access = state.accounts.refresh(&refresh).await?;
    Ok(ApiResponse::success(RefreshResponse { access }))
}
