// handlers/auth/login.rs - POST /api/token/ handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginRequest, TokenPair};
use crate::state::SharedState;

/// POST /api/token/ - exchange credentials for an access/refresh pair
///
/// Expected Input:
/// ```json
/// {
///   "email": "string",    // Required
///   "password": "string"  // Required
/// }
/// ```
///
/// Bad credentials and disabled accounts answer 400, matching validation failures.
pub async fn login_post(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    let tokens = state.accounts.login(request).await?;
    Ok(ApiResponse::success(tokens))
}
