// handlers/auth/register.rs - POST /api/register/ handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{RegisterRequest, TokenPair};
use crate::state::SharedState;

/// POST /api/register/ - create new account and issue tokens
///
/// Expected Input:
/// ```json
/// {
///   "username": "string",  // Required, 3-150 chars of letters, digits and @.+-_
///   "email": "string",     // Required, stored lowercased
///   "password": "string"   // Required, at least 8 chars
/// }
/// ```
///
/// Expected Output (201):
/// ```json
/// { "status": "success", "data": { "access": "jwt", "refresh": "jwt" } }
/// ```
pub async fn register_post(
    State(state): State<SharedState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    let tokens = state.accounts.register(request).await?;
    Ok(ApiResponse::created(tokens))
}
