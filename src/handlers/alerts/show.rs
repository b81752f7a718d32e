// handlers/alerts/show.rs - GET /api/alerts/:alert_id/ handler

use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AssembledAlert, QueryError};
use crate::state::SharedState;

/// GET /api/alerts/:alert_id/ - one alert with its transactions
///
/// Malformed and unknown identifiers both answer 404 `Alert not found`.
pub async fn alerts_show(
    State(state): State<SharedState>,
    Path(alert_id): Path<String>,
) -> ApiResult<AssembledAlert> {
    match state.alerts.get_alert(&alert_id).await {
        Ok(alert) => Ok(ApiResponse::success(alert)),
        Err(QueryError::InvalidIdentifier(_)) | Err(QueryError::NotFound(_)) => {
            Err(ApiError::not_found("Alert not found"))
        }
        Err(e) => Err(e.into()),
    }
}
