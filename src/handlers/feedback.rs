// handlers/feedback.rs - POST /api/feedback/ handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::FeedbackInput;
use crate::state::SharedState;

/// POST /api/feedback/ - record analyst feedback on an alert
///
/// Expected Input:
/// ```json
/// {
///   "alert_id": "uuid",          // Required
///   "alert_message": "string",   // Optional, copied at submission time
///   "rating": 4,                 // Optional, defaults to 0
///   "comment": "string",         // Optional
///   "is_correct": true           // Optional
/// }
/// ```
///
/// Responds 201 with `{ "message": "Feedback submitted successfully", "id": "..." }`.
/// A malformed `alert_id` is a 400 with a field error; store failures are 500.
pub async fn feedback_post(
    State(state): State<SharedState>,
    payload: Result<Json<FeedbackInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload?;
    let id = state.feedback.submit_feedback(input).await?;

    Ok(ApiResponse::created(json!({
        "message": "Feedback submitted successfully",
        "id": id.to_string()
    })))
}
