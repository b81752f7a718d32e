// handlers/alerts/list.rs - GET /api/alerts/ handler

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AssembledAlert;
use crate::state::SharedState;

/// Raw pagination parameters; parsed here so bad input becomes a 400.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub skip: Option<String>,
}

/// GET /api/alerts/?limit=3&skip=0 - page through alerts with their transactions
///
/// Expected Output (Success):
/// ```json
/// {
///   "status": "success",
///   "data": [
///     {
///       "_id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
///       "alert_message": "Unusual growth on ledger",
///       "timestamp": "2024-03-02T08:30:00Z",
///       "sid": "S-17",
///       "code": "GR-02",
///       "transactions": [
///         { "id": "...", "system_name": "ledger", "growth": 12.5, "file_path": "/data/ledger.csv", "timestamp": "..." }
///       ]
///     }
///   ]
/// }
/// ```
pub async fn alerts_list(
    State(state): State<SharedState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<AssembledAlert>> {
    let Query(query) = query?;
    let (limit, skip) = page_bounds(&query, &state.config.api)?;

    let alerts = state.alerts.list_alerts(limit, skip).await?;
    Ok(ApiResponse::success(alerts))
}

/// Apply defaults, reject non-positive limits and negative offsets, clamp to the max.
fn page_bounds(query: &PageQuery, api: &ApiConfig) -> Result<(u64, u64), ApiError> {
    let limit = parse_param("limit", query.limit.as_deref())?.unwrap_or(api.default_page_limit as i64);
    let skip = parse_param("skip", query.skip.as_deref())?.unwrap_or(0);

    if limit < 1 {
        return Err(ApiError::field_error("limit", "limit must be a positive integer"));
    }
    if skip < 0 {
        return Err(ApiError::field_error("skip", "skip must be a non-negative integer"));
    }

    let limit = (limit as u64).min(api.max_page_limit);
    Ok((limit, skip as u64))
}

fn parse_param(name: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::field_error(name, format!("{} must be an integer", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn query(limit: Option<&str>, skip: Option<&str>) -> PageQuery {
        PageQuery {
            limit: limit.map(str::to_string),
            skip: skip.map(str::to_string),
        }
    }

    #[test]
    fn defaults_apply() {
        let api = AppConfig::in_memory().api;
        assert_eq!(page_bounds(&PageQuery::default(), &api).unwrap(), (3, 0));
        assert_eq!(page_bounds(&query(Some(""), Some(" ")), &api).unwrap(), (3, 0));
    }

    #[test]
    fn parses_and_clamps() {
        let mut api = AppConfig::in_memory().api;
        api.max_page_limit = 50;
        assert_eq!(page_bounds(&query(Some("10"), Some("20")), &api).unwrap(), (10, 20));
        assert_eq!(page_bounds(&query(Some("500"), None), &api).unwrap(), (50, 0));
    }

    #[test]
    fn rejects_bad_values() {
        let api = AppConfig::in_memory().api;
        for (limit, skip) in [(Some("abc"), None), (Some("0"), None), (Some("-1"), None), (None, Some("-5")), (None, Some("1.5"))] {
            let err = page_bounds(&query(limit, skip), &api).unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
    }
}
