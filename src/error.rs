// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::services::{AuthError, QueryError};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "status": "error",
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Validation error pinned to one field.
    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        ApiError::validation_error(message, Some(field_errors))
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidIdentifier(e) => {
                tracing::debug!("{}", e);
                ApiError::field_error("alert_id", "Invalid identifier format.")
            }
            QueryError::NotFound(what) => ApiError::not_found(what),
            QueryError::StoreUnavailable(e) => {
                // Log the real error but return generic message
                tracing::error!("Store error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
            QueryError::WriteFailed(msg) => {
                tracing::error!("Write failed: {}", msg);
                ApiError::internal_server_error("An error occurred while saving your request")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(field_errors) => {
                ApiError::validation_error("Invalid registration data", Some(field_errors))
            }
            AuthError::InvalidCredentials => ApiError::validation_error("Invalid credentials", None),
            AuthError::AccountDisabled => ApiError::validation_error("Account disabled", None),
            AuthError::InvalidToken(e) => {
                tracing::debug!("Rejected token: {}", e);
                ApiError::unauthorized("Token is invalid or expired")
            }
            AuthError::Token(e) => {
                tracing::error!("Token issuance failed: {}", e);
                ApiError::internal_server_error("Could not issue token")
            }
            AuthError::PasswordHash(e) => {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal_server_error("Could not store credentials")
            }
            AuthError::Store(e) => {
                tracing::error!("Store error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InvalidIdentifier, StoreError};

    #[test]
    fn maps_query_errors() {
        let invalid: ApiError = QueryError::InvalidIdentifier(InvalidIdentifier("x".into())).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_json()["field_errors"]["alert_id"], "Invalid identifier format.");

        let missing: ApiError = QueryError::NotFound("Alert 1".into()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let down: ApiError = QueryError::StoreUnavailable(StoreError::Unavailable("refused".into())).into();
        assert_eq!(down.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!down.message().contains("refused"));

        let write: ApiError = QueryError::WriteFailed("timeout".into()).into();
        assert_eq!(write.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn maps_auth_errors() {
        let creds: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(creds.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(creds.message(), "Invalid credentials");

        let token: ApiError =
            AuthError::InvalidToken(crate::auth::JwtError::InvalidToken("bad".into())).into();
        assert_eq!(token.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn error_envelope_shape() {
        let body = ApiError::not_found("Alert not found").to_json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Alert not found");
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body.get("field_errors").is_none());
    }
}
