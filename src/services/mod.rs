pub mod account_service;
pub mod alert_service;
pub mod feedback_service;

use thiserror::Error;

use crate::store::{InvalidIdentifier, StoreError};

pub use account_service::{AccountService, AuthError, LoginRequest, RegisterRequest, TokenPair};
pub use alert_service::{AlertService, AssembledAlert, AssembledTransaction};
pub use feedback_service::{FeedbackInput, FeedbackService};

/// Failures of the alert/feedback query layer
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("Write failed: {0}")]
    WriteFailed(String),
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        QueryError::StoreUnavailable(err)
    }
}
