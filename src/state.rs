use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::services::{AccountService, AlertService, FeedbackService};
use crate::store::{StoreError, StoreGateway};

/// Everything a handler needs, built once at startup
pub struct AppState {
    pub config: AppConfig,
    pub store: StoreGateway,
    pub alerts: AlertService,
    pub feedback: FeedbackService,
    pub accounts: AccountService,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig, store: StoreGateway) -> SharedState {
        let tokens = Arc::new(TokenIssuer::from_config(&config.security));

        Arc::new(Self {
            alerts: AlertService::new(store.clone()),
            feedback: FeedbackService::new(store.clone()),
            accounts: AccountService::new(store.clone(), tokens, config.security.password_hash_cost),
            store,
            config,
        })
    }

    /// Open the configured store and wire the services onto it.
    pub async fn connect(config: AppConfig) -> Result<SharedState, StoreError> {
        let store = StoreGateway::connect(&config.store).await?;
        Ok(Self::new(config, store))
    }
}
