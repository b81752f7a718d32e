use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors_layer;
use crate::state::SharedState;

/// Build the full router over a prepared state.
pub fn app(state: SharedState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(handlers::system::root_get))
        .route("/health", get(handlers::system::health_get))
        .merge(alert_routes())
        .merge(feedback_routes())
        .merge(auth_routes())
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn alert_routes() -> Router<SharedState> {
    use handlers::alerts;

    Router::new()
        .route("/api/alerts/", get(alerts::alerts_list))
        .route("/api/alerts/:alert_id/", get(alerts::alerts_show))
}

fn feedback_routes() -> Router<SharedState> {
    Router::new().route("/api/feedback/", post(handlers::feedback::feedback_post))
}

fn auth_routes() -> Router<SharedState> {
    use handlers::auth;

    Router::new()
        // Token acquisition
        .route("/api/register/", post(auth::register_post))
        .route("/api/token/", post(auth::login_post))
        .route("/api/token/refresh/", post(auth::refresh_post))
}
