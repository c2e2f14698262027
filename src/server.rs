use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(crate::routes::health::health))
        // ROI engine
        .route("/roi/defaults", get(crate::routes::roi::default_inputs))
        .route("/roi/inputs", post(crate::routes::roi::resolve_inputs))
        .route("/roi/compare", post(crate::routes::roi::compare))
        // Login rate limiting
        .route("/auth/login/check", post(crate::routes::auth::check_login))
        .route("/auth/login/record", post(crate::routes::auth::record_login))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
