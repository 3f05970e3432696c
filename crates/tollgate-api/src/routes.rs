//! Route definitions.

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{billing, health, org};
use crate::middleware::request_id;
use crate::state::AppState;

/// Create the router with every page and probe route.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(billing_routes())
        .merge(org_routes())
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state)
}

/// The router wrapped in tracing and request-id middleware.
pub fn build_app(state: Arc<AppState>) -> Router {
    create_router(state)
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
}

fn billing_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            billing::BILLING_PATH,
            get(billing::show)
                .post(billing::update)
                .delete(billing::delete),
        )
        .route("/settings/billing/subscribe", post(billing::subscribe))
}

fn org_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/org/{name}",
        get(org::show).post(org::update).delete(org::delete),
    )
}
