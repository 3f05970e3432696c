//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub org_billing: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "tollgate",
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        org_billing: state.config.features.org_billing,
    })
}

/// Ready once the loaded configuration still validates. No downstream
/// service is contacted.
pub async fn ready(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.config.validate() {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "Configuration no longer valid");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
