//! View model handed to the renderer.
//!
//! Handlers never produce HTML. A [`View`] names a template, a status and a
//! JSON context; the response body is `{"template": ..., "context": {...}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tollgate_core::Error;
use tracing::error;

pub const BILLING: &str = "user/billing";
pub const ORG_INFO: &str = "org/info";
pub const INTERNAL_ERROR: &str = "errors/internal";

#[derive(Debug, Clone)]
pub struct View {
    template: &'static str,
    status: StatusCode,
    context: Map<String, Value>,
}

#[derive(Serialize)]
struct ViewBody<'a> {
    template: &'a str,
    context: &'a Map<String, Value>,
}

impl View {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            status: StatusCode::OK,
            context: Map::new(),
        }
    }

    /// The internal-error view, carrying the status the error maps to.
    pub fn error(err: &Error) -> Self {
        Self::new(INTERNAL_ERROR)
            .with_status(status_of(err))
            .with("message", err.to_string())
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a context entry. Values that fail to serialize are logged and
    /// left out.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.context.insert(key.to_string(), value);
            }
            Err(e) => error!(
                template = self.template,
                key,
                error = %e,
                "Dropping view context entry"
            ),
        }
        self
    }

    /// Attach `err` as the page's error list and adopt its status.
    pub fn with_error(self, err: &Error) -> Self {
        self.with_status(status_of(err))
            .with("errors", [err.to_string()])
    }

    pub fn template(&self) -> &'static str {
        self.template
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        let body = ViewBody {
            template: self.template,
            context: &self.context,
        };
        (self.status, Json(body)).into_response()
    }
}

fn status_of(err: &Error) -> StatusCode {
    StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
