//! HTTP middleware for the API server.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Stamp the request and its response with a request id, keeping one the
/// caller already sent.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let id = match request.headers().get(REQUEST_ID_HEADER) {
        Some(existing) => existing.clone(),
        None => {
            let generated = HeaderValue::from_str(&Uuid::new_v4().to_string());
            match generated {
                Ok(value) => {
                    request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
                    value
                }
                Err(_) => return next.run(request).await,
            }
        }
    };

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, id);
    response
}
