//! Logged-in user extraction.
//!
//! Authentication happens upstream; the authenticating proxy forwards the
//! user name and email as headers.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

pub const USER_HEADER: &str = "x-tollgate-user";
pub const EMAIL_HEADER: &str = "x-tollgate-email";
const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedInUser {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug)]
pub struct NotLoggedIn;

impl IntoResponse for NotLoggedIn {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "login required" })),
        )
            .into_response()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for LoggedInUser {
    type Rejection = NotLoggedIn;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = header_str(&parts.headers, USER_HEADER).ok_or(NotLoggedIn)?;
        Ok(Self {
            name: name.to_string(),
            email: header_str(&parts.headers, EMAIL_HEADER).map(str::to_string),
        })
    }
}

/// First `x-forwarded-for` hop, the address of the end user.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, FORWARDED_FOR)?
        .split(',')
        .map(str::trim)
        .find(|hop| !hop.is_empty())
        .map(str::to_string)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
