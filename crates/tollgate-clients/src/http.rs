//! Shared request plumbing for the service clients.

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tollgate_core::{Error, Result};
use tracing::debug;

use crate::status::{Operation, Subject, classify};

/// Build the HTTP client shared by every per-request service client.
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(concat!("tollgate/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))
}

/// A downstream service rooted at a base URL.
#[derive(Debug, Clone)]
pub struct Endpoint {
    client: Client,
    base: Url,
}

impl Endpoint {
    pub fn new(client: Client, base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| Error::Config(format!("invalid base URL {base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!("invalid base URL {base}")));
        }
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Append percent-encoded path segments to the base URL.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.url(segments))
    }
}

/// A fully read downstream response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The body as text, unquoting a JSON string if that is what was sent.
    pub fn text(&self) -> String {
        serde_json::from_str::<String>(&self.body).unwrap_or_else(|_| self.body.clone())
    }

    /// A 2xx whose body is a bare string instead of a resource. The billing
    /// service relays payment-provider rejections this way on billing writes
    /// and acknowledges some subscriptions with a plain message.
    pub fn bare_message(&self) -> Option<String> {
        let body = self.body.trim();
        if body.is_empty() || body.starts_with('{') || body.starts_with('[') {
            return None;
        }
        Some(self.text())
    }
}

/// Send a request and read the full body. Transport failures become
/// [`Error::Network`].
pub async fn send(operation: Operation, request: RequestBuilder) -> Result<Reply> {
    let response = request.send().await.map_err(|e| Error::Network(e.to_string()))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| Error::Network(e.to_string()))?;

    debug!(operation = operation.as_str(), status = status.as_u16(), "Downstream call completed");
    Ok(Reply { status, body })
}

/// Send a request and classify any non-2xx response.
pub async fn call(
    operation: Operation,
    subject: Subject<'_>,
    request: RequestBuilder,
) -> Result<Reply> {
    let reply = send(operation, request).await?;
    if reply.status.is_success() {
        Ok(reply)
    } else {
        Err(classify(operation, reply.status, &reply.body, &subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_segments() {
        let endpoint = Endpoint::new(Client::new(), "https://license-api.example.com/").unwrap();
        let url = endpoint.url(&["customer", "a b", "stripe"]);
        assert_eq!(url.as_str(), "https://license-api.example.com/customer/a%20b/stripe");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let endpoint = Endpoint::new(Client::new(), "https://example.com/api").unwrap();
        assert_eq!(endpoint.url(&["org", "bigco"]).as_str(), "https://example.com/api/org/bigco");
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(Endpoint::new(Client::new(), "mailto:billing@example.com").is_err());
    }

    #[test]
    fn test_bare_message_detection() {
        let reply = Reply {
            status: StatusCode::OK,
            body: "Your card's security code is incorrect.".into(),
        };
        assert_eq!(
            reply.bare_message().as_deref(),
            Some("Your card's security code is incorrect.")
        );

        let reply = Reply {
            status: StatusCode::OK,
            body: "{\"email\":\"bob@example.com\"}".into(),
        };
        assert!(reply.bare_message().is_none());
    }
}
