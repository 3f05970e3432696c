//! Test helper functions and utilities.

use reqwest::{Client, Response, StatusCode, redirect};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tollgate_api::session::{EMAIL_HEADER, USER_HEADER};
use tollgate_api::{AppState, build_app};
use tollgate_clients::{HttpServices, HubspotSink};
use tollgate_core::AppConfig;
use tollgate_core::ports::{AnalyticsSink, NoopSink};

/// Start the server on an ephemeral port and return its address.
pub async fn start_test_server(config: AppConfig) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let services = HttpServices::new(config.services.clone())?;
    let analytics: Arc<dyn AnalyticsSink> =
        match HubspotSink::from_config(&config.hubspot, services.http().clone())? {
            Some(sink) => Arc::new(sink),
            None => Arc::new(NoopSink),
        };

    let state = Arc::new(AppState::new(Arc::new(services), analytics, Arc::new(config)));
    let app = build_app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok((addr, handle))
}

/// Client acting as one logged-in user. Redirects are not followed so
/// tests can assert on them.
pub struct ApiTestClient {
    client: Client,
    base_url: String,
    user: String,
}

impl ApiTestClient {
    pub fn new(addr: SocketAddr, user: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .redirect(redirect::Policy::none())
                .build()
                .expect("Failed to create test client"),
            base_url: format!("http://{}", addr),
            user: user.to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(USER_HEADER, &self.user)
            .header(EMAIL_HEADER, format!("{}@domain.com", self.user))
    }

    pub async fn get(&self, path: &str) -> reqwest::Result<Response> {
        self.request(reqwest::Method::GET, path).send().await
    }

    pub async fn delete(&self, path: &str) -> reqwest::Result<Response> {
        self.request(reqwest::Method::DELETE, path).send().await
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Result<Response> {
        self.request(reqwest::Method::POST, path)
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .form(form)
            .send()
            .await
    }

    /// Check health endpoint.
    pub async fn health(&self) -> anyhow::Result<bool> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.status().is_success())
    }
}

/// A rendered view: status, template and context.
#[derive(Debug)]
pub struct RenderedView {
    pub status: StatusCode,
    pub template: String,
    pub context: Value,
}

impl RenderedView {
    pub async fn from_response(response: Response) -> anyhow::Result<Self> {
        let status = response.status();
        let body: Value = response.json().await?;
        Ok(Self {
            status,
            template: body["template"].as_str().unwrap_or_default().to_string(),
            context: body["context"].clone(),
        })
    }

    pub fn has(&self, key: &str) -> bool {
        self.context.get(key).is_some()
    }
}

/// The `Location` of a redirect response.
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Wait for a condition with timeout.
pub async fn wait_for<F, Fut>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}
