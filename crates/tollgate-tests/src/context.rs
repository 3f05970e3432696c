//! Test context wiring the server to mocked downstream services.

use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tollgate_core::AppConfig;
use wiremock::MockServer;

use crate::helpers::{ApiTestClient, start_test_server};

pub const PORTAL_ID: &str = "12345";
pub const SIGNUP_FORM: &str = "private-npm-signup";

/// A running server plus the mock services it talks to.
///
/// Mock expectations are verified when the context is dropped.
pub struct TestContext {
    pub billing: MockServer,
    pub license: MockServer,
    pub users: MockServer,
    pub hubspot: MockServer,
    pub addr: SocketAddr,
    pub client: ApiTestClient,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start with org billing enabled.
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_org_billing(true).await
    }

    pub async fn with_org_billing(enabled: bool) -> anyhow::Result<Self> {
        crate::init_test_logging();

        let (billing, license, users, hubspot) = tokio::join!(
            MockServer::start(),
            MockServer::start(),
            MockServer::start(),
            MockServer::start(),
        );

        let config = AppConfig::from_yaml(&format!(
            r#"
services:
  billing_api: {billing}
  license_api: {license}
  user_api: {users}
stripe:
  public_key: pk_test_12345
hubspot:
  forms_url: {hubspot}
  portal_id: "{PORTAL_ID}"
  private_npm_signup_form: {SIGNUP_FORM}
features:
  org_billing: {enabled}
"#,
            billing = billing.uri(),
            license = license.uri(),
            users = users.uri(),
            hubspot = hubspot.uri(),
        ))?;

        let (addr, server) = start_test_server(config).await?;

        Ok(Self {
            billing,
            license,
            users,
            hubspot,
            addr,
            client: ApiTestClient::new(addr, "bob"),
            server,
        })
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}
