//! Per-request client construction.

use reqwest::Client;
use std::sync::Arc;
use tollgate_core::Result;
use tollgate_core::config::ServicesConfig;
use tollgate_core::ports::{CustomerService, OrgService, ServiceFactory};

use crate::customer::CustomerClient;
use crate::http::build_http_client;
use crate::org::OrgClient;

/// Builds HTTP-backed clients that share one connection pool.
#[derive(Clone)]
pub struct HttpServices {
    config: Arc<ServicesConfig>,
    http: Client,
}

impl HttpServices {
    pub fn new(config: ServicesConfig) -> Result<Self> {
        let http = build_http_client(config.request_timeout())?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }
}

impl ServiceFactory for HttpServices {
    fn customer(&self, user: &str) -> Result<Arc<dyn CustomerService>> {
        Ok(Arc::new(CustomerClient::new(&self.config, self.http.clone(), user)?))
    }

    fn org(&self, actor: &str) -> Result<Arc<dyn OrgService>> {
        Ok(Arc::new(OrgClient::new(&self.config, self.http.clone(), actor)?))
    }
}
