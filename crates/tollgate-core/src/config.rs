//! Application configuration.
//!
//! Built once at startup from (lowest to highest precedence) `tollgate.yaml`
//! in the working directory, an explicit config file, and `TOLLGATE__*`
//! environment variables. The result is validated and then shared read-only.

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::{Error, Result};

/// Root configuration object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub services: ServicesConfig,
    pub stripe: StripeConfig,
    #[serde(default)]
    pub hubspot: HubspotConfig,
    #[serde(default)]
    pub features: Features,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:15443".to_string()
}

/// Base URLs of the downstream REST services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Customer, card and subscription routes (`/customer/...`).
    pub billing_api: String,
    /// License and sponsorship routes. Falls back to `billing_api`.
    #[serde(default)]
    pub license_api: Option<String>,
    /// User/org service (`/org/...`).
    pub user_api: String,
    /// Per-request timeout. Unset means the HTTP client default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ServicesConfig {
    pub fn license_api(&self) -> &str {
        self.license_api.as_deref().unwrap_or(&self.billing_api)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    /// Publishable key handed to the billing page's card form.
    pub public_key: String,
}

/// HubSpot form submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubspotConfig {
    #[serde(default = "default_forms_url")]
    pub forms_url: String,
    #[serde(default)]
    pub portal_id: Option<String>,
    /// Form that receives private-module signups.
    #[serde(default)]
    pub private_npm_signup_form: Option<String>,
}

impl Default for HubspotConfig {
    fn default() -> Self {
        Self {
            forms_url: default_forms_url(),
            portal_id: None,
            private_npm_signup_form: None,
        }
    }
}

impl HubspotConfig {
    pub fn is_enabled(&self) -> bool {
        self.portal_id.is_some() && self.private_npm_signup_form.is_some()
    }
}

fn default_forms_url() -> String {
    "https://forms.hubspot.com".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub org_billing: bool,
}

impl AppConfig {
    /// Load configuration from the default file, an optional override file,
    /// and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(File::with_name("tollgate.yaml").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix("TOLLGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(source: &str) -> Result<Self> {
        let config: AppConfig = config::Config::builder()
            .add_source(File::from_str(source, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check required fields and URL syntax.
    pub fn validate(&self) -> Result<()> {
        require_url("services.billing_api", &self.services.billing_api)?;
        if let Some(license_api) = &self.services.license_api {
            require_url("services.license_api", license_api)?;
        }
        require_url("services.user_api", &self.services.user_api)?;
        if self.stripe.public_key.trim().is_empty() {
            return Err(Error::Config("stripe.public_key is required".into()));
        }
        if self.hubspot.is_enabled() {
            require_url("hubspot.forms_url", &self.hubspot.forms_url)?;
        }
        Ok(())
    }

    /// One-line-per-field summary safe to print.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("server.bind", self.server.bind.clone()),
            ("services.billing_api", self.services.billing_api.clone()),
            ("services.license_api", self.services.license_api().to_string()),
            ("services.user_api", self.services.user_api.clone()),
            (
                "services.request_timeout_secs",
                self.services
                    .request_timeout_secs
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "client default".into()),
            ),
            ("stripe.public_key", redact(&self.stripe.public_key)),
            (
                "hubspot",
                if self.hubspot.is_enabled() {
                    "enabled".into()
                } else {
                    "disabled".into()
                },
            ),
            ("features.org_billing", self.features.org_billing.to_string()),
        ]
    }
}

fn require_url(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{field} is required")));
    }
    Url::parse(value).map_err(|e| Error::Config(format!("{field} is not a valid URL: {e}")))?;
    Ok(())
}

fn redact(value: &str) -> String {
    let visible: String = value.chars().take(8).collect();
    format!("{visible}…")
}
