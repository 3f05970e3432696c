//! HubSpot forms sink for billing signups.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tollgate_core::config::HubspotConfig;
use tollgate_core::ports::{AnalyticsSink, FormSubmission};
use tollgate_core::{Error, Result};
use tracing::debug;

use crate::http::Endpoint;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HsContext<'a> {
    page_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip_address: Option<&'a str>,
}

/// Posts submissions to `/uploads/form/v2/{portal}/{form}`.
#[derive(Debug)]
pub struct HubspotSink {
    forms: Endpoint,
    portal_id: String,
    form_id: String,
}

impl HubspotSink {
    /// Returns `None` when the portal or form is not configured.
    pub fn from_config(config: &HubspotConfig, http: Client) -> Result<Option<Self>> {
        let (Some(portal_id), Some(form_id)) =
            (&config.portal_id, &config.private_npm_signup_form)
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            forms: Endpoint::new(http, &config.forms_url)?,
            portal_id: portal_id.clone(),
            form_id: form_id.clone(),
        }))
    }
}

#[async_trait]
impl AnalyticsSink for HubspotSink {
    async fn submit(&self, submission: &FormSubmission) -> Result<()> {
        let context = serde_json::to_string(&HsContext {
            page_name: &submission.page_name,
            ip_address: submission.ip_address.as_deref(),
        })?;

        debug!(form = %self.form_id, page = %submission.page_name, "Submitting HubSpot form");

        let response = self
            .forms
            .request(
                reqwest::Method::POST,
                &["uploads", "form", "v2", self.portal_id.as_str(), self.form_id.as_str()],
            )
            .form(&[
                ("email", submission.email.as_str()),
                ("hs_context", context.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Downstream {
                status: status.as_u16(),
                message: format!("HubSpot returned {}: {}", status, body),
            });
        }

        Ok(())
    }
}
