//! Billing-service resources: customers, subscriptions and licenses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::LicenseId;
use crate::{Error, Result};

/// Billing identity of a registry user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Remaining provider fields (card summary, discounts, ...), passed to
    /// the view untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Billing details submitted from the billing form.
///
/// Every field is optional on the wire; the customer client rejects the
/// update before any network call if `name`, `email` or `card` is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Payment provider card token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

impl BillingInfo {
    /// Names of the required fields that are missing or blank, in
    /// `name`, `email`, `card` order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.email) {
            missing.push("email");
        }
        if blank(&self.card) {
            missing.push("card");
        }
        missing
    }
}

/// A provider subscription as reported by the billing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Unix seconds.
    #[serde(default)]
    pub current_period_start: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub license_id: Option<LicenseId>,
    #[serde(default)]
    pub npm_org: Option<String>,
    #[serde(default)]
    pub npm_user: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
}

impl Subscription {
    pub fn period_start(&self) -> Option<DateTime<Utc>> {
        self.current_period_start
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn period_end(&self) -> Option<DateTime<Utc>> {
        self.current_period_end
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn is_for_org(&self, org: &str) -> bool {
        self.npm_org.as_deref() == Some(org)
    }
}

/// Find the license id of the subscription bound to `org`.
///
/// No matching entry is `NoOrg`; a matching entry without a license is
/// `NoLicenseId`.
pub fn license_id_for_org(subscriptions: &[Subscription], org: &str) -> Result<LicenseId> {
    let subscription = subscriptions
        .iter()
        .find(|s| s.is_for_org(org))
        .ok_or(Error::NoOrg)?;

    subscription.license_id.ok_or(Error::NoLicenseId)
}

/// Request body for creating a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInfo {
    pub plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm_org: Option<String>,
}

/// A purchased seat grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: LicenseId,
    #[serde(default)]
    pub customer_id: Option<u64>,
    #[serde(default)]
    pub npm_org: Option<String>,
    #[serde(default)]
    pub npm_user: Option<String>,
    #[serde(default)]
    pub plan_id: Option<u64>,
    #[serde(default)]
    pub seats: Option<u32>,
    #[serde(default)]
    pub license_key: Option<String>,
    #[serde(default)]
    pub stripe_subscription_id: Option<String>,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub begins: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends: Option<DateTime<Utc>>,
    #[serde(default)]
    pub canceled: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}
