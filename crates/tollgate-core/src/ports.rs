//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the request handlers and the
//! downstream REST services. Every method is exactly one network round trip
//! unless its documentation says otherwise.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Result;
use crate::customer::{BillingInfo, Customer, License, PlanInfo, Subscription};
use crate::ids::{LicenseId, VerificationKey};
use crate::org::{Membership, NewMember, Org, OrgInfo};
use crate::sponsorship::Sponsorship;

/// Billing and license operations bound to one registry user.
#[async_trait]
pub trait CustomerService: Send + Sync {
    /// User name this client acts for.
    fn name(&self) -> &str;

    /// Fetch the billing customer.
    async fn get(&self) -> Result<Customer>;

    /// Create or update billing details.
    ///
    /// Fails with `MissingField` before any network call when a required
    /// field is absent. Two round trips: a lookup deciding between create
    /// and update, then the write.
    async fn update_billing(&self, info: &BillingInfo) -> Result<Customer>;

    /// Delete billing details and cancel the customer's subscriptions.
    async fn delete(&self) -> Result<String>;

    /// List the customer's subscriptions.
    async fn get_subscriptions(&self) -> Result<Vec<Subscription>>;

    /// Subscribe the customer to a plan. `None` when the billing service
    /// acknowledged with a message instead of the subscription record.
    async fn create_subscription(&self, plan: &PlanInfo) -> Result<Option<Subscription>>;

    /// Licenses held by the customer (possibly empty).
    async fn get_license(&self) -> Result<Vec<License>>;

    /// License id of the subscription tied to `org`.
    async fn get_license_id_for_org(&self, org: &str) -> Result<LicenseId>;

    /// All sponsorships issued against a license.
    async fn get_all_sponsorships(&self, license_id: LicenseId) -> Result<Vec<Sponsorship>>;

    /// Offer a seat of `license_id` to `user`. The returned sponsorship
    /// carries the verification key.
    async fn extend_sponsorship(&self, license_id: LicenseId, user: &str) -> Result<Sponsorship>;

    /// Accept a previously extended sponsorship.
    async fn accept_sponsorship(&self, key: &VerificationKey) -> Result<Sponsorship>;

    /// Withdraw `user`'s sponsorship on `license_id`.
    async fn remove_sponsorship(&self, user: &str, license_id: LicenseId) -> Result<Sponsorship>;

    async fn decline_sponsorship(&self, user: &str, license_id: LicenseId) -> Result<Sponsorship> {
        self.remove_sponsorship(user, license_id).await
    }

    async fn revoke_sponsorship(&self, user: &str, license_id: LicenseId) -> Result<Sponsorship> {
        self.remove_sponsorship(user, license_id).await
    }
}

/// Org operations performed on behalf of an actor.
#[async_trait]
pub trait OrgService: Send + Sync {
    fn actor(&self) -> &str;

    /// Fetch org details and members (two round trips, in that order).
    async fn get(&self, name: &str) -> Result<Org>;

    async fn create(&self, name: &str) -> Result<OrgInfo>;

    async fn delete(&self, name: &str) -> Result<OrgInfo>;

    async fn add_user(&self, org: &str, member: &NewMember) -> Result<Membership>;

    async fn remove_user(&self, org: &str, user: &str) -> Result<Membership>;
}

/// Builds per-user service clients for a request.
pub trait ServiceFactory: Send + Sync {
    fn customer(&self, user: &str) -> Result<Arc<dyn CustomerService>>;

    fn org(&self, actor: &str) -> Result<Arc<dyn OrgService>>;
}

/// A marketing/CRM form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub email: String,
    pub page_name: String,
    pub ip_address: Option<String>,
}

/// Destination for analytics submissions. Callers treat failures as
/// non-fatal.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn submit(&self, submission: &FormSubmission) -> Result<()>;
}

/// Sink used when no analytics destination is configured.
pub struct NoopSink;

#[async_trait]
impl AnalyticsSink for NoopSink {
    async fn submit(&self, _submission: &FormSubmission) -> Result<()> {
        Ok(())
    }
}
