//! Billing and license service client.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use tollgate_core::config::ServicesConfig;
use tollgate_core::customer::{
    BillingInfo, Customer, License, PlanInfo, Subscription, license_id_for_org,
};
use tollgate_core::ports::CustomerService;
use tollgate_core::sponsorship::{OneOrMany, Sponsorship, SponsorshipRequest};
use tollgate_core::{Error, LicenseId, Result, VerificationKey};
use tracing::{debug, info};

use crate::http::{Endpoint, call, send};
use crate::status::{Operation, Subject, classify};

/// Customer client bound to one registry user.
pub struct CustomerClient {
    name: String,
    billing: Endpoint,
    license: Endpoint,
}

impl CustomerClient {
    pub fn new(config: &ServicesConfig, http: Client, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::MissingUserName);
        }

        Ok(Self {
            billing: Endpoint::new(http.clone(), &config.billing_api)?,
            license: Endpoint::new(http, config.license_api())?,
            name,
        })
    }

    pub fn billing_host(&self) -> &str {
        self.billing.base().as_str()
    }

    fn me(&self) -> Subject<'_> {
        Subject { resource: &self.name }
    }
}

#[async_trait]
impl CustomerService for CustomerClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self) -> Result<Customer> {
        let request = self
            .billing
            .request(Method::GET, &["customer", self.name.as_str(), "stripe"]);
        call(Operation::GetCustomer, self.me(), request).await?.json()
    }

    async fn update_billing(&self, info: &BillingInfo) -> Result<Customer> {
        if let Some(&field) = info.missing_fields().first() {
            return Err(Error::MissingField(field));
        }

        let lookup = self
            .billing
            .request(Method::GET, &["customer", self.name.as_str(), "stripe"]);
        let existing = send(Operation::UpdateBilling, lookup).await?;

        let write = match existing.status {
            StatusCode::NOT_FOUND => {
                debug!(user = %self.name, "Creating billing customer");
                self.billing.request(Method::PUT, &["customer", "stripe"])
            }
            status if status.is_success() => {
                debug!(user = %self.name, "Updating billing customer");
                self.billing
                    .request(Method::POST, &["customer", self.name.as_str(), "stripe"])
            }
            status => {
                return Err(classify(
                    Operation::UpdateBilling,
                    status,
                    &existing.body,
                    &self.me(),
                ));
            }
        };

        let reply = call(Operation::UpdateBilling, self.me(), write.json(info)).await?;
        if let Some(message) = reply.bare_message() {
            return Err(Error::CardRejected(message));
        }
        reply.json()
    }

    async fn delete(&self) -> Result<String> {
        let request = self
            .billing
            .request(Method::DELETE, &["customer", self.name.as_str(), "stripe"]);
        Ok(call(Operation::DeleteCustomer, self.me(), request).await?.text())
    }

    async fn get_subscriptions(&self) -> Result<Vec<Subscription>> {
        let request = self.billing.request(
            Method::GET,
            &["customer", self.name.as_str(), "stripe", "subscription"],
        );
        call(Operation::ListSubscriptions, self.me(), request)
            .await?
            .json()
    }

    async fn create_subscription(&self, plan: &PlanInfo) -> Result<Option<Subscription>> {
        let request = self
            .billing
            .request(
                Method::PUT,
                &["customer", self.name.as_str(), "stripe", "subscription"],
            )
            .json(plan);
        let reply = call(Operation::CreateSubscription, self.me(), request).await?;
        if let Some(message) = reply.bare_message() {
            info!(user = %self.name, plan = %plan.plan, reply = %message, "Created subscription");
            return Ok(None);
        }

        let subscription: Subscription = reply.json()?;
        info!(
            user = %self.name,
            plan = %plan.plan,
            subscription = %subscription.id,
            "Created subscription"
        );
        Ok(Some(subscription))
    }

    async fn get_license(&self) -> Result<Vec<License>> {
        let request = self
            .license
            .request(Method::GET, &["customer", self.name.as_str(), "license"]);
        call(Operation::GetLicense, self.me(), request).await?.json()
    }

    async fn get_license_id_for_org(&self, org: &str) -> Result<LicenseId> {
        let request = self.billing.request(
            Method::GET,
            &["customer", self.name.as_str(), "stripe", "subscription"],
        );
        let subscriptions: Vec<Subscription> = call(Operation::LicenseForOrg, self.me(), request)
            .await?
            .json()?;
        license_id_for_org(&subscriptions, org)
    }

    async fn get_all_sponsorships(&self, license_id: LicenseId) -> Result<Vec<Sponsorship>> {
        let id = license_id.to_string();
        let request = self.license.request(Method::GET, &["sponsorship", id.as_str()]);
        let sponsorships: OneOrMany<Sponsorship> =
            call(Operation::ListSponsorships, Subject { resource: &id }, request)
                .await?
                .json()?;
        Ok(sponsorships.into_vec())
    }

    async fn extend_sponsorship(&self, license_id: LicenseId, user: &str) -> Result<Sponsorship> {
        let id = license_id.to_string();
        let request = self
            .license
            .request(Method::PUT, &["sponsorship", id.as_str()])
            .json(&SponsorshipRequest {
                npm_user: user.to_string(),
            });
        let sponsorships: OneOrMany<Sponsorship> =
            call(Operation::ExtendSponsorship, Subject { resource: &id }, request)
                .await?
                .json()?;

        sponsorships
            .into_first()
            .ok_or_else(|| Error::Internal(format!("no sponsorship returned for license {id}")))
    }

    async fn accept_sponsorship(&self, key: &VerificationKey) -> Result<Sponsorship> {
        let request = self
            .license
            .request(Method::POST, &["sponsorship", key.as_str()]);
        call(
            Operation::AcceptSponsorship,
            Subject {
                resource: key.as_str(),
            },
            request,
        )
        .await?
        .json()
    }

    async fn remove_sponsorship(&self, user: &str, license_id: LicenseId) -> Result<Sponsorship> {
        let id = license_id.to_string();
        let request = self
            .license
            .request(Method::DELETE, &["sponsorship", id.as_str(), user]);
        call(Operation::RemoveSponsorship, Subject { resource: &id }, request)
            .await?
            .json()
    }
}
