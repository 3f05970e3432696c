//! In-memory services for handler tests.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, header},
    response::Response,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tollgate_core::customer::{BillingInfo, Customer, License, PlanInfo, Subscription};
use tollgate_core::org::{Membership, NewMember, Org, OrgInfo};
use tollgate_core::ports::{
    AnalyticsSink, CustomerService, FormSubmission, NoopSink, OrgService, ServiceFactory,
};
use tollgate_core::sponsorship::Sponsorship;
use tollgate_core::{AppConfig, Error, LicenseId, Result, VerificationKey};
use tower::ServiceExt;

use crate::session::{EMAIL_HEADER, USER_HEADER};
use crate::{AppState, build_app};

const CONFIG: &str = r#"
services:
  billing_api: https://billing.example.com
  user_api: https://users.example.com
stripe:
  public_key: pk_test_12345
"#;

/// Call log shared by the stub clients of one harness.
#[derive(Default)]
struct Ledger {
    calls: Mutex<Vec<&'static str>>,
    failures: HashMap<&'static str, fn() -> Error>,
    billing: Mutex<Option<BillingInfo>>,
    plan: Mutex<Option<PlanInfo>>,
}

impl Ledger {
    fn record(&self, op: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(op);
        match self.failures.get(op) {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }
}

fn fixture<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

fn subscription() -> Subscription {
    fixture(json!({
        "id": "sub_12346",
        "status": "active",
        "quantity": 2,
        "license_id": 1,
        "npm_org": "bigco",
        "npm_user": "bob"
    }))
}

fn sponsorship(verified: Option<bool>) -> Sponsorship {
    fixture(json!({
        "id": 15,
        "license_id": 1,
        "npm_user": "betty",
        "verification_key": "f56dffef-b136-429a-97dc-57a6ef035829",
        "verified": verified
    }))
}

fn org_info() -> OrgInfo {
    fixture(json!({"name": "bigco", "description": "bigco organization"}))
}

fn membership() -> Membership {
    fixture(json!({"org_id": 1, "user_id": 15, "role": "developer"}))
}

struct StubCustomer {
    name: String,
    ledger: Arc<Ledger>,
}

#[async_trait]
impl CustomerService for StubCustomer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self) -> Result<Customer> {
        self.ledger.record("get")?;
        Ok(fixture(json!({"id": "cus_123abc", "email": "bob@domain.com"})))
    }

    async fn update_billing(&self, info: &BillingInfo) -> Result<Customer> {
        *self.ledger.billing.lock().unwrap() = Some(info.clone());
        self.ledger.record("update_billing")?;
        Ok(fixture(json!({"id": "cus_123abc"})))
    }

    async fn delete(&self) -> Result<String> {
        self.ledger.record("delete")?;
        Ok("customer deleted".into())
    }

    async fn get_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.ledger.record("get_subscriptions")?;
        Ok(vec![subscription()])
    }

    async fn create_subscription(&self, plan: &PlanInfo) -> Result<Option<Subscription>> {
        *self.ledger.plan.lock().unwrap() = Some(plan.clone());
        self.ledger.record("create_subscription")?;
        Ok(Some(subscription()))
    }

    async fn get_license(&self) -> Result<Vec<License>> {
        self.ledger.record("get_license")?;
        Ok(Vec::new())
    }

    async fn get_license_id_for_org(&self, _org: &str) -> Result<LicenseId> {
        self.ledger.record("get_license_id_for_org")?;
        Ok(LicenseId::new(1))
    }

    async fn get_all_sponsorships(&self, _license_id: LicenseId) -> Result<Vec<Sponsorship>> {
        self.ledger.record("get_all_sponsorships")?;
        Ok(vec![sponsorship(Some(true))])
    }

    async fn extend_sponsorship(&self, _license_id: LicenseId, _user: &str) -> Result<Sponsorship> {
        self.ledger.record("extend_sponsorship")?;
        Ok(sponsorship(None))
    }

    async fn accept_sponsorship(&self, _key: &VerificationKey) -> Result<Sponsorship> {
        self.ledger.record("accept_sponsorship")?;
        Ok(sponsorship(Some(true)))
    }

    async fn remove_sponsorship(&self, _user: &str, _license_id: LicenseId) -> Result<Sponsorship> {
        self.ledger.record("remove_sponsorship")?;
        Ok(sponsorship(Some(true)))
    }
}

struct StubOrgs {
    actor: String,
    ledger: Arc<Ledger>,
}

#[async_trait]
impl OrgService for StubOrgs {
    fn actor(&self) -> &str {
        &self.actor
    }

    async fn get(&self, _name: &str) -> Result<Org> {
        self.ledger.record("get_org")?;
        Ok(Org {
            info: org_info(),
            users: Vec::new(),
        })
    }

    async fn create(&self, _name: &str) -> Result<OrgInfo> {
        self.ledger.record("create_org")?;
        Ok(org_info())
    }

    async fn delete(&self, _name: &str) -> Result<OrgInfo> {
        self.ledger.record("delete_org")?;
        Ok(org_info())
    }

    async fn add_user(&self, _org: &str, _member: &NewMember) -> Result<Membership> {
        self.ledger.record("add_user")?;
        Ok(membership())
    }

    async fn remove_user(&self, _org: &str, _user: &str) -> Result<Membership> {
        self.ledger.record("remove_user")?;
        Ok(membership())
    }
}

struct StubServices(Arc<Ledger>);

impl ServiceFactory for StubServices {
    fn customer(&self, user: &str) -> Result<Arc<dyn CustomerService>> {
        Ok(Arc::new(StubCustomer {
            name: user.to_string(),
            ledger: self.0.clone(),
        }))
    }

    fn org(&self, actor: &str) -> Result<Arc<dyn OrgService>> {
        Ok(Arc::new(StubOrgs {
            actor: actor.to_string(),
            ledger: self.0.clone(),
        }))
    }
}

struct RecordingSink(mpsc::UnboundedSender<FormSubmission>);

#[async_trait]
impl AnalyticsSink for RecordingSink {
    async fn submit(&self, submission: &FormSubmission) -> Result<()> {
        self.0
            .send(submission.clone())
            .map_err(|e| Error::Internal(e.to_string()))
    }
}

struct FailingSink;

#[async_trait]
impl AnalyticsSink for FailingSink {
    async fn submit(&self, _submission: &FormSubmission) -> Result<()> {
        Err(Error::Downstream {
            status: 500,
            message: "HubSpot is down".into(),
        })
    }
}

/// Router over stub services, with a per-operation failure plan.
pub struct Harness {
    ledger: Arc<Ledger>,
    config: AppConfig,
    analytics: Arc<dyn AnalyticsSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_org_billing(true)
    }

    pub fn with_org_billing(enabled: bool) -> Self {
        let mut config = AppConfig::from_yaml(CONFIG).unwrap();
        config.features.org_billing = enabled;
        Self {
            ledger: Arc::new(Ledger::default()),
            config,
            analytics: Arc::new(NoopSink),
        }
    }

    /// Make `op` fail with `error`. Must be called before any request.
    pub fn fail(mut self, op: &'static str, error: fn() -> Error) -> Self {
        Arc::get_mut(&mut self.ledger)
            .unwrap()
            .failures
            .insert(op, error);
        self
    }

    pub fn recording_analytics(mut self) -> (Self, mpsc::UnboundedReceiver<FormSubmission>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.analytics = Arc::new(RecordingSink(tx));
        (self, rx)
    }

    pub fn failing_analytics(mut self) -> Self {
        self.analytics = Arc::new(FailingSink);
        self
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        let state = AppState::new(
            Arc::new(StubServices(self.ledger.clone())),
            self.analytics.clone(),
            Arc::new(self.config.clone()),
        );
        build_app(Arc::new(state)).oneshot(request).await.unwrap()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.ledger.calls.lock().unwrap().clone()
    }

    pub fn last_billing(&self) -> Option<BillingInfo> {
        self.ledger.billing.lock().unwrap().clone()
    }

    pub fn last_plan(&self) -> Option<PlanInfo> {
        self.ledger.plan.lock().unwrap().clone()
    }
}

/// A request from the logged-in user `bob`.
pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_HEADER, "bob")
        .header(EMAIL_HEADER, "bob@domain.com")
        .body(Body::empty())
        .unwrap()
}

pub fn form_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    let (mut parts, _) = request(method, uri).into_parts();
    parts.headers.insert(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded".parse().unwrap(),
    );
    Request::from_parts(parts, Body::from(body.to_string()))
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
