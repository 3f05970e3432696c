//! Billing page handlers.

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tollgate_core::Error;
use tollgate_core::customer::{BillingInfo, PlanInfo};
use tollgate_core::plan::PlanType;
use tollgate_core::ports::FormSubmission;
use tracing::{debug, error, info, warn};

use crate::session::{LoggedInUser, client_ip};
use crate::state::AppState;
use crate::view::{BILLING, View};
use crate::workflow::Workflow;

pub const BILLING_PATH: &str = "/settings/billing";
const BILLING_UPDATE_PAGE: &str = "customer-billing-update";

#[derive(Debug, Default, Deserialize)]
pub struct BillingQuery {
    pub updated: Option<String>,
    pub canceled: Option<String>,
    pub package: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBillingForm {
    #[serde(rename = "stripeToken")]
    pub stripe_token: Option<String>,
    pub coupon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    #[serde(rename = "planType")]
    pub plan_type: String,
    #[serde(rename = "orgName")]
    pub org_name: Option<String>,
}

/// Billing view with the fields every render carries.
fn billing_view(state: &AppState) -> View {
    View::new(BILLING)
        .with("title", "Billing")
        .with("stripePublicKey", &state.config.stripe.public_key)
        .with("features", json!({ "orgs": state.config.features.org_billing }))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    user: LoggedInUser,
    Query(query): Query<BillingQuery>,
) -> View {
    let customer = match state.services.customer(&user.name) {
        Ok(customer) => customer,
        Err(e) => return View::error(&e),
    };

    let mut view = billing_view(&state)
        .with("updated", query.updated.is_some())
        .with("canceled", query.canceled.is_some());

    if let Some(package) = query.package.filter(|p| !p.is_empty()) {
        view = view.with("package", package);
    }

    match customer.get().await {
        Ok(found) => view = view.with("customer", found),
        Err(e) if e.is_not_found() => debug!(user = %user.name, "No billing customer yet"),
        Err(e) => warn!(user = %user.name, error = %e, "Unable to load billing customer"),
    }

    let subscriptions = customer.get_subscriptions().await.unwrap_or_else(|e| {
        error!(user = %user.name, error = %e, "Unable to get subscriptions");
        Vec::new()
    });

    view.with("subscriptions", subscriptions)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    user: LoggedInUser,
    headers: HeaderMap,
    Form(form): Form<UpdateBillingForm>,
) -> Result<Redirect, View> {
    let customer = state.services.customer(&user.name).map_err(|e| View::error(&e))?;

    let info = BillingInfo {
        name: Some(user.name.clone()),
        email: user.email.clone(),
        card: form.stripe_token,
        coupon: form
            .coupon
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.to_lowercase()),
    };

    if let Err(e) = customer.update_billing(&info).await {
        warn!(user = %user.name, error = %e, "Billing update failed");
        return Err(billing_view(&state).with_error(&e));
    }
    info!(user = %user.name, "Updated billing info");

    if let Some(email) = info.email {
        let submission = FormSubmission {
            email,
            page_name: BILLING_UPDATE_PAGE.to_string(),
            ip_address: client_ip(&headers),
        };
        let sink = state.analytics.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.submit(&submission).await {
                error!(
                    email = %submission.email,
                    error = %e,
                    "Unable to send billing update to HubSpot"
                );
            }
        });
    }

    Ok(Redirect::to(&format!("{BILLING_PATH}?updated=1")))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: LoggedInUser,
) -> Result<Redirect, View> {
    let customer = state.services.customer(&user.name).map_err(|e| View::error(&e))?;

    match customer.delete().await {
        Ok(_) => {
            info!(user = %user.name, "Deleted billing info");
            Ok(Redirect::to(&format!("{BILLING_PATH}?canceled=1")))
        }
        Err(e) => {
            error!(user = %user.name, error = %e, "Unable to delete billing info");
            Err(View::error(&e).with_status(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// Subscribe to a plan. The org plan checks that the org is free, creates the
/// subscription, then creates the org. These are separate calls: an org
/// created by someone else between the check and the create is not detected
/// here, and a failed org create leaves the subscription in place.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    user: LoggedInUser,
    Form(form): Form<SubscribeForm>,
) -> Result<Redirect, View> {
    let rejected = |e: Error| billing_view(&state).with_error(&e);

    let plan: PlanType = form.plan_type.parse().map_err(rejected)?;
    let customer = state.services.customer(&user.name).map_err(|e| View::error(&e))?;

    if !plan.is_org() {
        let info = PlanInfo {
            plan: plan.code().to_string(),
            npm_org: None,
        };
        customer.create_subscription(&info).await.map_err(|e| {
            error!(
                user = %user.name,
                plan = %info.plan,
                error = %e,
                "Unable to create subscription"
            );
            rejected(e)
        })?;
        return Ok(Redirect::to(BILLING_PATH));
    }

    if !state.config.features.org_billing {
        return Err(rejected(Error::OrgBillingDisabled));
    }
    let org_name = form
        .org_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| rejected(Error::MissingOrgName))?;
    let orgs = state.services.org(&user.name).map_err(|e| View::error(&e))?;

    match orgs.get(&org_name).await {
        Ok(_) => return Err(rejected(Error::OrgExists)),
        Err(e) if e.is_not_found() => {}
        Err(e) => {
            error!(user = %user.name, org = %org_name, error = %e, "Unable to check org");
            return Err(rejected(e));
        }
    }

    let info = PlanInfo {
        plan: plan.code().to_string(),
        npm_org: Some(org_name.clone()),
    };
    let mut flow = Workflow::new("subscribe-org");
    flow.step("create subscription", customer.create_subscription(&info))
        .await
        .map_err(|failure| rejected(failure.error))?;
    flow.step("create org", orgs.create(&org_name))
        .await
        .map_err(|failure| failure.into_view())?;

    Ok(Redirect::to(BILLING_PATH))
}
