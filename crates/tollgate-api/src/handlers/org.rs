//! Org page and membership handlers.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tollgate_core::org::{NewMember, Org};
use tollgate_core::ports::{CustomerService, OrgService};
use tollgate_core::sponsorship::Sponsorship;
use tollgate_core::{Error, Result};
use tracing::{debug, info, warn};
use url::{Position, Url};

use crate::handlers::billing::BILLING_PATH;
use crate::session::LoggedInUser;
use crate::state::AppState;
use crate::view::{ORG_INFO, View};
use crate::workflow::{StepFailure, Workflow};

const DEFAULT_ROLE: &str = "developer";

#[derive(Debug, Deserialize)]
pub struct UpdateOrgForm {
    pub username: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "updateType")]
    pub update_type: String,
}

/// Org info view. A missing org still renders; sponsorships are included
/// only when the actor's license for the org and its sponsorships both load.
pub async fn show(
    State(state): State<Arc<AppState>>,
    user: LoggedInUser,
    Path(name): Path<String>,
) -> View {
    let (orgs, customer) = match clients(&state, &user) {
        Ok(clients) => clients,
        Err(e) => return View::error(&e),
    };

    let mut view = View::new(ORG_INFO);
    match orgs.get(&name).await {
        Ok(org) => view = view.with("org", org),
        Err(e) if e.is_not_found() => debug!(org = %name, "Org does not exist"),
        Err(e) => {
            warn!(org = %name, error = %e, "Unable to load org");
            return View::error(&e);
        }
    }

    match sponsorships(customer.as_ref(), &name).await {
        Ok(sponsorships) => view.with("sponsorships", sponsorships),
        Err(e) => {
            debug!(org = %name, error = %e, "Omitting sponsorships");
            view
        }
    }
}

async fn sponsorships(customer: &dyn CustomerService, org: &str) -> Result<Vec<Sponsorship>> {
    let license_id = customer.get_license_id_for_org(org).await?;
    customer.get_all_sponsorships(license_id).await
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    user: LoggedInUser,
    Path(name): Path<String>,
    Form(form): Form<UpdateOrgForm>,
) -> View {
    let (orgs, customer) = match clients(&state, &user) {
        Ok(clients) => clients,
        Err(e) => return View::error(&e),
    };
    let Some(username) = form
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
    else {
        return View::error(&Error::MissingField("username"));
    };

    match form.update_type.as_str() {
        "addUser" => {
            let member = NewMember {
                user: username,
                role: form
                    .role
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            };
            match add_member(orgs.as_ref(), customer.as_ref(), &name, &member).await {
                Ok(org) => {
                    info!(actor = %user.name, org = %name, user = %member.user, "Added org member");
                    View::new(ORG_INFO).with("org", org)
                }
                Err(failure) => failure.into_view(),
            }
        }
        "deleteUser" => {
            if let Err(failure) =
                remove_member(orgs.as_ref(), customer.as_ref(), &name, &username).await
            {
                return failure.into_view();
            }
            info!(actor = %user.name, org = %name, user = %username, "Removed org member");

            let view = View::new(ORG_INFO);
            match orgs.get(&name).await {
                Ok(org) => view.with("org", org),
                Err(e) => {
                    warn!(org = %name, error = %e, "Unable to reload org after removing member");
                    view
                }
            }
        }
        other => View::error(&Error::UnknownUpdateType(other.to_string())),
    }
}

/// Add the member, then sponsor them on the org's license and accept the
/// sponsorship on their behalf. A failure at any step leaves the earlier
/// steps in place.
async fn add_member(
    orgs: &dyn OrgService,
    customer: &dyn CustomerService,
    org: &str,
    member: &NewMember,
) -> std::result::Result<Org, StepFailure> {
    let mut flow = Workflow::new("add-user");

    flow.step("add member", orgs.add_user(org, member)).await?;
    let license_id = flow
        .step("resolve license", customer.get_license_id_for_org(org))
        .await?;
    let sponsorship = flow
        .step(
            "extend sponsorship",
            customer.extend_sponsorship(license_id, &member.user),
        )
        .await?;
    flow.step(
        "accept sponsorship",
        customer.accept_sponsorship(&sponsorship.verification_key),
    )
    .await?;
    flow.step("reload org", orgs.get(org)).await
}

/// Withdraw the member's sponsorship, then remove the membership. The
/// membership is kept when the sponsorship cannot be removed.
async fn remove_member(
    orgs: &dyn OrgService,
    customer: &dyn CustomerService,
    org: &str,
    user: &str,
) -> std::result::Result<(), StepFailure> {
    let mut flow = Workflow::new("remove-user");

    let license_id = flow
        .step("resolve license", customer.get_license_id_for_org(org))
        .await?;
    flow.step("remove sponsorship", customer.remove_sponsorship(user, license_id))
        .await?;
    flow.step("remove member", orgs.remove_user(org, user)).await?;
    Ok(())
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: LoggedInUser,
    Path(name): Path<String>,
) -> Response {
    let orgs = match state.services.org(&user.name) {
        Ok(orgs) => orgs,
        Err(e) => return View::error(&e).into_response(),
    };

    match orgs.delete(&name).await {
        Ok(_) => Redirect::to(&deleted_org_location(&name)).into_response(),
        Err(e) => {
            warn!(actor = %user.name, org = %name, error = %e, "Unable to delete org");
            View::error(&e).into_response()
        }
    }
}

/// The org page for `name`, flagged as deleted. The name is percent-encoded
/// as a single path segment.
fn deleted_org_location(name: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/org") else {
        return BILLING_PATH.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(name);
    }
    url.set_query(Some("deleted=1"));
    url[Position::BeforePath..].to_string()
}

fn clients(
    state: &AppState,
    user: &LoggedInUser,
) -> Result<(Arc<dyn OrgService>, Arc<dyn CustomerService>)> {
    Ok((
        state.services.org(&user.name)?,
        state.services.customer(&user.name)?,
    ))
}
