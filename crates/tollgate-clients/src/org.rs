//! User/org service client.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use tollgate_core::config::ServicesConfig;
use tollgate_core::org::{CreateOrgRequest, Membership, NewMember, Org, OrgInfo, OrgUserList};
use tollgate_core::ports::OrgService;
use tollgate_core::{Error, Result};
use tracing::info;

use crate::http::{Endpoint, call};
use crate::status::{Operation, Subject};

/// Header the user service reads the acting user from.
pub const ACTOR_HEADER: &str = "bearer";

/// Org client acting on behalf of one user.
pub struct OrgClient {
    actor: String,
    users: Endpoint,
}

impl OrgClient {
    pub fn new(config: &ServicesConfig, http: Client, actor: impl Into<String>) -> Result<Self> {
        let actor = actor.into();
        if actor.trim().is_empty() {
            return Err(Error::MissingUserName);
        }

        Ok(Self {
            users: Endpoint::new(http, &config.user_api)?,
            actor,
        })
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.users
            .request(method, segments)
            .header(ACTOR_HEADER, &self.actor)
    }
}

#[async_trait]
impl OrgService for OrgClient {
    fn actor(&self) -> &str {
        &self.actor
    }

    async fn get(&self, name: &str) -> Result<Org> {
        let subject = Subject { resource: name };

        let info: OrgInfo = call(
            Operation::GetOrg,
            subject,
            self.request(Method::GET, &["org", name]),
        )
        .await?
        .json()?;
        let users: OrgUserList = call(
            Operation::GetOrgUsers,
            subject,
            self.request(Method::GET, &["org", name, "user"]),
        )
        .await?
        .json()?;

        Ok(Org {
            info,
            users: users.into_users(),
        })
    }

    async fn create(&self, name: &str) -> Result<OrgInfo> {
        let request = self.request(Method::PUT, &["org"]).json(&CreateOrgRequest {
            name: name.to_string(),
        });
        let org: OrgInfo = call(Operation::CreateOrg, Subject { resource: name }, request)
            .await?
            .json()?;

        info!(actor = %self.actor, org = %name, "Created org");
        Ok(org)
    }

    async fn delete(&self, name: &str) -> Result<OrgInfo> {
        let request = self.request(Method::DELETE, &["org", name]);
        let org: OrgInfo = call(Operation::DeleteOrg, Subject { resource: name }, request)
            .await?
            .json()?;

        info!(actor = %self.actor, org = %name, "Deleted org");
        Ok(org)
    }

    async fn add_user(&self, org: &str, member: &NewMember) -> Result<Membership> {
        let request = self.request(Method::PUT, &["org", org, "user"]).json(member);
        call(Operation::AddOrgUser, Subject { resource: org }, request)
            .await?
            .json()
    }

    async fn remove_user(&self, org: &str, user: &str) -> Result<Membership> {
        let request = self.request(Method::DELETE, &["org", org, "user", user]);
        call(Operation::RemoveOrgUser, Subject { resource: org }, request)
            .await?
            .json()
    }
}
