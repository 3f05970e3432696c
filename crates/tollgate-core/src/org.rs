//! Organizations and their memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An org together with its member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Org {
    pub info: OrgInfo,
    pub users: Vec<OrgUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of `GET /org/{name}/user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgUser {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The user service returns member lists either bare or paginated.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrgUserList {
    Plain(Vec<OrgUser>),
    Paged {
        #[serde(default)]
        count: Option<u64>,
        items: Vec<OrgUser>,
    },
}

impl OrgUserList {
    pub fn into_users(self) -> Vec<OrgUser> {
        match self {
            OrgUserList::Plain(users) => users,
            OrgUserList::Paged { items, .. } => items,
        }
    }
}

/// Body of `PUT /org/{name}/user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    pub user: String,
    pub role: String,
}

/// Membership record returned when a user is added to or removed from an org.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub org_id: u64,
    pub user_id: u64,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrgRequest {
    pub name: String,
}
