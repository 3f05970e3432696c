//! License-seat sponsorships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{LicenseId, VerificationKey};

/// A license seat offered to a user.
///
/// `verified` is `None` until the verification key is presented, and
/// `deleted` is set when the sponsorship is revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsorship {
    #[serde(default)]
    pub id: Option<u64>,
    pub license_id: LicenseId,
    pub npm_user: String,
    pub verification_key: VerificationKey,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: Option<DateTime<Utc>>,
}

impl Sponsorship {
    pub fn is_verified(&self) -> bool {
        self.verified == Some(true)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

/// Body of `PUT /sponsorship/{license}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsorshipRequest {
    pub npm_user: String,
}

/// Some endpoints answer with either one record or an array of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    pub fn into_first(self) -> Option<T> {
        self.into_vec().into_iter().next()
    }
}
