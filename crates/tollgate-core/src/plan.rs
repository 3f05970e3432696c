//! Billing plans.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Billing tiers offered on the subscribe form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    PrivateModules,
    Orgs,
}

impl PlanType {
    pub const ALL: [PlanType; 2] = [PlanType::PrivateModules, PlanType::Orgs];

    /// Provider plan code the billing service expects.
    pub fn code(&self) -> &'static str {
        match self {
            PlanType::PrivateModules => "npm-paid-individual-user-7",
            PlanType::Orgs => "npm-paid-org-6",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::PrivateModules => "private_modules",
            PlanType::Orgs => "orgs",
        }
    }

    pub fn is_org(&self) -> bool {
        matches!(self, PlanType::Orgs)
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanType::ALL
            .into_iter()
            .find(|plan| plan.as_str() == s)
            .ok_or_else(|| Error::UnknownPlan(s.to_string()))
    }
}
