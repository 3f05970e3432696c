//! Downstream response classification.
//!
//! Every non-2xx response from the billing, license and user services goes
//! through [`classify`]. The first rule in [`RULES`] whose operation and
//! status match (and whose body pattern, if any, occurs in the body) decides
//! the domain error. Responses no rule matches keep their status and body as
//! [`Error::Downstream`].

use reqwest::StatusCode;
use tollgate_core::Error;

/// Downstream call being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetCustomer,
    UpdateBilling,
    DeleteCustomer,
    ListSubscriptions,
    LicenseForOrg,
    CreateSubscription,
    GetLicense,
    ListSponsorships,
    ExtendSponsorship,
    AcceptSponsorship,
    RemoveSponsorship,
    GetOrg,
    GetOrgUsers,
    CreateOrg,
    DeleteOrg,
    AddOrgUser,
    RemoveOrgUser,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GetCustomer => "get_customer",
            Operation::UpdateBilling => "update_billing",
            Operation::DeleteCustomer => "delete_customer",
            Operation::ListSubscriptions => "list_subscriptions",
            Operation::LicenseForOrg => "license_for_org",
            Operation::CreateSubscription => "create_subscription",
            Operation::GetLicense => "get_license",
            Operation::ListSponsorships => "list_sponsorships",
            Operation::ExtendSponsorship => "extend_sponsorship",
            Operation::AcceptSponsorship => "accept_sponsorship",
            Operation::RemoveSponsorship => "remove_sponsorship",
            Operation::GetOrg => "get_org",
            Operation::GetOrgUsers => "get_org_users",
            Operation::CreateOrg => "create_org",
            Operation::DeleteOrg => "delete_org",
            Operation::AddOrgUser => "add_org_user",
            Operation::RemoveOrgUser => "remove_org_user",
        }
    }
}

/// The resource a call addressed, used to fill error messages.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    /// Customer name, license id, verification key or org name.
    pub resource: &'a str,
}

pub struct Rule {
    pub operation: Operation,
    pub status: StatusCode,
    pub body_contains: Option<&'static str>,
    pub error: fn(&Subject<'_>) -> Error,
}

const DUPLICATE_SPONSORSHIP: &str = "duplicate key value violates unique constraint";

pub static RULES: &[Rule] = &[
    Rule {
        operation: Operation::GetCustomer,
        status: StatusCode::NOT_FOUND,
        body_contains: None,
        error: |s| Error::CustomerNotFound(s.resource.to_string()),
    },
    Rule {
        operation: Operation::DeleteCustomer,
        status: StatusCode::NOT_FOUND,
        body_contains: None,
        error: |s| Error::CustomerNotFound(s.resource.to_string()),
    },
    Rule {
        operation: Operation::LicenseForOrg,
        status: StatusCode::NOT_FOUND,
        body_contains: None,
        error: |_| Error::NoOrg,
    },
    Rule {
        operation: Operation::ExtendSponsorship,
        status: StatusCode::NOT_FOUND,
        body_contains: None,
        error: |s| Error::LicenseNotFound(s.resource.to_string()),
    },
    Rule {
        operation: Operation::AcceptSponsorship,
        status: StatusCode::NOT_FOUND,
        body_contains: None,
        error: |_| Error::VerificationKeyNotFound,
    },
    Rule {
        operation: Operation::AcceptSponsorship,
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body_contains: Some(DUPLICATE_SPONSORSHIP),
        error: |_| Error::AlreadySponsored,
    },
    Rule {
        operation: Operation::RemoveSponsorship,
        status: StatusCode::NOT_FOUND,
        body_contains: None,
        error: |_| Error::SponsorshipNotFound,
    },
    Rule {
        operation: Operation::GetOrg,
        status: StatusCode::NOT_FOUND,
        body_contains: None,
        error: |s| Error::OrgNotFound(s.resource.to_string()),
    },
    Rule {
        operation: Operation::GetOrgUsers,
        status: StatusCode::NOT_FOUND,
        body_contains: None,
        error: |s| Error::OrgNotFound(s.resource.to_string()),
    },
    Rule {
        operation: Operation::DeleteOrg,
        status: StatusCode::NOT_FOUND,
        body_contains: None,
        error: |s| Error::OrgNotFound(s.resource.to_string()),
    },
];

/// Map a failed downstream response to a domain error.
pub fn classify(
    operation: Operation,
    status: StatusCode,
    body: &str,
    subject: &Subject<'_>,
) -> Error {
    RULES
        .iter()
        .find(|rule| {
            rule.operation == operation
                && rule.status == status
                && rule.body_contains.is_none_or(|pattern| body.contains(pattern))
        })
        .map(|rule| (rule.error)(subject))
        .unwrap_or_else(|| passthrough(status, body))
}

fn passthrough(status: StatusCode, body: &str) -> Error {
    let message = match body.trim() {
        "" => status
            .canonical_reason()
            .unwrap_or("downstream error")
            .to_string(),
        text => serde_json::from_str::<String>(text).unwrap_or_else(|_| text.to_string()),
    };

    Error::Downstream {
        status: status.as_u16(),
        message,
    }
}
