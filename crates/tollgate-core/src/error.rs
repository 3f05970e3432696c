//! Error types for Tollgate.
//!
//! Every failure a handler can observe is one of these variants. Each variant
//! belongs to exactly one [`ErrorKind`], and [`Error::status`] gives the HTTP
//! status the user-facing response carries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Validation errors
    #[error("{0} is a required property")]
    MissingField(&'static str),

    #[error("Must pass a name to Customer model")]
    MissingUserName,

    #[error("unknown plan type: {0}")]
    UnknownPlan(String),

    #[error("an org name is required for org plans")]
    MissingOrgName,

    #[error("org billing is not enabled")]
    OrgBillingDisabled,

    #[error("unknown update type: {0}")]
    UnknownUpdateType(String),

    #[error("{0}")]
    CardRejected(String),

    // Not-found errors
    #[error("customer not found: {0}")]
    CustomerNotFound(String),

    #[error("License not found: {0}")]
    LicenseNotFound(String),

    #[error("verification key not found")]
    VerificationKeyNotFound,

    #[error("user or licenseId not found")]
    SponsorshipNotFound,

    #[error("No org with that name exists")]
    NoOrg,

    #[error("That org does not have a license_id")]
    NoLicenseId,

    #[error("org not found: {0}")]
    OrgNotFound(String),

    // Conflict errors
    #[error("user is already sponsored")]
    AlreadySponsored,

    #[error("Error: Org already exists.")]
    OrgExists,

    // Downstream errors
    #[error("{message}")]
    Downstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    // Infrastructure errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Downstream,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingField(_)
            | Error::MissingUserName
            | Error::UnknownPlan(_)
            | Error::MissingOrgName
            | Error::OrgBillingDisabled
            | Error::UnknownUpdateType(_)
            | Error::CardRejected(_) => ErrorKind::Validation,

            Error::CustomerNotFound(_)
            | Error::LicenseNotFound(_)
            | Error::VerificationKeyNotFound
            | Error::SponsorshipNotFound
            | Error::NoOrg
            | Error::NoLicenseId
            | Error::OrgNotFound(_) => ErrorKind::NotFound,

            Error::AlreadySponsored | Error::OrgExists => ErrorKind::Conflict,

            Error::Downstream { .. } | Error::Network(_) => ErrorKind::Downstream,

            Error::Serialization(_) | Error::Config(_) | Error::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status surfaced to the user for this error.
    pub fn status(&self) -> u16 {
        match self {
            Error::CardRejected(_) => 402,
            Error::Downstream { status, .. } => *status,
            Error::Network(_) => 502,
            _ => match self.kind() {
                ErrorKind::Validation => 400,
                ErrorKind::NotFound => 404,
                ErrorKind::Conflict => 403,
                ErrorKind::Downstream | ErrorKind::Internal => 500,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
