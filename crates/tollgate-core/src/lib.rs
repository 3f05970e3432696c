//! Tollgate Core
//!
//! Domain types, the error taxonomy, configuration and port traits shared by
//! the service clients and the HTTP handlers. Nothing here performs I/O.

pub mod config;
pub mod customer;
pub mod error;
pub mod ids;
pub mod org;
pub mod plan;
pub mod ports;
pub mod sponsorship;

pub use config::AppConfig;
pub use error::{Error, ErrorKind, Result};
pub use ids::{LicenseId, VerificationKey};
