//! Request handlers organized by resource.

pub mod billing;
pub mod health;
pub mod org;
