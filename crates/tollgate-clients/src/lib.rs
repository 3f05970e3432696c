//! HTTP clients for the downstream services.
//!
//! Each client is a thin wrapper: one method, one request (unless noted),
//! non-2xx responses classified through [`status::RULES`].

pub mod customer;
pub mod factory;
pub mod http;
pub mod hubspot;
pub mod org;
pub mod status;

pub use customer::CustomerClient;
pub use factory::HttpServices;
pub use hubspot::HubspotSink;
pub use org::OrgClient;
