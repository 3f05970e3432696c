//! End-to-end test infrastructure for Tollgate.
//!
//! Runs the real router and HTTP clients against wiremock stand-ins for the
//! billing, license, user and HubSpot services.
//!
//! # Usage
//!
//! ```ignore
//! use tollgate_tests::TestContext;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let ctx = TestContext::new().await.unwrap();
//!     // Mount mocks on ctx.billing / ctx.license / ctx.users, then use ctx.client.
//! }
//! ```

pub mod context;
pub mod fixtures;
pub mod helpers;

pub use context::TestContext;
pub use helpers::*;

/// Initialize test logging (safe to call from every test).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tollgate_api=debug")),
        )
        .with_test_writer()
        .try_init();
}
