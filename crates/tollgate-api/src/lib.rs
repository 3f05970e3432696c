//! HTTP API for Tollgate.
//!
//! Handlers resolve per-user service clients from [`AppState`], run their
//! downstream calls in order and answer with a [`view::View`] or a redirect.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod view;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use routes::build_app;
pub use state::AppState;
