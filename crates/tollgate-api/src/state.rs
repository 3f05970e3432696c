//! Application state shared across handlers.

use std::sync::Arc;
use tollgate_core::AppConfig;
use tollgate_core::ports::{AnalyticsSink, ServiceFactory};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceFactory>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        services: Arc<dyn ServiceFactory>,
        analytics: Arc<dyn AnalyticsSink>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            services,
            analytics,
            config,
        }
    }
}
