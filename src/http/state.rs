//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::BookingPolicy;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    pub policy: BookingPolicy,
}

impl AppState {
    /// State with the default booking policy.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            policy: BookingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BookingPolicy) -> Self {
        self.policy = policy;
        self
    }
}
