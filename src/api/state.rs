//! API server state

use std::sync::Arc;

use crate::complaints::{AcknowledgingIntake, ComplaintIntake};

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Business logic behind complaint creation
    pub intake: Arc<dyn ComplaintIntake>,
}

impl AppState {
    pub fn new(intake: Arc<dyn ComplaintIntake>) -> Self {
        Self { intake }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(AcknowledgingIntake))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
