//! API handlers.

pub mod search;

use std::sync::Arc;

use crate::search::SearchService;

pub use search::search;

/// Application state shared across handlers.
pub struct AppState {
    /// Search service.
    pub search: SearchService,
}

impl AppState {
    /// Create a new application state.
    pub fn new(search: SearchService) -> Self {
        Self { search }
    }

    /// Wrap in an `Arc` for the router.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
