//! Application state for the booking HTTP server.

use crate::booking::BookingCoordinator;
use crate::projections::BookingQueries;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned cheaply (via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Write side: the booking coordinator
    pub coordinator: Arc<BookingCoordinator>,

    /// Read side: enriched queries over committed state
    pub queries: Arc<BookingQueries>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(coordinator: Arc<BookingCoordinator>, queries: Arc<BookingQueries>) -> Self {
        Self {
            coordinator,
            queries,
        }
    }
}
