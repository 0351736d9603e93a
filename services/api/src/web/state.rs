//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use book_review_core::ports::{CatalogStore, ReviewStore, UserStore};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all
/// handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub users: Arc<dyn UserStore>,
    pub config: Arc<Config>,
}
