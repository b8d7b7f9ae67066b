//! Feature modules implementing the docvault API
//!
//! Each feature is a vertical slice with its own commands, routes, and types:
//!
//! - **projects**: project-bound asset ingestion
//!
//! Command handlers take their collaborators explicitly, so routes stay thin
//! and tests can substitute in-memory implementations.

pub mod projects;
pub mod shared;

use axum::Router;
use std::sync::Arc;

use crate::db::ProjectStore;
use crate::preprocess::PreprocessQueue;
use crate::storage::AssetStorage;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Project and asset record store
    pub projects: Arc<dyn ProjectStore>,
    /// Project-scoped asset storage
    pub storage: AssetStorage,
    /// Submission queue for asynchronous preprocessing
    pub queue: PreprocessQueue,
}

/// Creates the main API router with all feature routes mounted
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/projects", projects::projects_routes().with_state(state))
}
