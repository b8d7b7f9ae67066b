//! Projects feature: asset ingestion
//!
//! Vertical slice for project-bound asset uploads. The `add_assets` command
//! drives the whole pipeline: project lookup, per-file validation, storage
//! placement, asset recording, and submission to the preprocessing queue.

pub mod commands;
pub mod routes;
pub mod types;


pub use routes::projects_routes;
