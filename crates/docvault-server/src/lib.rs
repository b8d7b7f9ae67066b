//! Docvault Server Library
//!
//! HTTP server for the docvault project-centric document system. The core of
//! the service is the asset-ingestion pipeline: clients upload batches of
//! files bound to a project; the server validates each file, persists it to
//! project-scoped storage, records the asset, and hands the stored file to an
//! asynchronous preprocessing worker pool without blocking the request.
//!
//! # Architecture
//!
//! Features follow a CQRS-flavored vertical-slice layout: each feature owns
//! its `commands/`, `routes.rs`, and `types.rs`. Write operations live in
//! command handlers that the HTTP routes call into.
//!
//! External collaborators are modeled as traits so the pipeline can be tested
//! with in-memory substitutes:
//!
//! - [`db::ProjectStore`]: resolves project ids and records accepted assets
//! - [`preprocess::Preprocessor`]: the opaque preprocessing stage consumed by
//!   the worker pool
//!
//! ## Framework Stack
//!
//! - **Axum**: web framework (multipart upload handling)
//! - **SQLx**: PostgreSQL project/asset record store
//! - **Tower / tower-http**: CORS, request tracing, compression
//! - **Tokio**: request tasks and the bounded submission queue

pub mod api;
pub mod config;
pub mod db;
pub mod features;
pub mod middleware;
pub mod preprocess;
pub mod storage;
