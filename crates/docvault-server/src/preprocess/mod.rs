//! Asynchronous asset preprocessing
//!
//! Accepted uploads are handed to a bounded submission queue backed by a
//! fixed pool of worker tasks, so preprocessing latency never shows up in
//! upload request latency. The preprocessing stage itself is opaque to the
//! ingestion pipeline and consumed through the [`Preprocessor`] trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod queue;

pub use queue::{PreprocessQueue, PreprocessWorkers, SubmitError};

/// Default number of preprocessing worker tasks.
pub const DEFAULT_WORKERS: usize = 4;

/// Default submission queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PreprocessConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            workers: std::env::var("PREPROCESS_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_WORKERS),
            queue_capacity: std::env::var("PREPROCESS_QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_QUEUE_CAPACITY),
        };

        if config.workers == 0 {
            anyhow::bail!("PREPROCESS_WORKERS must be greater than 0");
        }
        if config.queue_capacity == 0 {
            anyhow::bail!("PREPROCESS_QUEUE_CAPACITY must be greater than 0");
        }

        Ok(config)
    }
}

/// The preprocessing stage consumed by the worker pool.
///
/// Implementations receive the stored asset's path and owning project id.
/// Failures are logged by the pool and never retried; failure handling beyond
/// that is the implementation's concern.
#[async_trait]
pub trait Preprocessor: Send + Sync {
    async fn process(&self, project_id: i64, path: &Path) -> anyhow::Result<()>;
}

/// Default preprocessing stage.
///
/// Verifies the stored asset is readable and records its size. The actual
/// document-processing pipeline plugs in behind [`Preprocessor`].
pub struct PdfPreprocessor;

#[async_trait]
impl Preprocessor for PdfPreprocessor {
    async fn process(&self, project_id: i64, path: &Path) -> anyhow::Result<()> {
        let metadata = tokio::fs::metadata(path).await?;
        tracing::info!(
            project_id,
            path = %path.display(),
            size = metadata.len(),
            "Preprocessed asset"
        );
        Ok(())
    }
}
