//! In-memory substitutes for the pipeline's external collaborators
//!
//! Used by unit and router tests so the ingestion pipeline can be exercised
//! without a database or a real preprocessing stage.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::db::{DbResult, NewAsset, Project, ProjectStore};
use crate::preprocess::Preprocessor;

/// Project store backed by a fixed set of known project ids. Recorded assets
/// are kept in memory for assertions.
pub struct InMemoryProjectStore {
    projects: Vec<i64>,
    assets: Mutex<Vec<NewAsset>>,
}

impl InMemoryProjectStore {
    pub fn with_projects(projects: &[i64]) -> Self {
        Self {
            projects: projects.to_vec(),
            assets: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_assets(&self) -> Vec<NewAsset> {
        self.assets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn get_project(&self, project_id: i64) -> DbResult<Option<Project>> {
        Ok(self.projects.contains(&project_id).then(|| Project {
            id: project_id,
            name: format!("project-{}", project_id),
        }))
    }

    async fn record_asset(&self, asset: NewAsset) -> DbResult<()> {
        self.assets.lock().unwrap().push(asset);
        Ok(())
    }
}

/// Preprocessor that forwards every job it processes to a channel.
pub struct RecordingPreprocessor {
    tx: mpsc::UnboundedSender<(i64, PathBuf)>,
}

impl RecordingPreprocessor {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(i64, PathBuf)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Preprocessor for RecordingPreprocessor {
    async fn process(&self, project_id: i64, path: &Path) -> anyhow::Result<()> {
        let _ = self.tx.send((project_id, path.to_path_buf()));
        Ok(())
    }
}
