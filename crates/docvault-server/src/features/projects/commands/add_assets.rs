//! Batch asset ingestion command
//!
//! Orchestrates one upload batch: resolve the project once, then per file in
//! input order validate, store, record, and submit for preprocessing. The
//! batch fails as a whole on the first invalid file or storage failure
//! (fail-fast policy); the caller never sees partial-success signals. Files
//! already stored before the failure point keep their submission jobs — the
//! pipeline does not roll back written bytes.

use mediator::Request;
use serde::Serialize;
use thiserror::Error;

use crate::db::{DbError, NewAsset, ProjectStore};
use crate::features::shared::validation::{self, FileTypeError};
use crate::preprocess::{PreprocessQueue, SubmitError};
use crate::storage::AssetStorage;

use super::super::types::CandidateFile;

#[derive(Debug, Clone)]
pub struct AddAssetsCommand {
    pub project_id: i64,
    pub files: Vec<CandidateFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddAssetsResponse {
    pub message: String,
    pub files_ingested: usize,
}

#[derive(Debug, Error)]
pub enum AddAssetsError {
    #[error("Project not found")]
    ProjectNotFound,

    #[error(transparent)]
    InvalidFileType(#[from] FileTypeError),

    #[error("Failed to store {filename}: {source}")]
    Storage {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to submit {filename} for preprocessing: {source}")]
    Submission {
        filename: String,
        #[source]
        source: SubmitError,
    },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl Request<Result<AddAssetsResponse, AddAssetsError>> for AddAssetsCommand {}

#[tracing::instrument(skip(projects, storage, queue, command), fields(project_id = command.project_id, files = command.files.len()))]
pub async fn handle(
    projects: &dyn ProjectStore,
    storage: &AssetStorage,
    queue: &PreprocessQueue,
    command: AddAssetsCommand,
) -> Result<AddAssetsResponse, AddAssetsError> {
    // Project existence is an all-or-nothing precondition: resolved once per
    // batch, and nothing touches storage or the queue when it fails.
    if projects.get_project(command.project_id).await?.is_none() {
        return Err(AddAssetsError::ProjectNotFound);
    }

    let mut ingested = 0;
    for file in &command.files {
        // Rejected files never reach disk.
        validation::validate_file_type(&file.filename)?;

        let path = storage
            .store(command.project_id, &file.filename, &file.content)
            .await
            .map_err(|source| AddAssetsError::Storage {
                filename: file.filename.clone(),
                source,
            })?;

        projects
            .record_asset(NewAsset {
                project_id: command.project_id,
                filename: file.filename.clone(),
                storage_path: path.to_string_lossy().into_owned(),
            })
            .await?;

        // Fire-and-forget: the ingestion call never waits on preprocessing.
        queue
            .submit(command.project_id, path)
            .map_err(|source| AddAssetsError::Submission {
                filename: file.filename.clone(),
                source,
            })?;

        ingested += 1;
    }

    tracing::info!(files_ingested = ingested, "Asset batch ingested");

    Ok(AddAssetsResponse {
        message: "Successfully uploaded the files".to_string(),
        files_ingested: ingested,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{InMemoryProjectStore, RecordingPreprocessor};
    use crate::preprocess::{PreprocessConfig, PreprocessQueue, PreprocessWorkers};
    use crate::storage::StorageConfig;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    struct Harness {
        projects: Arc<InMemoryProjectStore>,
        storage: AssetStorage,
        queue: PreprocessQueue,
        workers: PreprocessWorkers,
        seen: mpsc::UnboundedReceiver<(i64, PathBuf)>,
        upload_root: TempDir,
    }

    fn harness(known_projects: &[i64]) -> Harness {
        let upload_root = tempfile::tempdir().unwrap();
        let (preprocessor, seen) = RecordingPreprocessor::new();
        let (queue, workers) = PreprocessQueue::start(
            &PreprocessConfig::default(),
            Arc::new(preprocessor),
        );

        Harness {
            projects: Arc::new(InMemoryProjectStore::with_projects(known_projects)),
            storage: AssetStorage::new(StorageConfig::for_root(upload_root.path())),
            queue,
            workers,
            seen,
            upload_root,
        }
    }

    fn pdf(filename: &str, content: &[u8]) -> CandidateFile {
        CandidateFile {
            filename: filename.to_string(),
            content: content.to_vec(),
        }
    }

    /// Stop the pool and drain every job the workers processed.
    async fn drain(queue: PreprocessQueue, workers: PreprocessWorkers, mut seen: mpsc::UnboundedReceiver<(i64, PathBuf)>) -> Vec<(i64, PathBuf)> {
        drop(queue);
        workers.shutdown().await;

        let mut jobs = Vec::new();
        while let Some(job) = seen.recv().await {
            jobs.push(job);
        }
        jobs
    }

    #[tokio::test]
    async fn test_upload_success() {
        let h = harness(&[1]);

        let result = handle(
            h.projects.as_ref(),
            &h.storage,
            &h.queue,
            AddAssetsCommand {
                project_id: 1,
                files: vec![pdf("test.pdf", b"Dummy PDF content")],
            },
        )
        .await
        .unwrap();

        assert_eq!(result.message, "Successfully uploaded the files");
        assert_eq!(result.files_ingested, 1);

        let stored = h.upload_root.path().join("1").join("test.pdf");
        assert_eq!(tokio::fs::read(&stored).await.unwrap(), b"Dummy PDF content");

        let assets = h.projects.recorded_assets();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].filename, "test.pdf");
        assert_eq!(assets[0].storage_path, stored.to_string_lossy());

        let jobs = drain(h.queue, h.workers, h.seen).await;
        assert_eq!(jobs, vec![(1, stored)]);
    }

    #[tokio::test]
    async fn test_unknown_project_has_no_side_effects() {
        let h = harness(&[]);

        let err = handle(
            h.projects.as_ref(),
            &h.storage,
            &h.queue,
            AddAssetsCommand {
                project_id: 1,
                files: vec![pdf("test.pdf", b"Dummy PDF content")],
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AddAssetsError::ProjectNotFound));
        assert_eq!(err.to_string(), "Project not found");

        // Zero writes, zero records, zero submissions
        let mut entries = tokio::fs::read_dir(h.upload_root.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
        assert!(h.projects.recorded_assets().is_empty());
        assert!(drain(h.queue, h.workers, h.seen).await.is_empty());
    }

    #[tokio::test]
    async fn test_non_pdf_rejected_before_storage() {
        let h = harness(&[1]);

        let err = handle(
            h.projects.as_ref(),
            &h.storage,
            &h.queue,
            AddAssetsCommand {
                project_id: 1,
                files: vec![pdf("test.txt", b"Dummy non-PDF content")],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "The file test.txt is not a PDF");

        let mut entries = tokio::fs::read_dir(h.upload_root.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
        assert!(h.projects.recorded_assets().is_empty());
        assert!(drain(h.queue, h.workers, h.seen).await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_fails_fast_on_first_invalid_file() {
        let h = harness(&[1]);

        let err = handle(
            h.projects.as_ref(),
            &h.storage,
            &h.queue,
            AddAssetsCommand {
                project_id: 1,
                files: vec![
                    pdf("a.pdf", b"a"),
                    pdf("b.txt", b"b"),
                    pdf("c.pdf", b"c"),
                ],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "The file b.txt is not a PDF");

        // The file before the rejection point was stored and submitted; the
        // one after it was never touched.
        let project_dir = h.upload_root.path().join("1");
        assert!(project_dir.join("a.pdf").exists());
        assert!(!project_dir.join("c.pdf").exists());
        assert_eq!(h.projects.recorded_assets().len(), 1);

        let jobs = drain(h.queue, h.workers, h.seen).await;
        assert_eq!(jobs, vec![(1, project_dir.join("a.pdf"))]);
    }

    #[tokio::test]
    async fn test_multi_file_batch_success() {
        let h = harness(&[3]);

        let result = handle(
            h.projects.as_ref(),
            &h.storage,
            &h.queue,
            AddAssetsCommand {
                project_id: 3,
                files: vec![
                    pdf("one.pdf", b"1"),
                    pdf("two.pdf", b"2"),
                    pdf("three.pdf", b"3"),
                ],
            },
        )
        .await
        .unwrap();

        assert_eq!(result.files_ingested, 3);
        assert_eq!(h.projects.recorded_assets().len(), 3);

        let jobs = drain(h.queue, h.workers, h.seen).await;
        assert_eq!(jobs.len(), 3);
    }

    #[tokio::test]
    async fn test_reingest_overwrites_last_write_wins() {
        let h = harness(&[1]);

        for content in [b"first".as_slice(), b"second".as_slice()] {
            handle(
                h.projects.as_ref(),
                &h.storage,
                &h.queue,
                AddAssetsCommand {
                    project_id: 1,
                    files: vec![pdf("test.pdf", content)],
                },
            )
            .await
            .unwrap();
        }

        let stored = h.upload_root.path().join("1").join("test.pdf");
        assert_eq!(tokio::fs::read(&stored).await.unwrap(), b"second");

        // One record and one submission per ingestion call
        assert_eq!(h.projects.recorded_assets().len(), 2);
        assert_eq!(drain(h.queue, h.workers, h.seen).await.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds_with_zero_count() {
        let h = harness(&[1]);

        let result = handle(
            h.projects.as_ref(),
            &h.storage,
            &h.queue,
            AddAssetsCommand {
                project_id: 1,
                files: vec![],
            },
        )
        .await
        .unwrap();

        assert_eq!(result.files_ingested, 0);
    }

    #[tokio::test]
    async fn test_concurrent_batches_for_same_new_project() {
        let h = harness(&[5]);

        let mut handles = Vec::new();
        for i in 0..8 {
            let projects = Arc::clone(&h.projects);
            let storage = h.storage.clone();
            let queue = h.queue.clone();
            handles.push(tokio::spawn(async move {
                handle(
                    projects.as_ref(),
                    &storage,
                    &queue,
                    AddAssetsCommand {
                        project_id: 5,
                        files: vec![pdf(&format!("file-{}.pdf", i), b"content")],
                    },
                )
                .await
            }));
        }

        for task in handles {
            task.await.unwrap().unwrap();
        }

        let project_dir = h.upload_root.path().join("5");
        for i in 0..8 {
            assert!(project_dir.join(format!("file-{}.pdf", i)).exists());
        }
        assert_eq!(h.projects.recorded_assets().len(), 8);
        assert_eq!(drain(h.queue, h.workers, h.seen).await.len(), 8);
    }
}
