//! Bounded submission queue and worker pool
//!
//! The queue is the only shared mutable resource crossing ingestion calls.
//! Submission is non-blocking (`try_send` on a bounded channel); backpressure
//! surfaces as a per-file [`SubmitError`] rather than blocking the caller.
//! Workers share the receiver behind a mutex so each job is picked up exactly
//! once. Jobs submitted on the same queue are delivered FIFO; completion
//! order across workers is unspecified.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{PreprocessConfig, Preprocessor};

/// A unit of preprocessing work: the stored asset and its owning project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessJob {
    pub project_id: i64,
    pub path: PathBuf,
}

/// Submission failures reported back per file, never retried here.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Preprocessing queue is full")]
    QueueFull,

    #[error("Preprocessing worker pool is shut down")]
    Closed,
}

/// Handle for submitting jobs; cheap to clone into request handlers.
#[derive(Clone)]
pub struct PreprocessQueue {
    tx: mpsc::Sender<PreprocessJob>,
}

/// Handle on the spawned worker tasks, kept by the server entry point.
pub struct PreprocessWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl PreprocessQueue {
    /// Spawn the worker pool and return the submission handle alongside the
    /// worker handles.
    pub fn start(
        config: &PreprocessConfig,
        preprocessor: Arc<dyn Preprocessor>,
    ) -> (Self, PreprocessWorkers) {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let mut handles = Vec::with_capacity(config.workers);
        for worker_id in 0..config.workers {
            let rx = Arc::clone(&rx);
            let preprocessor = Arc::clone(&preprocessor);
            handles.push(tokio::spawn(worker_loop(worker_id, rx, preprocessor)));
        }

        (Self { tx }, PreprocessWorkers { handles })
    }

    /// Enqueue a job without blocking. A full queue or a shut-down pool is
    /// reported to the caller; the job is not retried.
    pub fn submit(&self, project_id: i64, path: PathBuf) -> Result<(), SubmitError> {
        self.tx
            .try_send(PreprocessJob { project_id, path })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => SubmitError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
            })
    }
}

impl PreprocessWorkers {
    /// Wait for the workers to finish. Workers stop once every submission
    /// handle has been dropped and the queue is drained.
    pub async fn shutdown(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<PreprocessJob>>>,
    preprocessor: Arc<dyn Preprocessor>,
) {
    debug!(worker_id, "Preprocess worker started");

    loop {
        // The lock is held only while waiting for the next job, so exactly
        // one worker receives each job.
        let job = {
            let mut rx = rx.lock().await;
            rx.recv().await
        };

        let Some(job) = job else { break };

        debug!(
            worker_id,
            project_id = job.project_id,
            path = %job.path.display(),
            "Picked up preprocessing job"
        );

        if let Err(err) = preprocessor.process(job.project_id, &job.path).await {
            // Not retried; the stored file is left in place.
            error!(
                worker_id,
                project_id = job.project_id,
                path = %job.path.display(),
                error = %err,
                "Preprocessing failed"
            );
        }
    }

    debug!(worker_id, "Preprocess worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::RecordingPreprocessor;
    use std::collections::HashSet;
    use std::time::Duration;

    fn config(workers: usize, queue_capacity: usize) -> PreprocessConfig {
        PreprocessConfig {
            workers,
            queue_capacity,
        }
    }

    #[tokio::test]
    async fn test_jobs_delivered_exactly_once() {
        let (preprocessor, mut seen) = RecordingPreprocessor::new();
        let (queue, workers) = PreprocessQueue::start(&config(3, 16), Arc::new(preprocessor));

        for i in 0..5 {
            queue.submit(1, PathBuf::from(format!("/assets/1/f{}.pdf", i))).unwrap();
        }

        let mut received = HashSet::new();
        for _ in 0..5 {
            let (project_id, path) = seen.recv().await.unwrap();
            assert_eq!(project_id, 1);
            assert!(received.insert(path));
        }
        assert_eq!(received.len(), 5);

        drop(queue);
        workers.shutdown().await;

        // Nothing processed twice
        assert!(seen.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_single_worker_preserves_submission_order() {
        let (preprocessor, mut seen) = RecordingPreprocessor::new();
        let (queue, workers) = PreprocessQueue::start(&config(1, 16), Arc::new(preprocessor));

        for i in 0..3 {
            queue.submit(9, PathBuf::from(format!("/assets/9/f{}.pdf", i))).unwrap();
        }

        for i in 0..3 {
            let (_, path) = seen.recv().await.unwrap();
            assert_eq!(path, PathBuf::from(format!("/assets/9/f{}.pdf", i)));
        }

        drop(queue);
        workers.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_reports_full_queue() {
        // No workers, so nothing drains the channel.
        let (preprocessor, _seen) = RecordingPreprocessor::new();
        let (queue, _workers) = PreprocessQueue::start(&config(0, 2), Arc::new(preprocessor));

        queue.submit(1, PathBuf::from("/a.pdf")).unwrap();
        queue.submit(1, PathBuf::from("/b.pdf")).unwrap();
        assert!(matches!(
            queue.submit(1, PathBuf::from("/c.pdf")),
            Err(SubmitError::QueueFull)
        ));
    }

    #[tokio::test]
    async fn test_workers_drain_queue_on_shutdown() {
        let (preprocessor, mut seen) = RecordingPreprocessor::new();
        let (queue, workers) = PreprocessQueue::start(&config(2, 16), Arc::new(preprocessor));

        for i in 0..4 {
            queue.submit(2, PathBuf::from(format!("/assets/2/f{}.pdf", i))).unwrap();
        }

        drop(queue);
        tokio::time::timeout(Duration::from_secs(5), workers.shutdown())
            .await
            .unwrap();

        let mut count = 0;
        while seen.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 4);
    }
}
