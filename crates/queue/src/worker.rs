//! Worker loop: poll a `JobSource`, run each job through a `JobHandler`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, instrument};

use crate::{Job, JobHandler, JobSource, QueueError};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How long to sleep when the queue is empty (or unreachable).
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
        }
    }
}

pub struct Worker {
    source: Arc<dyn JobSource>,
    handler: Arc<dyn JobHandler>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(source: Arc<dyn JobSource>, handler: Arc<dyn JobHandler>, config: WorkerConfig) -> Self {
        Self { source, handler, config }
    }

    /// Poll until `shutdown` carries `true`.
    ///
    /// Storage errors while claiming a job are logged and retried after one
    /// poll interval; they never end the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(poll_interval = ?self.config.poll_interval, "worker started");

        while !*shutdown.borrow() {
            let idle = match self.run_once().await {
                Ok(processed) => !processed,
                Err(e) => {
                    error!("worker failed to claim a job: {e}");
                    true
                }
            };

            if idle {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                    changed = shutdown.changed() => {
                        // A dropped sender counts as shutdown.
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        info!("worker stopped");
    }

    /// Claim and process at most one job. Returns whether a job was found.
    pub async fn run_once(&self) -> Result<bool, QueueError> {
        match self.source.next_job().await? {
            Some(job) => {
                self.process(&job).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, workflow_id = %job.workflow_id))]
    async fn process(&self, job: &Job) -> Result<(), QueueError> {
        match self.handler.handle(job).await {
            Ok(()) => {
                info!("job completed");
                self.source.complete(job).await
            }
            Err(e) => self.source.fail(job, &format!("{e:#}")).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JobQueue, MemoryQueue};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<Uuid>>,
        fail: bool,
    }

    #[async_trait]
    impl JobHandler for RecordingHandler {
        async fn handle(&self, job: &Job) -> anyhow::Result<()> {
            self.seen.lock().await.push(job.id);
            if self.fail {
                anyhow::bail!("handler refused job");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_once_completes_job() {
        let queue = Arc::new(MemoryQueue::new());
        let handler = Arc::new(RecordingHandler::default());
        let worker = Worker::new(queue.clone(), handler.clone(), WorkerConfig::default());

        let handle = queue.submit(Uuid::new_v4(), json!({})).await.unwrap();

        assert!(worker.run_once().await.unwrap());
        assert!(!worker.run_once().await.unwrap());
        assert_eq!(*handler.seen.lock().await, vec![handle.id]);
        assert_eq!(queue.completed().await, vec![handle.id]);
    }

    #[tokio::test]
    async fn failing_handler_exhausts_attempts() {
        let queue = Arc::new(MemoryQueue::new());
        let handler = Arc::new(RecordingHandler { fail: true, ..Default::default() });
        let worker = Worker::new(queue.clone(), handler.clone(), WorkerConfig::default());

        let handle = queue.submit(Uuid::new_v4(), json!({})).await.unwrap();
        while worker.run_once().await.unwrap() {}

        assert_eq!(handler.seen.lock().await.len(), crate::job::DEFAULT_MAX_ATTEMPTS as usize);
        assert_eq!(queue.dead_lettered().await, vec![handle.id]);
        assert!(queue.completed().await.is_empty());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let queue = Arc::new(MemoryQueue::new());
        let handler = Arc::new(RecordingHandler::default());
        let worker = Arc::new(Worker::new(
            queue.clone(),
            handler.clone(),
            WorkerConfig { poll_interval: Duration::from_millis(5) },
        ));

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn({
            let worker = worker.clone();
            async move { worker.run(rx).await }
        });

        let handle = queue.submit(Uuid::new_v4(), json!({})).await.unwrap();
        for _ in 0..200 {
            if !queue.completed().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(queue.completed().await, vec![handle.id]);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("worker should stop")
            .unwrap();
    }
}
