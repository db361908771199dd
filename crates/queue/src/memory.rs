//! In-process queue backed by a tokio channel.
//!
//! Jobs live only as long as the process. Used by `serve --in-memory` and
//! throughout the tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Job, JobHandle, JobQueue, JobSource, QueueError};

/// How many finished job ids each history list keeps by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

/// Most recent job ids, oldest dropped first once full.
struct History {
    ids: VecDeque<Uuid>,
    capacity: usize,
}

impl History {
    fn new(capacity: usize) -> Self {
        Self { ids: VecDeque::new(), capacity }
    }

    fn push(&mut self, id: Uuid) {
        if self.capacity == 0 {
            return;
        }
        if self.ids.len() == self.capacity {
            self.ids.pop_front();
        }
        self.ids.push_back(id);
    }
}

pub struct MemoryQueue {
    tx: mpsc::UnboundedSender<Job>,
    rx: Mutex<mpsc::UnboundedReceiver<Job>>,
    completed: Mutex<History>,
    dead_lettered: Mutex<History>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Keep at most `capacity` ids in each of the completed and
    /// dead-lettered lists.
    pub fn with_history_capacity(capacity: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            completed: Mutex::new(History::new(capacity)),
            dead_lettered: Mutex::new(History::new(capacity)),
        }
    }

    /// Ids of the most recent jobs that finished successfully, oldest first.
    pub async fn completed(&self) -> Vec<Uuid> {
        self.completed.lock().await.ids.iter().copied().collect()
    }

    /// Ids of the most recent jobs that exhausted their attempts.
    pub async fn dead_lettered(&self) -> Vec<Uuid> {
        self.dead_lettered.lock().await.ids.iter().copied().collect()
    }

    fn push(&self, job: Job) -> Result<(), QueueError> {
        self.tx.send(job).map_err(|_| QueueError::Closed)
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn submit(&self, workflow_id: Uuid, input: Value) -> Result<JobHandle, QueueError> {
        let job = Job::new(workflow_id, input);
        let handle = JobHandle { id: job.id };
        self.push(job)?;
        info!(job_id = %handle.id, %workflow_id, "job enqueued");
        Ok(handle)
    }
}

#[async_trait]
impl JobSource for MemoryQueue {
    async fn next_job(&self) -> Result<Option<Job>, QueueError> {
        match self.rx.lock().await.try_recv() {
            Ok(mut job) => {
                job.attempts += 1;
                Ok(Some(job))
            }
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(QueueError::Closed),
        }
    }

    async fn complete(&self, job: &Job) -> Result<(), QueueError> {
        self.completed.lock().await.push(job.id);
        Ok(())
    }

    async fn fail(&self, job: &Job, reason: &str) -> Result<(), QueueError> {
        if job.attempts >= job.max_attempts {
            warn!(job_id = %job.id, attempts = job.attempts, "job dead-lettered: {reason}");
            self.dead_lettered.lock().await.push(job.id);
            Ok(())
        } else {
            warn!(job_id = %job.id, attempts = job.attempts, "job failed, requeueing: {reason}");
            self.push(job.clone())
        }
    }
}
