//! `queue` crate: background job submission and the worker loop.
//!
//! A [`JobQueue`] accepts a workflow id plus input and hands back an opaque
//! [`JobHandle`] immediately. A [`Worker`] later pulls jobs from a
//! [`JobSource`] and passes each to a [`JobHandler`] (the engine).
//!
//! Two backends ship: [`MemoryQueue`] for single-process use and tests, and
//! [`PgQueue`] on top of the `job_queue` table.

pub mod error;
pub mod job;
pub mod memory;
pub mod postgres;
pub mod traits;
pub mod worker;

pub use error::QueueError;
pub use job::{Job, JobHandle};
pub use memory::MemoryQueue;
pub use postgres::PgQueue;
pub use traits::{JobHandler, JobQueue, JobSource};
pub use worker::{Worker, WorkerConfig};
