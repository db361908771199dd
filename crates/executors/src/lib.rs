//! `executors` crate: the `TaskExecutor` trait and built-in task executors.
//!
//! Every task type a workflow can reference is backed by a [`TaskExecutor`].
//! The engine crate looks executors up through an [`ExecutorRegistry`] keyed
//! by the task's type tag and dispatches through the trait object.

pub mod conditional;
pub mod context;
pub mod database;
pub mod email;
pub mod error;
pub mod expr;
pub mod http;
pub mod kind;
pub mod mock;
pub mod registry;
pub mod traits;
pub mod transform;

pub use context::ExecutionContext;
pub use error::{TaskError, UnsupportedTaskType};
pub use kind::TaskKind;
pub use registry::ExecutorRegistry;
pub use traits::TaskExecutor;
