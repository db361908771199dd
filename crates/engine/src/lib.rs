//! `engine` crate: domain models, storage seam, and the workflow execution
//! engine.

pub mod dispatch;
pub mod error;
pub mod executor;
pub mod models;
pub mod runner;
pub mod store;
pub mod validate;

pub use dispatch::Dispatcher;
pub use error::{EngineError, StoreError};
pub use executor::WorkflowExecutor;
pub use models::{Execution, ExecutionStatus, NewTask, NewWorkflow, Task, Workflow, WorkflowUpdate};
pub use store::{MemoryStore, PgStore, WorkflowStore};
