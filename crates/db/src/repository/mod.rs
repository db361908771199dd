//! Repository functions: one function per database operation.
//!
//! Every function takes a `&DbPool` and returns a `Result<T, DbError>`.
//! Pure SQL: no business logic, no domain types.

pub mod executions;
pub mod jobs;
pub mod tasks;
pub mod workflows;
