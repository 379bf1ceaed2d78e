//! Deferred background tasks.
//!
//! ## Design
//!
//! - A job is a named task with no payload, queued by one request and run later
//! - Each job runs once; failures are recorded, never retried
//! - Scheduling (`JobQueue::enqueue`) is decoupled from execution (`JobExecutor`)
//!
//! ## Components
//!
//! - `Job`: task name, status and attempt history
//! - `JobQueue`: the narrow "schedule by name" interface producers depend on
//! - `JobStore`: persistence for jobs, with `InMemoryJobStore` for tests/dev
//! - `JobExecutor`: runs claimed jobs through registered handlers

pub mod executor;
pub mod store;
pub mod types;

pub use executor::{ExecutorStats, JobExecutionError, JobExecutor, JobExecutorConfig, JobExecutorHandle};
pub use store::{InMemoryJobStore, JobQueue, JobStats, JobStore, JobStoreError};
pub use types::{Job, JobAttemptRecord, JobId, JobResult, JobStatus};
