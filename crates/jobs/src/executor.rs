//! Job executor: claims queued jobs and runs them through named handlers.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::store::{JobStore, JobStoreError};
use super::types::{Job, JobResult};

/// Job handler function type.
pub type JobHandler = Box<dyn Fn(&Job) -> JobResult + Send + Sync>;

/// Why a single job did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobExecutionError {
    #[error("no handler for job: {0}")]
    NoHandler(String),
    #[error("job failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Store(#[from] JobStoreError),
}

/// Job executor configuration.
#[derive(Debug, Clone)]
pub struct JobExecutorConfig {
    /// How often to poll for new jobs
    pub poll_interval: Duration,
    /// Name for logging and the worker thread
    pub name: String,
}

impl Default for JobExecutorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            name: "job-executor".to_string(),
        }
    }
}

impl JobExecutorConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Handle to control a running executor.
#[derive(Debug)]
pub struct JobExecutorHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
    stats: Arc<Mutex<ExecutorStats>>,
}

impl JobExecutorHandle {
    /// Request graceful shutdown and wait for the worker thread.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }

    /// Get current executor statistics.
    pub fn stats(&self) -> ExecutorStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// Executor runtime statistics.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ExecutorStats {
    pub jobs_processed: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub uptime_secs: u64,
}

/// Background job executor.
///
/// Claims pending jobs from a store and runs each one exactly once with the
/// handler registered under its name.
pub struct JobExecutor<S: JobStore> {
    store: S,
    handlers: HashMap<String, JobHandler>,
}

impl<S: JobStore + 'static> JobExecutor<S> {
    /// Create a new executor with the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a task name.
    pub fn register_handler<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Job) -> JobResult + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// Run one claimed job and record the outcome in the store.
    pub fn execute_one(&self, job: &mut Job) -> Result<(), JobExecutionError> {
        let started = Utc::now();

        let Some(handler) = self.handlers.get(&job.name) else {
            let err = JobExecutionError::NoHandler(job.name.clone());
            warn!(job_id = %job.id, task = %job.name, "no handler for job");
            job.mark_failed(err.to_string(), started);
            self.store.update(job)?;
            return Err(err);
        };

        match handler(&*job) {
            JobResult::Success => {
                job.mark_completed(started);
                self.store.update(job)?;
                debug!(job_id = %job.id, task = %job.name, "job completed");
                Ok(())
            }
            JobResult::Failure(error) => {
                job.mark_failed(error.clone(), started);
                self.store.update(job)?;
                warn!(job_id = %job.id, task = %job.name, error = %error, "job failed");
                Err(JobExecutionError::Failed(error))
            }
        }
    }

    /// Drain the queue on the calling thread. Returns how many jobs ran.
    ///
    /// Individual job failures are recorded on the job and do not stop the
    /// drain; only store failures while claiming are returned. A job whose
    /// outcome could not be recorded is logged and left as the store has it.
    pub fn run_pending(&self) -> Result<usize, JobStoreError> {
        let mut processed = 0;
        while let Some(mut job) = self.store.claim_next()? {
            if let Err(JobExecutionError::Store(e)) = self.execute_one(&mut job) {
                error!(job_id = %job.id, task = %job.name, error = %e, "failed to record job outcome");
            }
            processed += 1;
        }
        Ok(processed)
    }

    /// Spawn the executor in a background thread.
    pub fn spawn(self, config: JobExecutorConfig) -> io::Result<JobExecutorHandle>
    where
        S: Send,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let stats = Arc::new(Mutex::new(ExecutorStats::default()));
        let stats_clone = stats.clone();

        let join = thread::Builder::new()
            .name(config.name.clone())
            .spawn(move || {
                executor_loop(self, config, shutdown_rx, stats_clone);
            })?;

        Ok(JobExecutorHandle {
            shutdown: shutdown_tx,
            join: Some(join),
            stats,
        })
    }
}

fn executor_loop<S: JobStore + 'static>(
    executor: JobExecutor<S>,
    config: JobExecutorConfig,
    shutdown_rx: mpsc::Receiver<()>,
    stats: Arc<Mutex<ExecutorStats>>,
) {
    info!(executor = %config.name, "job executor started");
    let start_time = Instant::now();

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        if let Ok(mut s) = stats.lock() {
            s.uptime_secs = start_time.elapsed().as_secs();
        }

        match executor.store.claim_next() {
            Ok(Some(mut job)) => {
                debug!(executor = %config.name, job_id = %job.id, task = %job.name, "claimed job");

                let result = executor.execute_one(&mut job);

                if let Ok(mut s) = stats.lock() {
                    s.jobs_processed += 1;
                    match result {
                        Ok(()) => s.jobs_succeeded += 1,
                        Err(_) => s.jobs_failed += 1,
                    }
                }
            }
            Ok(None) => thread::sleep(config.poll_interval),
            Err(e) => {
                error!(executor = %config.name, error = %e, "failed to claim job");
                thread::sleep(config.poll_interval);
            }
        }
    }

    info!(executor = %config.name, "job executor stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::store::{InMemoryJobStore, JobQueue};
    use crate::types::JobStatus;

    #[test]
    fn execute_successful_job() {
        let store = InMemoryJobStore::arc();
        let mut executor = JobExecutor::new(store.clone());
        executor.register_handler("test", |_job| JobResult::Success);

        store.enqueue("test").unwrap();

        let mut claimed = store.claim_next().unwrap().unwrap();
        assert!(executor.execute_one(&mut claimed).is_ok());
        assert!(matches!(claimed.status, JobStatus::Completed));

        let stored = store.get(claimed.id).unwrap().unwrap();
        assert!(matches!(stored.status, JobStatus::Completed));
    }

    #[test]
    fn failing_job_is_not_retried() {
        let store = InMemoryJobStore::arc();
        let mut executor = JobExecutor::new(store.clone());
        executor.register_handler("test", |_job| JobResult::Failure("test error".to_string()));

        store.enqueue("test").unwrap();

        assert_eq!(executor.run_pending().unwrap(), 1);
        assert_eq!(executor.run_pending().unwrap(), 0);
        assert_eq!(store.stats().unwrap().failed, 1);
    }

    #[test]
    fn unknown_task_fails_the_job() {
        let store = InMemoryJobStore::arc();
        let executor = JobExecutor::new(store.clone());
        store.enqueue("nobody_listens").unwrap();

        let mut claimed = store.claim_next().unwrap().unwrap();
        let err = executor.execute_one(&mut claimed).unwrap_err();

        assert_eq!(err, JobExecutionError::NoHandler("nobody_listens".to_string()));
        assert!(matches!(claimed.status, JobStatus::Failed { .. }));
    }

    #[test]
    fn run_pending_runs_each_job_once() {
        let store = InMemoryJobStore::arc();
        let mut executor = JobExecutor::new(store.clone());
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        executor.register_handler("count", move |_job| {
            counter.fetch_add(1, Ordering::SeqCst);
            JobResult::Success
        });

        store.enqueue("count").unwrap();
        store.enqueue("count").unwrap();

        assert_eq!(executor.run_pending().unwrap(), 2);
        assert_eq!(executor.run_pending().unwrap(), 0);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    /// Delegates to an in-memory store but refuses to record finished jobs.
    struct UnwritableOutcomes(Arc<InMemoryJobStore>);

    impl JobStore for UnwritableOutcomes {
        fn insert(&self, job: Job) -> Result<crate::types::JobId, JobStoreError> {
            self.0.insert(job)
        }

        fn get(&self, job_id: crate::types::JobId) -> Result<Option<Job>, JobStoreError> {
            self.0.get(job_id)
        }

        fn update(&self, job: &Job) -> Result<(), JobStoreError> {
            if job.status.is_terminal() {
                return Err(JobStoreError::Storage("disk full".to_string()));
            }
            self.0.update(job)
        }

        fn claim_next(&self) -> Result<Option<Job>, JobStoreError> {
            self.0.claim_next()
        }

        fn list_by_status(
            &self,
            status: Option<JobStatus>,
            limit: usize,
        ) -> Result<Vec<Job>, JobStoreError> {
            self.0.list_by_status(status, limit)
        }

        fn stats(&self) -> Result<crate::store::JobStats, JobStoreError> {
            self.0.stats()
        }
    }

    #[test]
    fn unrecorded_outcome_does_not_stop_the_drain() {
        let inner = InMemoryJobStore::arc();
        let mut executor = JobExecutor::new(UnwritableOutcomes(inner.clone()));
        executor.register_handler("test", |_job| JobResult::Success);

        inner.enqueue("test").unwrap();
        inner.enqueue("test").unwrap();

        let mut claimed = executor.store.claim_next().unwrap().unwrap();
        assert_eq!(
            executor.execute_one(&mut claimed).unwrap_err(),
            JobExecutionError::Store(JobStoreError::Storage("disk full".to_string()))
        );

        assert_eq!(executor.run_pending().unwrap(), 1);
        assert_eq!(executor.run_pending().unwrap(), 0);
        assert_eq!(inner.stats().unwrap().running, 2);
    }

    #[test]
    fn spawned_executor_picks_up_jobs() {
        let store = InMemoryJobStore::arc();
        let mut executor = JobExecutor::new(store.clone());
        executor.register_handler("test", |_job| JobResult::Success);

        let handle = executor
            .spawn(
                JobExecutorConfig::default()
                    .with_name("test-executor")
                    .with_poll_interval(Duration::from_millis(5)),
            )
            .unwrap();

        store.enqueue("test").unwrap();

        let mut done = false;
        for _ in 0..200 {
            if handle.stats().jobs_succeeded == 1 {
                done = true;
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        handle.shutdown();
        assert!(done, "job was not executed in time");
        assert_eq!(store.stats().unwrap().completed, 1);
    }
}
