//! Job storage implementations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::types::{Job, JobId, JobStatus};

/// Schedules named tasks for deferred execution.
///
/// This is all a producer needs: it never waits for the task and never sees
/// its outcome.
pub trait JobQueue: Send + Sync {
    fn enqueue(&self, task_name: &str) -> Result<JobId, JobStoreError>;
}

impl<Q> JobQueue for Arc<Q>
where
    Q: JobQueue + ?Sized,
{
    fn enqueue(&self, task_name: &str) -> Result<JobId, JobStoreError> {
        (**self).enqueue(task_name)
    }
}

/// Job store abstraction.
pub trait JobStore: Send + Sync {
    /// Store a new job.
    fn insert(&self, job: Job) -> Result<JobId, JobStoreError>;

    /// Get a job by ID.
    fn get(&self, job_id: JobId) -> Result<Option<Job>, JobStoreError>;

    /// Update a job.
    fn update(&self, job: &Job) -> Result<(), JobStoreError>;

    /// Claim the oldest pending job, marking it running.
    /// Returns None if no jobs are available.
    fn claim_next(&self) -> Result<Option<Job>, JobStoreError>;

    /// List jobs, optionally filtered by status kind, oldest first.
    fn list_by_status(
        &self,
        status: Option<JobStatus>,
        limit: usize,
    ) -> Result<Vec<Job>, JobStoreError>;

    /// Get job statistics.
    fn stats(&self) -> Result<JobStats, JobStoreError>;
}

impl<S> JobStore for Arc<S>
where
    S: JobStore + ?Sized,
{
    fn insert(&self, job: Job) -> Result<JobId, JobStoreError> {
        (**self).insert(job)
    }

    fn get(&self, job_id: JobId) -> Result<Option<Job>, JobStoreError> {
        (**self).get(job_id)
    }

    fn update(&self, job: &Job) -> Result<(), JobStoreError> {
        (**self).update(job)
    }

    fn claim_next(&self) -> Result<Option<Job>, JobStoreError> {
        (**self).claim_next()
    }

    fn list_by_status(
        &self,
        status: Option<JobStatus>,
        limit: usize,
    ) -> Result<Vec<Job>, JobStoreError> {
        (**self).list_by_status(status, limit)
    }

    fn stats(&self) -> Result<JobStats, JobStoreError> {
        (**self).stats()
    }
}

/// Job store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job already exists: {0}")]
    AlreadyExists(JobId),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Job statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct JobStats {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

/// In-memory job store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn poisoned() -> JobStoreError {
        JobStoreError::Storage("job store lock poisoned".to_string())
    }
}

impl JobQueue for InMemoryJobStore {
    fn enqueue(&self, task_name: &str) -> Result<JobId, JobStoreError> {
        let id = self.insert(Job::new(task_name))?;
        debug!(job_id = %id, task = task_name, "job enqueued");
        Ok(id)
    }
}

impl JobStore for InMemoryJobStore {
    fn insert(&self, job: Job) -> Result<JobId, JobStoreError> {
        let mut jobs = self.jobs.write().map_err(|_| Self::poisoned())?;
        if jobs.contains_key(&job.id) {
            return Err(JobStoreError::AlreadyExists(job.id));
        }
        let id = job.id;
        jobs.insert(id, job);
        Ok(id)
    }

    fn get(&self, job_id: JobId) -> Result<Option<Job>, JobStoreError> {
        let jobs = self.jobs.read().map_err(|_| Self::poisoned())?;
        Ok(jobs.get(&job_id).cloned())
    }

    fn update(&self, job: &Job) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().map_err(|_| Self::poisoned())?;
        if !jobs.contains_key(&job.id) {
            return Err(JobStoreError::NotFound(job.id));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    fn claim_next(&self) -> Result<Option<Job>, JobStoreError> {
        let mut jobs = self.jobs.write().map_err(|_| Self::poisoned())?;

        // FIFO by creation time; the id (UUIDv7) breaks ties.
        let next = jobs
            .values()
            .filter(|j| matches!(j.status, JobStatus::Pending))
            .min_by_key(|j| (j.created_at, j.id.0))
            .map(|j| j.id);

        Ok(next.and_then(|id| {
            jobs.get_mut(&id).map(|job| {
                job.mark_running();
                job.clone()
            })
        }))
    }

    fn list_by_status(
        &self,
        status: Option<JobStatus>,
        limit: usize,
    ) -> Result<Vec<Job>, JobStoreError> {
        let jobs = self.jobs.read().map_err(|_| Self::poisoned())?;
        let mut result: Vec<_> = jobs
            .values()
            .filter(|j| {
                status.as_ref().map_or(true, |s| {
                    std::mem::discriminant(&j.status) == std::mem::discriminant(s)
                })
            })
            .cloned()
            .collect();

        result.sort_by_key(|j| (j.created_at, j.id.0));
        result.truncate(limit);
        Ok(result)
    }

    fn stats(&self) -> Result<JobStats, JobStoreError> {
        let jobs = self.jobs.read().map_err(|_| Self::poisoned())?;
        let mut stats = JobStats::default();
        for job in jobs.values() {
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed { .. } => stats.failed += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_creates_pending_job() {
        let store = InMemoryJobStore::new();
        let id = store.enqueue("stock_category_sync").unwrap();

        let job = store.get(id).unwrap().unwrap();
        assert_eq!(job.name, "stock_category_sync");
        assert!(matches!(job.status, JobStatus::Pending));
    }

    #[test]
    fn claim_next_is_fifo_and_marks_running() {
        let store = InMemoryJobStore::new();
        let first = store.enqueue("a").unwrap();
        let second = store.enqueue("b").unwrap();

        let claimed = store.claim_next().unwrap().unwrap();
        assert_eq!(claimed.id, first);
        assert!(matches!(claimed.status, JobStatus::Running));

        let claimed = store.claim_next().unwrap().unwrap();
        assert_eq!(claimed.id, second);

        assert!(store.claim_next().unwrap().is_none());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryJobStore::new();
        let job = Job::new("a");
        store.insert(job.clone()).unwrap();
        assert_eq!(
            store.insert(job.clone()).unwrap_err(),
            JobStoreError::AlreadyExists(job.id)
        );
    }

    #[test]
    fn update_unknown_job_fails() {
        let store = InMemoryJobStore::new();
        let job = Job::new("a");
        assert_eq!(store.update(&job).unwrap_err(), JobStoreError::NotFound(job.id));
    }

    #[test]
    fn stats_tracking() {
        let store = InMemoryJobStore::arc();
        store.enqueue("a").unwrap();
        store.enqueue("b").unwrap();
        store.claim_next().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.running, 1);

        let pending = store.list_by_status(Some(JobStatus::Pending), 10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "b");
    }
}
