/// Repository trait for the persistent job queue
///
/// The store exclusively owns persisted rows; readers only ever see
/// committed jobs.
use crate::modules::jobs::domain::entities::{JobQueueEntry, JobRecord};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// Position after the last entry a drain pass has seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct JobCursor {
    pub created_at_ms: i64,
    pub id: i64,
}

impl From<&JobQueueEntry> for JobCursor {
    fn from(entry: &JobQueueEntry) -> Self {
        Self {
            created_at_ms: entry.created_at_ms,
            id: entry.id,
        }
    }
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a job. The stored `created_at_ms` may be bumped forward so it
    /// stays unique and later than every queued job.
    async fn enqueue(&self, record: &JobRecord) -> AppResult<JobQueueEntry>;

    /// Up to `limit` entries after `cursor`, oldest first.
    async fn pending_after(
        &self,
        cursor: Option<JobCursor>,
        limit: usize,
    ) -> AppResult<Vec<JobQueueEntry>>;

    /// Delete the given jobs in one transaction. Unknown ids are ignored.
    async fn remove(&self, ids: &[i64]) -> AppResult<usize>;

    async fn clear_all(&self) -> AppResult<usize>;

    async fn count(&self) -> AppResult<i64>;

    async fn get_by_id(&self, id: i64) -> AppResult<Option<JobQueueEntry>>;

    /// Get queue statistics
    async fn get_statistics(&self) -> AppResult<JobStatistics>;
}

/// Job queue statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStatistics {
    pub episode_jobs: i64,
    pub movie_jobs: i64,
    pub total_count: i64,
    pub oldest_created_at_ms: Option<i64>,
}
