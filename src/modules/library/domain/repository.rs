use super::entities::{Episode, Movie, Show};
use super::flag_job::FlagJob;
use crate::modules::jobs::domain::entities::{JobQueueEntry, JobRecord};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn upsert_show(&self, show: &Show) -> AppResult<Show>;

    async fn upsert_episode(&self, episode: &Episode) -> AppResult<Episode>;

    async fn upsert_movie(&self, movie: &Movie) -> AppResult<Movie>;

    async fn find_show(&self, tmdb_id: i64) -> AppResult<Option<Show>>;

    async fn find_episode(&self, id: i64) -> AppResult<Option<Episode>>;

    /// Episodes of a show ordered by season, then number.
    async fn episodes_for_show(&self, show_tmdb_id: i64) -> AppResult<Vec<Episode>>;

    async fn find_movie(&self, tmdb_id: i64) -> AppResult<Option<Movie>>;

    /// Apply a user action in one transaction and describe the change as a
    /// job record. Returns `None` when the action matched nothing to change.
    ///
    /// Unknown episodes or movies fail with `NotFound` and change nothing.
    async fn apply(&self, job: &FlagJob, created_at_ms: i64) -> AppResult<Option<JobRecord>>;

    /// Like `apply`, and queue the resulting record in the same
    /// transaction. Either both the local change and its job commit, or
    /// neither does.
    async fn apply_and_enqueue(
        &self,
        job: &FlagJob,
        created_at_ms: i64,
    ) -> AppResult<Option<JobQueueEntry>>;
}
