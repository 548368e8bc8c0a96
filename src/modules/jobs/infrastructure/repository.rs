/// Diesel-based implementation of JobStore
///
/// Every write runs in an immediate SQLite transaction, so concurrent
/// writers are serialized by the database and `created_at_ms` stays unique.
use crate::modules::jobs::domain::entities::{JobAction, JobQueueEntry, JobRecord};
use crate::modules::jobs::domain::payload;
use crate::modules::jobs::domain::repository::{JobCursor, JobStatistics, JobStore};
use crate::modules::jobs::infrastructure::models::{JobModel, NewJob};
use crate::schema::jobs;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::database::{DbConnection, DbPool};
use crate::shared::utils::logger::LogContext;
use async_trait::async_trait;
use diesel::dsl::{max, min};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Collisions tolerated before giving up on a unique timestamp.
const MAX_TIMESTAMP_BUMPS: usize = 64;
/// Stay well below SQLite's bound-parameter limit.
const DELETE_CHUNK_SIZE: usize = 500;

/// Helper struct for COUNT queries
#[derive(QueryableByName)]
struct CountResult {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

pub struct JobStoreImpl {
    pool: DbPool,
}

impl JobStoreImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get database connection from pool
    fn get_conn(&self) -> AppResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
    }

    /// Queue a record on a connection the caller already holds, inside the
    /// caller's transaction. Used when a local change and its job must
    /// commit together.
    pub(crate) fn enqueue_in(
        conn: &mut SqliteConnection,
        record: &JobRecord,
    ) -> AppResult<JobQueueEntry> {
        let bytes = payload::serialize(record);
        let inserted = Self::insert_unique(conn, record, &bytes)?;

        if inserted.created_at_ms != record.created_at_ms {
            log::debug!(
                "Job {} timestamp moved from {} to {}",
                inserted.id,
                record.created_at_ms,
                inserted.created_at_ms
            );
        }
        Ok(inserted.to_entry())
    }

    fn insert_unique(
        conn: &mut SqliteConnection,
        record: &JobRecord,
        bytes: &[u8],
    ) -> AppResult<JobModel> {
        let newest: Option<i64> = jobs::table
            .select(max(jobs::created_at_ms))
            .first(conn)?;

        let mut created_at_ms = match newest {
            Some(newest) if newest >= record.created_at_ms => newest + 1,
            _ => record.created_at_ms,
        };

        for _ in 0..MAX_TIMESTAMP_BUMPS {
            let new_job = NewJob {
                created_at_ms,
                type_id: record.action.id(),
                payload: bytes,
            };

            match diesel::insert_into(jobs::table)
                .values(&new_job)
                .returning(JobModel::as_returning())
                .get_result(conn)
            {
                Ok(model) => return Ok(model),
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    created_at_ms += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::DatabaseError(format!(
            "No free created_at slot after {} attempts starting at {}",
            MAX_TIMESTAMP_BUMPS, record.created_at_ms
        )))
    }
}

#[async_trait]
impl JobStore for JobStoreImpl {
    async fn enqueue(&self, record: &JobRecord) -> AppResult<JobQueueEntry> {
        let start = std::time::Instant::now();
        let mut conn = self.get_conn()?;

        let entry = conn
            .immediate_transaction(|conn| Self::enqueue_in(conn, record))
            .map_err(|e| {
                LogContext::error_with_context(&e, "Failed to enqueue job");
                e
            })?;

        LogContext::db_operation(
            "INSERT",
            "jobs",
            Some(start.elapsed().as_millis() as u64),
        );

        Ok(entry)
    }

    async fn pending_after(
        &self,
        cursor: Option<JobCursor>,
        limit: usize,
    ) -> AppResult<Vec<JobQueueEntry>> {
        let mut conn = self.get_conn()?;

        let mut query = jobs::table.into_boxed();
        if let Some(cursor) = cursor {
            query = query.filter(
                jobs::created_at_ms.gt(cursor.created_at_ms).or(jobs::created_at_ms
                    .eq(cursor.created_at_ms)
                    .and(jobs::id.gt(cursor.id))),
            );
        }

        let models: Vec<JobModel> = query
            .order((jobs::created_at_ms.asc(), jobs::id.asc()))
            .limit(limit as i64)
            .select(JobModel::as_select())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to load pending jobs: {}", e)))?;

        Ok(models.into_iter().map(JobModel::to_entry).collect())
    }

    async fn remove(&self, ids: &[i64]) -> AppResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;

        let deleted = conn
            .immediate_transaction::<_, DieselError, _>(|conn| {
                let mut deleted = 0;
                for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
                    deleted += diesel::delete(jobs::table.filter(jobs::id.eq_any(chunk)))
                        .execute(conn)?;
                }
                Ok(deleted)
            })
            .map_err(|e| AppError::DatabaseError(format!("Failed to remove jobs: {}", e)))?;

        LogContext::db_operation("DELETE", "jobs", None);
        Ok(deleted)
    }

    async fn clear_all(&self) -> AppResult<usize> {
        let mut conn = self.get_conn()?;

        let deleted = diesel::delete(jobs::table)
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to clear jobs: {}", e)))?;

        Ok(deleted)
    }

    async fn count(&self) -> AppResult<i64> {
        let mut conn = self.get_conn()?;

        jobs::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to count jobs: {}", e)))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<JobQueueEntry>> {
        let mut conn = self.get_conn()?;

        let job: Option<JobModel> = jobs::table
            .find(id)
            .select(JobModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get job by id: {}", e)))?;

        Ok(job.map(JobModel::to_entry))
    }

    async fn get_statistics(&self) -> AppResult<JobStatistics> {
        let mut conn = self.get_conn()?;

        let episode_ids: Vec<String> = JobAction::ALL
            .iter()
            .filter(|action| action.is_episode_action())
            .map(|action| action.id().to_string())
            .collect();

        let episodes: CountResult = diesel::sql_query(format!(
            "SELECT COUNT(*) as count FROM jobs WHERE type_id IN ({})",
            episode_ids.join(", ")
        ))
        .get_result(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to count episode jobs: {}", e)))?;

        let total: CountResult = diesel::sql_query("SELECT COUNT(*) as count FROM jobs")
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to count total: {}", e)))?;

        let oldest: Option<i64> = jobs::table
            .select(min(jobs::created_at_ms))
            .first(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to find oldest job: {}", e)))?;

        Ok(JobStatistics {
            episode_jobs: episodes.count,
            movie_jobs: total.count - episodes.count,
            total_count: total.count,
            oldest_created_at_ms: oldest,
        })
    }
}
