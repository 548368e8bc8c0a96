/// Diesel-based implementation of LibraryRepository
use crate::modules::jobs::domain::entities::{EpisodeInfo, JobAction, JobQueueEntry, JobRecord};
use crate::modules::jobs::infrastructure::JobStoreImpl;
use crate::modules::library::domain::entities::{Episode, Movie, Show};
use crate::modules::library::domain::flag_job::{EpisodeScope, FlagJob};
use crate::modules::library::domain::repository::LibraryRepository;
use crate::modules::library::infrastructure::models::{
    EpisodeFlagsChangeset, EpisodeModel, MovieModel, ShowModel,
};
use crate::schema::{episodes, movies, shows};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::database::{DbConnection, DbPool};
use crate::shared::utils::logger::LogContext;
use crate::shared::utils::Validator;
use async_trait::async_trait;
use diesel::prelude::*;

pub struct LibraryRepositoryImpl {
    pool: DbPool,
}

impl LibraryRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> AppResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
    }

    fn load_scope(conn: &mut SqliteConnection, scope: EpisodeScope) -> AppResult<Vec<Episode>> {
        let models: Vec<EpisodeModel> = match scope {
            EpisodeScope::Single(id) => {
                let episode = episodes::table
                    .find(id)
                    .select(EpisodeModel::as_select())
                    .first(conn)
                    .optional()?
                    .ok_or_else(|| AppError::NotFound(format!("Episode {} not found", id)))?;
                vec![episode]
            }
            EpisodeScope::Season {
                show_tmdb_id,
                season,
            } => {
                Self::require_show(conn, show_tmdb_id)?;
                episodes::table
                    .filter(episodes::show_tmdb_id.eq(show_tmdb_id))
                    .filter(episodes::season.eq(season))
                    .order(episodes::number.asc())
                    .select(EpisodeModel::as_select())
                    .load(conn)?
            }
            EpisodeScope::Show(show_tmdb_id) => {
                Self::require_show(conn, show_tmdb_id)?;
                episodes::table
                    .filter(episodes::show_tmdb_id.eq(show_tmdb_id))
                    .filter(episodes::season.gt(0))
                    .order((episodes::season.asc(), episodes::number.asc()))
                    .select(EpisodeModel::as_select())
                    .load(conn)?
            }
        };

        Ok(models.into_iter().map(Episode::from).collect())
    }

    fn require_show(conn: &mut SqliteConnection, show_tmdb_id: i64) -> AppResult<()> {
        let exists: bool = diesel::select(diesel::dsl::exists(
            shows::table.filter(shows::tmdb_id.eq(show_tmdb_id)),
        ))
        .get_result(conn)?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Show {} not found", show_tmdb_id)))
        }
    }

    fn apply_episodes(
        conn: &mut SqliteConnection,
        job: &FlagJob,
        scope: EpisodeScope,
        created_at_ms: i64,
    ) -> AppResult<Option<JobRecord>> {
        let mut touched = Vec::new();
        let mut show_tmdb_id = None;

        for mut episode in Self::load_scope(conn, scope)? {
            if !job.changes(&episode) {
                continue;
            }
            job.apply_to_episode(&mut episode);

            diesel::update(episodes::table.find(episode.id))
                .set(&EpisodeFlagsChangeset::from(&episode))
                .execute(conn)?;

            show_tmdb_id = Some(episode.show_tmdb_id);
            touched.push(EpisodeInfo::new(episode.season, episode.number, episode.plays));
        }

        let Some(show_tmdb_id) = show_tmdb_id else {
            return Ok(None);
        };

        touched.sort_by_key(|e| (e.season, e.number));

        Ok(Some(JobRecord::episodes(
            job.job_action(),
            show_tmdb_id,
            job.flag_value(),
            touched,
            created_at_ms,
        )))
    }

    fn apply_in(
        conn: &mut SqliteConnection,
        job: &FlagJob,
        created_at_ms: i64,
    ) -> AppResult<Option<JobRecord>> {
        if let Some(scope) = job.episode_scope() {
            Self::apply_episodes(conn, job, scope, created_at_ms)
        } else if let Some(movie_tmdb_id) = job.movie_tmdb_id() {
            Self::apply_movie(conn, job, movie_tmdb_id, created_at_ms)
        } else {
            Err(AppError::InvalidInput(format!(
                "Flag job has no target: {:?}",
                job
            )))
        }
    }

    fn apply_movie(
        conn: &mut SqliteConnection,
        job: &FlagJob,
        movie_tmdb_id: i64,
        created_at_ms: i64,
    ) -> AppResult<Option<JobRecord>> {
        let model: MovieModel = movies::table
            .find(movie_tmdb_id)
            .select(MovieModel::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_tmdb_id)))?;

        let mut movie = Movie::from(model);
        job.apply_to_movie(&mut movie);

        diesel::update(movies::table.find(movie_tmdb_id))
            .set(&MovieModel::from(&movie))
            .execute(conn)?;

        let action = job.job_action();
        let mut record = JobRecord::movie(action, movie_tmdb_id, created_at_ms);
        // Watched movies carry their new play count so replays stay absolute
        if action == JobAction::MovieWatchedSet {
            record.flag_value = movie.plays;
        }
        Ok(Some(record))
    }
}

#[async_trait]
impl LibraryRepository for LibraryRepositoryImpl {
    async fn upsert_show(&self, show: &Show) -> AppResult<Show> {
        Validator::validate_tmdb_id(show.tmdb_id)?;
        Validator::validate_title(&show.title)?;

        let mut conn = self.get_conn()?;
        let model = ShowModel::from(show);

        let saved: ShowModel = diesel::insert_into(shows::table)
            .values(&model)
            .on_conflict(shows::tmdb_id)
            .do_update()
            .set(&model)
            .returning(ShowModel::as_returning())
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to save show: {}", e)))?;

        Ok(saved.into())
    }

    async fn upsert_episode(&self, episode: &Episode) -> AppResult<Episode> {
        Validator::validate_tmdb_id(episode.show_tmdb_id)?;
        Validator::validate_season(episode.season)?;
        Validator::validate_episode_number(episode.number)?;
        Validator::validate_plays(episode.plays)?;

        let mut conn = self.get_conn()?;
        let model = EpisodeModel::from(episode);

        let saved: EpisodeModel = diesel::insert_into(episodes::table)
            .values(&model)
            .on_conflict(episodes::id)
            .do_update()
            .set(&model)
            .returning(EpisodeModel::as_returning())
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to save episode: {}", e)))?;

        Ok(saved.into())
    }

    async fn upsert_movie(&self, movie: &Movie) -> AppResult<Movie> {
        Validator::validate_tmdb_id(movie.tmdb_id)?;
        Validator::validate_title(&movie.title)?;
        Validator::validate_plays(movie.plays)?;

        let mut conn = self.get_conn()?;
        let model = MovieModel::from(movie);

        let saved: MovieModel = diesel::insert_into(movies::table)
            .values(&model)
            .on_conflict(movies::tmdb_id)
            .do_update()
            .set(&model)
            .returning(MovieModel::as_returning())
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to save movie: {}", e)))?;

        Ok(saved.into())
    }

    async fn find_show(&self, tmdb_id: i64) -> AppResult<Option<Show>> {
        let mut conn = self.get_conn()?;

        let show: Option<ShowModel> = shows::table
            .find(tmdb_id)
            .select(ShowModel::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(show.map(Show::from))
    }

    async fn find_episode(&self, id: i64) -> AppResult<Option<Episode>> {
        let mut conn = self.get_conn()?;

        let episode: Option<EpisodeModel> = episodes::table
            .find(id)
            .select(EpisodeModel::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(episode.map(Episode::from))
    }

    async fn episodes_for_show(&self, show_tmdb_id: i64) -> AppResult<Vec<Episode>> {
        let mut conn = self.get_conn()?;

        let models: Vec<EpisodeModel> = episodes::table
            .filter(episodes::show_tmdb_id.eq(show_tmdb_id))
            .order((episodes::season.asc(), episodes::number.asc()))
            .select(EpisodeModel::as_select())
            .load(&mut conn)?;

        Ok(models.into_iter().map(Episode::from).collect())
    }

    async fn find_movie(&self, tmdb_id: i64) -> AppResult<Option<Movie>> {
        let mut conn = self.get_conn()?;

        let movie: Option<MovieModel> = movies::table
            .find(tmdb_id)
            .select(MovieModel::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(movie.map(Movie::from))
    }

    async fn apply(&self, job: &FlagJob, created_at_ms: i64) -> AppResult<Option<JobRecord>> {
        let start = std::time::Instant::now();
        let mut conn = self.get_conn()?;

        let record =
            conn.immediate_transaction(|conn| Self::apply_in(conn, job, created_at_ms))?;

        LogContext::db_operation(
            "APPLY",
            "library",
            Some(start.elapsed().as_millis() as u64),
        );

        Ok(record)
    }

    async fn apply_and_enqueue(
        &self,
        job: &FlagJob,
        created_at_ms: i64,
    ) -> AppResult<Option<JobQueueEntry>> {
        let start = std::time::Instant::now();
        let mut conn = self.get_conn()?;

        let entry = conn
            .immediate_transaction(|conn| {
                match Self::apply_in(conn, job, created_at_ms)? {
                    Some(record) => JobStoreImpl::enqueue_in(conn, &record).map(Some),
                    None => Ok(None),
                }
            })
            .map_err(|e| {
                LogContext::error_with_context(&e, "Failed to apply and queue flag job");
                e
            })?;

        LogContext::db_operation(
            "APPLY+INSERT",
            "library,jobs",
            Some(start.elapsed().as_millis() as u64),
        );

        Ok(entry)
    }
}
