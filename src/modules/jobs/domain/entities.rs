/// Domain entities for the network job queue
///
/// A job is the durable record of one user action (mark watched, add to
/// collection, ...) that has already been applied locally and still has to
/// reach the remote backends.
use crate::shared::errors::AppResult;
use serde::{Deserialize, Serialize};

use super::payload;

/// Kind of change a job carries. The id is persisted as `type_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    EpisodeCollectionChange,
    EpisodeWatchedFlagChange,
    MovieCollectionAdd,
    MovieCollectionRemove,
    MovieWatchlistAdd,
    MovieWatchlistRemove,
    MovieWatchedSet,
    MovieWatchedRemove,
}

impl JobAction {
    pub const ALL: [JobAction; 8] = [
        JobAction::EpisodeCollectionChange,
        JobAction::EpisodeWatchedFlagChange,
        JobAction::MovieCollectionAdd,
        JobAction::MovieCollectionRemove,
        JobAction::MovieWatchlistAdd,
        JobAction::MovieWatchlistRemove,
        JobAction::MovieWatchedSet,
        JobAction::MovieWatchedRemove,
    ];

    /// Stable id stored in the `type_id` column. Never renumber.
    pub fn id(self) -> i32 {
        match self {
            JobAction::EpisodeCollectionChange => 1,
            JobAction::EpisodeWatchedFlagChange => 2,
            JobAction::MovieCollectionAdd => 3,
            JobAction::MovieCollectionRemove => 4,
            JobAction::MovieWatchlistAdd => 5,
            JobAction::MovieWatchlistRemove => 6,
            JobAction::MovieWatchedSet => 7,
            JobAction::MovieWatchedRemove => 8,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }

    pub fn is_episode_action(self) -> bool {
        matches!(
            self,
            JobAction::EpisodeCollectionChange | JobAction::EpisodeWatchedFlagChange
        )
    }

    pub fn is_movie_action(self) -> bool {
        !self.is_episode_action()
    }
}

impl std::fmt::Display for JobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobAction::EpisodeCollectionChange => write!(f, "episode_collection_change"),
            JobAction::EpisodeWatchedFlagChange => write!(f, "episode_watched_flag_change"),
            JobAction::MovieCollectionAdd => write!(f, "movie_collection_add"),
            JobAction::MovieCollectionRemove => write!(f, "movie_collection_remove"),
            JobAction::MovieWatchlistAdd => write!(f, "movie_watchlist_add"),
            JobAction::MovieWatchlistRemove => write!(f, "movie_watchlist_remove"),
            JobAction::MovieWatchedSet => write!(f, "movie_watched_set"),
            JobAction::MovieWatchedRemove => write!(f, "movie_watched_remove"),
        }
    }
}

impl std::str::FromStr for JobAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.to_string() == s.to_lowercase())
            .ok_or_else(|| format!("Invalid job action: {}", s))
    }
}

/// Watched state of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeFlag {
    Unwatched,
    Watched,
    Skipped,
}

impl EpisodeFlag {
    pub fn value(self) -> i32 {
        match self {
            EpisodeFlag::Unwatched => 0,
            EpisodeFlag::Watched => 1,
            EpisodeFlag::Skipped => 2,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(EpisodeFlag::Unwatched),
            1 => Some(EpisodeFlag::Watched),
            2 => Some(EpisodeFlag::Skipped),
            _ => None,
        }
    }
}

/// One episode touched by a job, identified the way remote services do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeInfo {
    pub season: i32,
    pub number: i32,
    pub plays: i32,
}

impl EpisodeInfo {
    pub fn new(season: i32, number: i32, plays: i32) -> Self {
        Self {
            season,
            number,
            plays,
        }
    }
}

/// Immutable description of one user-initiated change.
///
/// `target_id` is the show TMDB id for episode actions and the movie TMDB id
/// for movie actions. `flag_value` holds an [`EpisodeFlag`] value for watched
/// changes and `0`/`1` for collection membership. `MovieWatchedSet` carries
/// the movie's play count after the change; other movie actions leave it `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub action: JobAction,
    pub target_id: i64,
    pub flag_value: i32,
    pub episodes: Vec<EpisodeInfo>,
    pub created_at_ms: i64,
}

impl JobRecord {
    /// Episode job for one or many episodes of a show.
    pub fn episodes(
        action: JobAction,
        show_tmdb_id: i64,
        flag_value: i32,
        episodes: Vec<EpisodeInfo>,
        created_at_ms: i64,
    ) -> Self {
        Self {
            action,
            target_id: show_tmdb_id,
            flag_value,
            episodes,
            created_at_ms,
        }
    }

    /// Movie-only job.
    pub fn movie(action: JobAction, movie_tmdb_id: i64, created_at_ms: i64) -> Self {
        Self {
            action,
            target_id: movie_tmdb_id,
            flag_value: 0,
            episodes: Vec::new(),
            created_at_ms,
        }
    }

    /// Watched flag of an episode watched change.
    pub fn episode_flag(&self) -> Option<EpisodeFlag> {
        if self.action == JobAction::EpisodeWatchedFlagChange {
            EpisodeFlag::from_value(self.flag_value)
        } else {
            None
        }
    }

    /// Collection membership of an episode collection change.
    pub fn is_collected(&self) -> bool {
        self.action == JobAction::EpisodeCollectionChange && self.flag_value == 1
    }
}

/// Persisted form of a job as stored in the `jobs` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQueueEntry {
    pub id: i64,
    pub created_at_ms: i64,
    pub type_id: i32,
    pub payload: Vec<u8>,
}

impl JobQueueEntry {
    /// Decode the entry. Fails with `CorruptPayload` for unknown types or
    /// undecodable payloads.
    pub fn to_record(&self) -> AppResult<JobRecord> {
        payload::deserialize(self.type_id, self.created_at_ms, &self.payload)
    }
}
