//! Binary job payload.
//!
//! Jobs store everything except their type and creation time as a protocol
//! buffer message. Fields are optional or repeated with zero/empty defaults,
//! so new fields can be added without breaking jobs that are already queued:
//! older readers skip unknown tags and newer readers default missing ones.

use prost::Message;

use super::entities::{EpisodeInfo, JobAction, JobRecord};
use crate::shared::errors::{AppError, AppResult};

#[derive(Clone, PartialEq, Message)]
pub struct JobPayload {
    #[prost(int64, tag = "1")]
    pub show_tmdb_id: i64,
    #[prost(int32, tag = "2")]
    pub flag_value: i32,
    #[prost(message, repeated, tag = "3")]
    pub episodes: Vec<EpisodePayload>,
    #[prost(int64, tag = "4")]
    pub movie_tmdb_id: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct EpisodePayload {
    #[prost(int32, tag = "1")]
    pub season: i32,
    #[prost(int32, tag = "2")]
    pub number: i32,
    #[prost(int32, tag = "3")]
    pub plays: i32,
}

/// Encode the non-key fields of a record.
pub fn serialize(record: &JobRecord) -> Vec<u8> {
    let (show_tmdb_id, movie_tmdb_id) = if record.action.is_episode_action() {
        (record.target_id, 0)
    } else {
        (0, record.target_id)
    };

    let payload = JobPayload {
        show_tmdb_id,
        flag_value: record.flag_value,
        episodes: record
            .episodes
            .iter()
            .map(|e| EpisodePayload {
                season: e.season,
                number: e.number,
                plays: e.plays,
            })
            .collect(),
        movie_tmdb_id,
    };

    payload.encode_to_vec()
}

/// Decode a payload back into a record.
///
/// Never panics; every malformed input is reported as `CorruptPayload`.
pub fn deserialize(type_id: i32, created_at_ms: i64, bytes: &[u8]) -> AppResult<JobRecord> {
    let action = JobAction::from_id(type_id)
        .ok_or_else(|| AppError::CorruptPayload(format!("unknown job type id {}", type_id)))?;

    let payload = JobPayload::decode(bytes)?;

    let episodes = payload
        .episodes
        .iter()
        .map(|e| {
            if e.season < 0 || e.number < 0 || e.plays < 0 {
                Err(AppError::CorruptPayload(format!(
                    "negative episode field in {}x{} (plays {})",
                    e.season, e.number, e.plays
                )))
            } else {
                Ok(EpisodeInfo::new(e.season, e.number, e.plays))
            }
        })
        .collect::<AppResult<Vec<_>>>()?;

    if action.is_episode_action() {
        if payload.show_tmdb_id <= 0 {
            return Err(AppError::CorruptPayload(format!(
                "{} job without a show id",
                action
            )));
        }
        if episodes.is_empty() {
            return Err(AppError::CorruptPayload(format!(
                "{} job for show {} lists no episodes",
                action, payload.show_tmdb_id
            )));
        }
        let flag_valid = match action {
            JobAction::EpisodeWatchedFlagChange => (0..=2).contains(&payload.flag_value),
            _ => (0..=1).contains(&payload.flag_value),
        };
        if !flag_valid {
            return Err(AppError::CorruptPayload(format!(
                "invalid flag value {} for {}",
                payload.flag_value, action
            )));
        }

        Ok(JobRecord::episodes(
            action,
            payload.show_tmdb_id,
            payload.flag_value,
            episodes,
            created_at_ms,
        ))
    } else {
        if payload.movie_tmdb_id <= 0 {
            return Err(AppError::CorruptPayload(format!(
                "{} job without a movie id",
                action
            )));
        }

        let mut record = JobRecord::movie(action, payload.movie_tmdb_id, created_at_ms);
        record.flag_value = payload.flag_value;
        Ok(record)
    }
}
