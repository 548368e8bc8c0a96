//! Cloud sync wire format.
//!
//! Every field is an absolute value and omitted when the job does not
//! change it, so applying the same body twice leaves the same state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEpisodesRequest {
    pub show_tmdb_id: i64,
    pub episodes: Vec<CloudEpisode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEpisode {
    pub season: i32,
    pub number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched_flag: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plays: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_in_collection: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudMoviesRequest {
    pub movies: Vec<CloudMovie>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudMovie {
    pub tmdb_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_in_collection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_in_watchlist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_watched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plays: Option<i32>,
}
