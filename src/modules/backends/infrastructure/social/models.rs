use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<i64>,
}

impl SyncIds {
    pub fn tmdb(id: i64) -> Self {
        Self { tmdb: Some(id) }
    }
}

/// Body of every `/sync/...` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shows: Vec<SyncShow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movies: Vec<SyncMovie>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncShow {
    pub ids: SyncIds,
    pub seasons: Vec<SyncSeason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSeason {
    pub number: i32,
    pub episodes: Vec<SyncEpisode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEpisode {
    pub number: i32,
    /// Set for history additions; RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMovie {
    pub ids: SyncIds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<String>,
}

/// Response of a `/sync/...` call. Only the part that matters for
/// classification is modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub not_found: NotFoundSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotFoundSection {
    #[serde(default)]
    pub shows: Vec<NotFoundItem>,
    #[serde(default)]
    pub seasons: Vec<NotFoundItem>,
    #[serde(default)]
    pub episodes: Vec<NotFoundItem>,
    #[serde(default)]
    pub movies: Vec<NotFoundItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotFoundItem {
    #[serde(default)]
    pub ids: SyncIds,
}

impl NotFoundSection {
    pub fn lists_show(&self, tmdb_id: i64) -> bool {
        self.shows.iter().any(|item| item.ids.tmdb == Some(tmdb_id))
    }

    /// Seasons or episodes the service could not match. A request names a
    /// single show, so every entry belongs to it.
    pub fn unmatched_episode_items(&self) -> usize {
        self.seasons.len() + self.episodes.len()
    }

    pub fn lists_movie(&self, tmdb_id: i64) -> bool {
        self.movies.iter().any(|item| item.ids.tmdb == Some(tmdb_id))
    }
}
