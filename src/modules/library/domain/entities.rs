use crate::modules::jobs::domain::entities::EpisodeFlag;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub tmdb_id: i64,
    pub title: String,
}

impl Show {
    pub fn new(tmdb_id: i64, title: impl Into<String>) -> Self {
        Self {
            tmdb_id,
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: i64,
    pub show_tmdb_id: i64,
    pub season: i32,
    pub number: i32,
    pub title: String,
    pub watched: EpisodeFlag,
    pub plays: i32,
    pub collected: bool,
}

impl Episode {
    pub fn new(id: i64, show_tmdb_id: i64, season: i32, number: i32) -> Self {
        Self {
            id,
            show_tmdb_id,
            season,
            number,
            title: String::new(),
            watched: EpisodeFlag::Unwatched,
            plays: 0,
            collected: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Season 0 holds specials.
    pub fn is_special(&self) -> bool {
        self.season == 0
    }

    /// Apply a watched flag the way the user sees it: watching adds a play,
    /// unwatching resets plays, skipping only stores the flag.
    pub fn set_watched(&mut self, flag: EpisodeFlag) {
        match flag {
            EpisodeFlag::Watched => self.plays = (self.plays + 1).max(1),
            EpisodeFlag::Unwatched => self.plays = 0,
            EpisodeFlag::Skipped => {}
        }
        self.watched = flag;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub tmdb_id: i64,
    pub title: String,
    pub in_collection: bool,
    pub in_watchlist: bool,
    pub watched: bool,
    pub plays: i32,
}

impl Movie {
    pub fn new(tmdb_id: i64, title: impl Into<String>) -> Self {
        Self {
            tmdb_id,
            title: title.into(),
            in_collection: false,
            in_watchlist: false,
            watched: false,
            plays: 0,
        }
    }

    pub fn set_watched(&mut self, watched: bool) {
        if watched {
            self.plays = (self.plays + 1).max(1);
        } else {
            self.plays = 0;
        }
        self.watched = watched;
    }
}
