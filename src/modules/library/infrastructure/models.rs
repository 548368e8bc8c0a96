use crate::modules::jobs::domain::entities::EpisodeFlag;
use crate::modules::library::domain::entities::{Episode, Movie, Show};
use crate::schema::{episodes, movies, shows};
use diesel::prelude::*;

// ============= SHOW MODELS =============

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = shows)]
#[diesel(primary_key(tmdb_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ShowModel {
    pub tmdb_id: i64,
    pub title: String,
}

impl From<&Show> for ShowModel {
    fn from(show: &Show) -> Self {
        Self {
            tmdb_id: show.tmdb_id,
            title: show.title.clone(),
        }
    }
}

impl From<ShowModel> for Show {
    fn from(model: ShowModel) -> Self {
        Show::new(model.tmdb_id, model.title)
    }
}

// ============= EPISODE MODELS =============

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = episodes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EpisodeModel {
    pub id: i64,
    pub show_tmdb_id: i64,
    pub season: i32,
    pub number: i32,
    pub title: String,
    pub watched: i32,
    pub plays: i32,
    pub collected: bool,
}

/// Only the columns a flag job may change.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = episodes)]
pub struct EpisodeFlagsChangeset {
    pub watched: i32,
    pub plays: i32,
    pub collected: bool,
}

impl From<&Episode> for EpisodeModel {
    fn from(episode: &Episode) -> Self {
        Self {
            id: episode.id,
            show_tmdb_id: episode.show_tmdb_id,
            season: episode.season,
            number: episode.number,
            title: episode.title.clone(),
            watched: episode.watched.value(),
            plays: episode.plays,
            collected: episode.collected,
        }
    }
}

impl From<&Episode> for EpisodeFlagsChangeset {
    fn from(episode: &Episode) -> Self {
        Self {
            watched: episode.watched.value(),
            plays: episode.plays,
            collected: episode.collected,
        }
    }
}

impl From<EpisodeModel> for Episode {
    fn from(model: EpisodeModel) -> Self {
        Episode {
            id: model.id,
            show_tmdb_id: model.show_tmdb_id,
            season: model.season,
            number: model.number,
            title: model.title,
            // Unknown values come from a newer schema; treat them as unwatched
            watched: EpisodeFlag::from_value(model.watched).unwrap_or(EpisodeFlag::Unwatched),
            plays: model.plays,
            collected: model.collected,
        }
    }
}

// ============= MOVIE MODELS =============

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = movies)]
#[diesel(primary_key(tmdb_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MovieModel {
    pub tmdb_id: i64,
    pub title: String,
    pub in_collection: bool,
    pub in_watchlist: bool,
    pub watched: bool,
    pub plays: i32,
}

impl From<&Movie> for MovieModel {
    fn from(movie: &Movie) -> Self {
        Self {
            tmdb_id: movie.tmdb_id,
            title: movie.title.clone(),
            in_collection: movie.in_collection,
            in_watchlist: movie.in_watchlist,
            watched: movie.watched,
            plays: movie.plays,
        }
    }
}

impl From<MovieModel> for Movie {
    fn from(model: MovieModel) -> Self {
        Movie {
            tmdb_id: model.tmdb_id,
            title: model.title,
            in_collection: model.in_collection,
            in_watchlist: model.in_watchlist,
            watched: model.watched,
            plays: model.plays,
        }
    }
}
