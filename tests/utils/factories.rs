/// Test data factories
///
/// Seeds a small library and builds job records with sensible defaults.
use showsync::modules::jobs::{EpisodeFlag, EpisodeInfo, JobAction, JobRecord};
use showsync::modules::library::{Episode, LibraryRepository, Movie, Show};

pub const SHOW_ID: i64 = 70523;
pub const SHOW_TITLE: &str = "Dark";
pub const MOVIE_ID: i64 = 603;
pub const MOVIE_TITLE: &str = "The Matrix";

/// Episode ids are `season * 100 + number`.
pub fn episode_id(season: i32, number: i32) -> i64 {
    i64::from(season * 100 + number)
}

/// Seed one show with a special and two seasons of three episodes, plus
/// one movie.
pub async fn seed_library(library: &dyn LibraryRepository) {
    library
        .upsert_show(&Show::new(SHOW_ID, SHOW_TITLE))
        .await
        .unwrap();

    for (season, count) in [(0, 1), (1, 3), (2, 3)] {
        for number in 1..=count {
            let episode = Episode::new(episode_id(season, number), SHOW_ID, season, number)
                .with_title(format!("Episode {}", number));
            library.upsert_episode(&episode).await.unwrap();
        }
    }

    library
        .upsert_movie(&Movie::new(MOVIE_ID, MOVIE_TITLE))
        .await
        .unwrap();
}

pub struct JobRecordFactory;

impl JobRecordFactory {
    pub fn watched(show_tmdb_id: i64, flag: EpisodeFlag, created_at_ms: i64) -> JobRecord {
        let plays = i32::from(flag == EpisodeFlag::Watched);
        JobRecord::episodes(
            JobAction::EpisodeWatchedFlagChange,
            show_tmdb_id,
            flag.value(),
            vec![EpisodeInfo::new(1, 1, plays)],
            created_at_ms,
        )
    }

    pub fn skipped(show_tmdb_id: i64, created_at_ms: i64) -> JobRecord {
        Self::watched(show_tmdb_id, EpisodeFlag::Skipped, created_at_ms)
    }

    pub fn collected(show_tmdb_id: i64, episodes: Vec<EpisodeInfo>, created_at_ms: i64) -> JobRecord {
        JobRecord::episodes(
            JobAction::EpisodeCollectionChange,
            show_tmdb_id,
            1,
            episodes,
            created_at_ms,
        )
    }

    pub fn watchlist_add(movie_tmdb_id: i64, created_at_ms: i64) -> JobRecord {
        JobRecord::movie(JobAction::MovieWatchlistAdd, movie_tmdb_id, created_at_ms)
    }
}
