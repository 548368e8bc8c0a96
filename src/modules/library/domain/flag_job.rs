/// User actions that change local library state
///
/// Every variant carries the absolute target state, never a toggle, so the
/// resulting job can be replayed safely against any backend.
use super::entities::{Episode, Movie};
use crate::modules::jobs::domain::entities::{EpisodeFlag, JobAction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlagJob {
    EpisodeWatched {
        episode_id: i64,
        flag: EpisodeFlag,
    },
    SeasonWatched {
        show_tmdb_id: i64,
        season: i32,
        flag: EpisodeFlag,
    },
    ShowWatched {
        show_tmdb_id: i64,
        flag: EpisodeFlag,
    },
    EpisodeCollected {
        episode_id: i64,
        collected: bool,
    },
    SeasonCollected {
        show_tmdb_id: i64,
        season: i32,
        collected: bool,
    },
    ShowCollected {
        show_tmdb_id: i64,
        collected: bool,
    },
    MovieCollection {
        movie_tmdb_id: i64,
        in_collection: bool,
    },
    MovieWatchlist {
        movie_tmdb_id: i64,
        in_watchlist: bool,
    },
    MovieWatched {
        movie_tmdb_id: i64,
        watched: bool,
    },
}

/// Which episodes an episode job reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeScope {
    Single(i64),
    Season { show_tmdb_id: i64, season: i32 },
    /// Every regular episode; specials are left alone.
    Show(i64),
}

impl FlagJob {
    pub fn job_action(&self) -> JobAction {
        match *self {
            FlagJob::EpisodeWatched { .. }
            | FlagJob::SeasonWatched { .. }
            | FlagJob::ShowWatched { .. } => JobAction::EpisodeWatchedFlagChange,
            FlagJob::EpisodeCollected { .. }
            | FlagJob::SeasonCollected { .. }
            | FlagJob::ShowCollected { .. } => JobAction::EpisodeCollectionChange,
            FlagJob::MovieCollection { in_collection, .. } => {
                if in_collection {
                    JobAction::MovieCollectionAdd
                } else {
                    JobAction::MovieCollectionRemove
                }
            }
            FlagJob::MovieWatchlist { in_watchlist, .. } => {
                if in_watchlist {
                    JobAction::MovieWatchlistAdd
                } else {
                    JobAction::MovieWatchlistRemove
                }
            }
            FlagJob::MovieWatched { watched, .. } => {
                if watched {
                    JobAction::MovieWatchedSet
                } else {
                    JobAction::MovieWatchedRemove
                }
            }
        }
    }

    pub fn episode_scope(&self) -> Option<EpisodeScope> {
        match *self {
            FlagJob::EpisodeWatched { episode_id, .. }
            | FlagJob::EpisodeCollected { episode_id, .. } => {
                Some(EpisodeScope::Single(episode_id))
            }
            FlagJob::SeasonWatched {
                show_tmdb_id,
                season,
                ..
            }
            | FlagJob::SeasonCollected {
                show_tmdb_id,
                season,
                ..
            } => Some(EpisodeScope::Season {
                show_tmdb_id,
                season,
            }),
            FlagJob::ShowWatched { show_tmdb_id, .. }
            | FlagJob::ShowCollected { show_tmdb_id, .. } => {
                Some(EpisodeScope::Show(show_tmdb_id))
            }
            _ => None,
        }
    }

    pub fn movie_tmdb_id(&self) -> Option<i64> {
        match *self {
            FlagJob::MovieCollection { movie_tmdb_id, .. }
            | FlagJob::MovieWatchlist { movie_tmdb_id, .. }
            | FlagJob::MovieWatched { movie_tmdb_id, .. } => Some(movie_tmdb_id),
            _ => None,
        }
    }

    /// Value stored in the job's `flag_value` for episode jobs.
    pub fn flag_value(&self) -> i32 {
        match *self {
            FlagJob::EpisodeWatched { flag, .. }
            | FlagJob::SeasonWatched { flag, .. }
            | FlagJob::ShowWatched { flag, .. } => flag.value(),
            FlagJob::EpisodeCollected { collected, .. }
            | FlagJob::SeasonCollected { collected, .. }
            | FlagJob::ShowCollected { collected, .. } => i32::from(collected),
            _ => 0,
        }
    }

    /// Whether a batched job changes this episode. Single-episode jobs
    /// always apply, so watching twice counts two plays.
    pub fn changes(&self, episode: &Episode) -> bool {
        match *self {
            FlagJob::EpisodeWatched { .. } | FlagJob::EpisodeCollected { .. } => true,
            FlagJob::SeasonWatched { flag, .. } | FlagJob::ShowWatched { flag, .. } => {
                match flag {
                    // Skipping never hides an episode that was already seen
                    EpisodeFlag::Skipped => episode.watched == EpisodeFlag::Unwatched,
                    _ => episode.watched != flag,
                }
            }
            FlagJob::SeasonCollected { collected, .. }
            | FlagJob::ShowCollected { collected, .. } => episode.collected != collected,
            _ => false,
        }
    }

    pub fn apply_to_episode(&self, episode: &mut Episode) {
        match *self {
            FlagJob::EpisodeWatched { flag, .. }
            | FlagJob::SeasonWatched { flag, .. }
            | FlagJob::ShowWatched { flag, .. } => episode.set_watched(flag),
            FlagJob::EpisodeCollected { collected, .. }
            | FlagJob::SeasonCollected { collected, .. }
            | FlagJob::ShowCollected { collected, .. } => episode.collected = collected,
            _ => {}
        }
    }

    pub fn apply_to_movie(&self, movie: &mut Movie) {
        match *self {
            FlagJob::MovieCollection { in_collection, .. } => movie.in_collection = in_collection,
            FlagJob::MovieWatchlist { in_watchlist, .. } => movie.in_watchlist = in_watchlist,
            FlagJob::MovieWatched { watched, .. } => movie.set_watched(watched),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_actions_follow_target_state() {
        let add = FlagJob::MovieWatchlist {
            movie_tmdb_id: 1,
            in_watchlist: true,
        };
        let remove = FlagJob::MovieWatched {
            movie_tmdb_id: 1,
            watched: false,
        };
        assert_eq!(add.job_action(), JobAction::MovieWatchlistAdd);
        assert_eq!(remove.job_action(), JobAction::MovieWatchedRemove);
        assert_eq!(add.movie_tmdb_id(), Some(1));
        assert_eq!(add.episode_scope(), None);
    }

    #[test]
    fn test_batched_watched_skips_unchanged_episodes() {
        let job = FlagJob::SeasonWatched {
            show_tmdb_id: 1,
            season: 1,
            flag: EpisodeFlag::Watched,
        };
        let mut seen = Episode::new(1, 1, 1, 1);
        seen.set_watched(EpisodeFlag::Watched);
        let fresh = Episode::new(2, 1, 1, 2);

        assert!(!job.changes(&seen));
        assert!(job.changes(&fresh));
    }

    #[test]
    fn test_batched_skip_only_touches_unwatched() {
        let job = FlagJob::ShowWatched {
            show_tmdb_id: 1,
            flag: EpisodeFlag::Skipped,
        };
        let mut seen = Episode::new(1, 1, 1, 1);
        seen.set_watched(EpisodeFlag::Watched);

        assert!(!job.changes(&seen));
        assert!(job.changes(&Episode::new(2, 1, 1, 2)));
        assert_eq!(job.flag_value(), 2);
    }

    #[test]
    fn test_single_episode_always_applies() {
        let job = FlagJob::EpisodeWatched {
            episode_id: 1,
            flag: EpisodeFlag::Watched,
        };
        let mut episode = Episode::new(1, 1, 1, 1);
        episode.set_watched(EpisodeFlag::Watched);

        assert!(job.changes(&episode));
        job.apply_to_episode(&mut episode);
        assert_eq!(episode.plays, 2);
    }

    #[test]
    fn test_collection_flag_value() {
        let job = FlagJob::SeasonCollected {
            show_tmdb_id: 1,
            season: 2,
            collected: true,
        };
        assert_eq!(job.flag_value(), 1);
        assert_eq!(job.job_action(), JobAction::EpisodeCollectionChange);
        assert_eq!(
            job.episode_scope(),
            Some(EpisodeScope::Season {
                show_tmdb_id: 1,
                season: 2
            })
        );
    }
}
