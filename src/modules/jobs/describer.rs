/// Human descriptions of jobs, looked up from the local library
use crate::modules::jobs::domain::entities::{EpisodeFlag, JobAction, JobRecord};
use crate::modules::jobs::domain::result::{ContentTarget, JobResult};
use crate::modules::library::domain::repository::LibraryRepository;
use crate::log_debug;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescription {
    pub item: String,
    pub action: String,
    pub content_target: ContentTarget,
}

pub struct JobDescriber {
    library: Arc<dyn LibraryRepository>,
}

impl JobDescriber {
    pub fn new(library: Arc<dyn LibraryRepository>) -> Self {
        Self { library }
    }

    /// Describe a job. Library lookups that fail fall back to TMDB ids.
    pub async fn describe(&self, record: &JobRecord) -> JobDescription {
        let (item, content_target) = if record.action.is_episode_action() {
            let title = match self.library.find_show(record.target_id).await {
                Ok(Some(show)) => show.title,
                Ok(None) => format!("Show {}", record.target_id),
                Err(e) => {
                    log_debug!("No title for show {}: {}", record.target_id, e);
                    format!("Show {}", record.target_id)
                }
            };
            (
                Self::episode_item(&title, record),
                ContentTarget::Show(record.target_id),
            )
        } else {
            let title = match self.library.find_movie(record.target_id).await {
                Ok(Some(movie)) => movie.title,
                Ok(None) => format!("Movie {}", record.target_id),
                Err(e) => {
                    log_debug!("No title for movie {}: {}", record.target_id, e);
                    format!("Movie {}", record.target_id)
                }
            };
            (title, ContentTarget::Movie(record.target_id))
        };

        JobDescription {
            item,
            action: Self::action_label(record).to_string(),
            content_target,
        }
    }

    /// Attach a description to a failed result.
    pub async fn describe_result(&self, record: &JobRecord, result: JobResult) -> JobResult {
        let description = self.describe(record).await;
        result.describe(
            description.item,
            description.action,
            description.content_target,
        )
    }

    fn episode_item(show_title: &str, record: &JobRecord) -> String {
        match record.episodes.as_slice() {
            [episode] => format!("{} {}x{:02}", show_title, episode.season, episode.number),
            episodes => format!("{} ({} episodes)", show_title, episodes.len()),
        }
    }

    pub fn action_label(record: &JobRecord) -> &'static str {
        match record.action {
            JobAction::EpisodeWatchedFlagChange => match record.episode_flag() {
                Some(EpisodeFlag::Watched) => "Set watched",
                Some(EpisodeFlag::Skipped) => "Skip",
                _ => "Set not watched",
            },
            JobAction::EpisodeCollectionChange => {
                if record.is_collected() {
                    "Add to collection"
                } else {
                    "Remove from collection"
                }
            }
            JobAction::MovieCollectionAdd => "Add to collection",
            JobAction::MovieCollectionRemove => "Remove from collection",
            JobAction::MovieWatchlistAdd => "Add to watchlist",
            JobAction::MovieWatchlistRemove => "Remove from watchlist",
            JobAction::MovieWatchedSet => "Set watched",
            JobAction::MovieWatchedRemove => "Set not watched",
        }
    }
}
