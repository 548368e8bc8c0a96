use super::models::*;
use crate::modules::backends::domain::{BackendKind, BackendSettings, SyncBackend};
use crate::modules::backends::infrastructure::http_client::BackendClient;
use crate::modules::jobs::domain::entities::{EpisodeFlag, JobAction, JobRecord};
use crate::modules::jobs::domain::result::{BackendOutcome, ContentTarget, JobResult};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::time::to_rfc3339;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

const API_VERSION_HEADER: &str = "x-api-version";
const API_VERSION: &str = "2";
const CLIENT_ID_HEADER: &str = "x-client-id";

/// Social backend: history, collection and watchlist endpoints
pub struct SocialBackend {
    http_client: BackendClient,
    base_url: String,
    client_id: String,
    settings: Arc<BackendSettings>,
}

impl SocialBackend {
    pub fn new(
        http_client: BackendClient,
        base_url: String,
        client_id: String,
        settings: Arc<BackendSettings>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            settings,
        }
    }

    /// Endpoint for a job; `None` when the job has no social equivalent.
    pub fn endpoint(record: &JobRecord) -> Option<&'static str> {
        let path = match record.action {
            JobAction::EpisodeWatchedFlagChange => match record.episode_flag()? {
                EpisodeFlag::Watched => "/sync/history",
                EpisodeFlag::Unwatched => "/sync/history/remove",
                EpisodeFlag::Skipped => return None,
            },
            JobAction::EpisodeCollectionChange => {
                if record.is_collected() {
                    "/sync/collection"
                } else {
                    "/sync/collection/remove"
                }
            }
            JobAction::MovieCollectionAdd => "/sync/collection",
            JobAction::MovieCollectionRemove => "/sync/collection/remove",
            JobAction::MovieWatchlistAdd => "/sync/watchlist",
            JobAction::MovieWatchlistRemove => "/sync/watchlist/remove",
            JobAction::MovieWatchedSet => "/sync/history",
            JobAction::MovieWatchedRemove => "/sync/history/remove",
        };
        Some(path)
    }

    /// Endpoint URL and JSON body for a job.
    pub fn build_request(&self, record: &JobRecord) -> AppResult<(String, Value)> {
        let path = Self::endpoint(record).ok_or_else(|| {
            AppError::InvalidInput(format!("{} has no social equivalent", record.action))
        })?;

        // The job's own timestamp names the play, so a replay adds nothing new
        let adds_history = path == "/sync/history";
        let watched_at = adds_history.then(|| to_rfc3339(record.created_at_ms));

        let request = if record.action.is_episode_action() {
            let mut seasons: BTreeMap<i32, Vec<SyncEpisode>> = BTreeMap::new();
            for episode in &record.episodes {
                seasons.entry(episode.season).or_default().push(SyncEpisode {
                    number: episode.number,
                    watched_at: watched_at.clone(),
                });
            }

            SyncRequest {
                shows: vec![SyncShow {
                    ids: SyncIds::tmdb(record.target_id),
                    seasons: seasons
                        .into_iter()
                        .map(|(number, episodes)| SyncSeason { number, episodes })
                        .collect(),
                }],
                movies: Vec::new(),
            }
        } else {
            SyncRequest {
                shows: Vec::new(),
                movies: vec![SyncMovie {
                    ids: SyncIds::tmdb(record.target_id),
                    watched_at,
                }],
            }
        };

        Ok((
            format!("{}{}", self.base_url, path),
            serde_json::to_value(request)?,
        ))
    }

    fn headers(&self, token: &str) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        headers.insert(
            CLIENT_ID_HEADER,
            HeaderValue::from_str(&self.client_id).map_err(|_| {
                AppError::ConfigError("Social client id is not a valid header".to_string())
            })?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                AppError::Unauthorized("Social token is not a valid header".to_string())
            })?,
        );
        Ok(headers)
    }

    /// A 2xx response still fails the job when the target is unknown remotely.
    fn classify_body(record: &JobRecord, body: Option<&Value>) -> Option<JobResult> {
        let response: SyncResponse = serde_json::from_value(body?.clone()).ok()?;

        let not_found = &response.not_found;
        let error = if record.action.is_episode_action() {
            let unmatched = not_found.unmatched_episode_items();
            if not_found.lists_show(record.target_id) {
                format!("Social does not know TMDB id {}", record.target_id)
            } else if unmatched > 0 {
                format!(
                    "Social could not match {} of {} episodes of TMDB id {}",
                    unmatched.min(record.episodes.len()),
                    record.episodes.len(),
                    record.target_id
                )
            } else {
                return None;
            }
        } else if not_found.lists_movie(record.target_id) {
            format!("Social does not know TMDB id {}", record.target_id)
        } else {
            return None;
        };

        Some(JobResult::failure(BackendOutcome::NotFound, error))
    }

    fn reconnect(error: impl Into<String>) -> JobResult {
        JobResult::failure(BackendOutcome::AuthError, error)
            .with_content_target(ContentTarget::ConnectBackend(BackendKind::Social))
    }
}

#[async_trait]
impl SyncBackend for SocialBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Social
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_enabled(BackendKind::Social)
    }

    async fn deliver(&self, record: &JobRecord) -> JobResult {
        let Some(account) = self.settings.account(BackendKind::Social) else {
            return Self::reconnect("Not signed in to Social");
        };

        let headers = match self.headers(&account.token) {
            Ok(headers) => headers,
            Err(AppError::ConfigError(e)) => {
                return JobResult::failure(BackendOutcome::ClientError, e)
            }
            Err(e) => return Self::reconnect(e.to_string()),
        };

        let (url, body) = match self.build_request(record) {
            Ok(request) => request,
            Err(e) => return JobResult::failure(BackendOutcome::ClientError, e.to_string()),
        };

        log::debug!("Social: delivering {} for {}", record.action, record.target_id);

        let response = self
            .http_client
            .send_json(Method::POST, &url, headers, &body)
            .await;

        match response.outcome {
            BackendOutcome::Success => Self::classify_body(record, response.body.as_ref())
                .unwrap_or_else(JobResult::success),
            BackendOutcome::AuthError => Self::reconnect(
                response
                    .message
                    .unwrap_or_else(|| "Social rejected the credentials".to_string()),
            ),
            _ => response.into_job_result(),
        }
    }
}
