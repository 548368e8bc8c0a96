use super::models::*;
use crate::modules::backends::domain::{BackendKind, BackendSettings, SyncBackend};
use crate::modules::backends::infrastructure::http_client::BackendClient;
use crate::modules::jobs::domain::entities::{JobAction, JobRecord};
use crate::modules::jobs::domain::result::{BackendOutcome, ContentTarget, JobResult};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const ACCOUNT_HEADER: &str = "x-account";

/// Cloud backend: bearer token plus account header, PUT of absolute state
pub struct CloudBackend {
    http_client: BackendClient,
    base_url: String,
    settings: Arc<BackendSettings>,
}

impl CloudBackend {
    pub fn new(http_client: BackendClient, base_url: String, settings: Arc<BackendSettings>) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        }
    }

    /// Endpoint and JSON body for a job.
    pub fn build_request(&self, record: &JobRecord) -> AppResult<(String, Value)> {
        let body = if record.action.is_episode_action() {
            let flag = record.episode_flag();
            let is_collected = record.is_collected();
            let episodes = record
                .episodes
                .iter()
                .map(|e| match record.action {
                    JobAction::EpisodeWatchedFlagChange => CloudEpisode {
                        season: e.season,
                        number: e.number,
                        watched_flag: flag.map(|f| f.value()),
                        plays: Some(e.plays),
                        is_in_collection: None,
                    },
                    _ => CloudEpisode {
                        season: e.season,
                        number: e.number,
                        watched_flag: None,
                        plays: None,
                        is_in_collection: Some(is_collected),
                    },
                })
                .collect();

            serde_json::to_value(CloudEpisodesRequest {
                show_tmdb_id: record.target_id,
                episodes,
            })?
        } else {
            let mut movie = CloudMovie {
                tmdb_id: record.target_id,
                ..Default::default()
            };
            match record.action {
                JobAction::MovieCollectionAdd => movie.is_in_collection = Some(true),
                JobAction::MovieCollectionRemove => movie.is_in_collection = Some(false),
                JobAction::MovieWatchlistAdd => movie.is_in_watchlist = Some(true),
                JobAction::MovieWatchlistRemove => movie.is_in_watchlist = Some(false),
                JobAction::MovieWatchedSet => {
                    movie.is_watched = Some(true);
                    movie.plays = Some(record.flag_value.max(1));
                }
                JobAction::MovieWatchedRemove => {
                    movie.is_watched = Some(false);
                    movie.plays = Some(0);
                }
                _ => {
                    return Err(AppError::InvalidInput(format!(
                        "{} is not a movie action",
                        record.action
                    )))
                }
            }

            serde_json::to_value(CloudMoviesRequest {
                movies: vec![movie],
            })?
        };

        let path = if record.action.is_episode_action() {
            "/v1/episodes"
        } else {
            "/v1/movies"
        };

        Ok((format!("{}{}", self.base_url, path), body))
    }

    fn headers(account: Option<&str>, token: &str) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::Unauthorized("Cloud token is not a valid header".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        if let Some(account) = account {
            let value = HeaderValue::from_str(account).map_err(|_| {
                AppError::Unauthorized("Cloud account is not a valid header".to_string())
            })?;
            headers.insert(ACCOUNT_HEADER, value);
        }
        Ok(headers)
    }

    fn reconnect(error: impl Into<String>) -> JobResult {
        JobResult::failure(BackendOutcome::AuthError, error)
            .with_content_target(ContentTarget::ConnectBackend(BackendKind::Cloud))
    }
}

#[async_trait]
impl SyncBackend for CloudBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cloud
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_enabled(BackendKind::Cloud)
    }

    async fn deliver(&self, record: &JobRecord) -> JobResult {
        let Some(account) = self.settings.account(BackendKind::Cloud) else {
            return Self::reconnect("Not signed in to Cloud");
        };

        let headers = match Self::headers(account.account.as_deref(), &account.token) {
            Ok(headers) => headers,
            Err(e) => return Self::reconnect(e.to_string()),
        };

        let (url, body) = match self.build_request(record) {
            Ok(request) => request,
            Err(e) => return JobResult::failure(BackendOutcome::ClientError, e.to_string()),
        };

        log::debug!("Cloud: delivering {} for {}", record.action, record.target_id);

        let response = self
            .http_client
            .send_json(Method::PUT, &url, headers, &body)
            .await;

        match response.outcome {
            BackendOutcome::AuthError => Self::reconnect(
                response
                    .message
                    .unwrap_or_else(|| "Cloud rejected the credentials".to_string()),
            ),
            _ => response.into_job_result(),
        }
    }
}
