//! Environment-driven configuration.
//!
//! Values are read from the process environment after loading an optional
//! `.env` file. A backend is configured only when its URL and credentials
//! are all present.

use crate::shared::errors::{AppError, AppResult};
use std::time::Duration;

/// Outbound connect bound for every backend call.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Outbound read bound for every backend call.
pub const READ_TIMEOUT: Duration = Duration::from_secs(20);

const DEFAULT_DATABASE_URL: &str = "showsync.db";
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 15 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudConfig {
    pub base_url: String,
    pub account: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialConfig {
    pub base_url: String,
    pub client_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: CONNECT_TIMEOUT,
            read: READ_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub database_url: String,
    pub sync_interval: Duration,
    pub cloud: Option<CloudConfig>,
    pub social: Option<SocialConfig>,
    pub timeouts: HttpTimeouts,
}

impl SyncConfig {
    /// Load `.env` (if present) and read configuration from the environment.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url =
            get("SHOWSYNC_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let sync_interval = match get("SHOWSYNC_SYNC_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "SHOWSYNC_SYNC_INTERVAL_SECS must be a positive integer, got '{}'",
                        raw
                    ))
                })?;
                if secs == 0 {
                    return Err(AppError::ConfigError(
                        "SHOWSYNC_SYNC_INTERVAL_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
        };

        let cloud = match (
            get("SHOWSYNC_CLOUD_URL"),
            get("SHOWSYNC_CLOUD_ACCOUNT"),
            get("SHOWSYNC_CLOUD_TOKEN"),
        ) {
            (Some(base_url), Some(account), Some(token)) => Some(CloudConfig {
                base_url: Self::normalize_url(&base_url)?,
                account,
                token,
            }),
            _ => None,
        };

        let social = match (
            get("SHOWSYNC_SOCIAL_URL"),
            get("SHOWSYNC_SOCIAL_CLIENT_ID"),
            get("SHOWSYNC_SOCIAL_ACCESS_TOKEN"),
        ) {
            (Some(base_url), Some(client_id), Some(access_token)) => Some(SocialConfig {
                base_url: Self::normalize_url(&base_url)?,
                client_id,
                access_token,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            sync_interval,
            cloud,
            social,
            timeouts: HttpTimeouts::default(),
        })
    }

    fn normalize_url(raw: &str) -> AppResult<String> {
        if !raw.starts_with("http://") && !raw.starts_with("https://") {
            return Err(AppError::ConfigError(format!(
                "Backend URL must start with http:// or https://, got '{}'",
                raw
            )));
        }
        Ok(raw.trim_end_matches('/').to_string())
    }
}
