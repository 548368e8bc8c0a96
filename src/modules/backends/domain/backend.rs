/// Port implemented by every remote sync backend
use crate::modules::jobs::domain::entities::{EpisodeFlag, JobAction, JobRecord};
use crate::modules::jobs::domain::result::JobResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote services a job can be delivered to.
///
/// The declaration order is the delivery order within a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Cloud,
    Social,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Cloud, BackendKind::Social];

    pub fn display_name(self) -> &'static str {
        match self {
            BackendKind::Cloud => "Cloud",
            BackendKind::Social => "Social",
        }
    }

    /// Capability table. Jobs a backend cannot express are skipped for it
    /// and count as delivered.
    pub fn supports(self, record: &JobRecord) -> bool {
        match (self, record.action) {
            (BackendKind::Cloud, _) => true,
            // No concept of a skipped episode
            (BackendKind::Social, JobAction::EpisodeWatchedFlagChange) => {
                record.episode_flag() != Some(EpisodeFlag::Skipped)
            }
            (BackendKind::Social, _) => true,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Cloud => write!(f, "cloud"),
            BackendKind::Social => write!(f, "social"),
        }
    }
}

#[async_trait]
pub trait SyncBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Read from the shared account settings on every call, so a
    /// disconnect takes effect for the very next job.
    fn is_enabled(&self) -> bool;

    fn supports(&self, record: &JobRecord) -> bool {
        self.kind().supports(record)
    }

    /// Perform exactly one remote call for the job and classify it.
    /// Failures are reported through the result, never as a panic.
    async fn deliver(&self, record: &JobRecord) -> JobResult;
}
