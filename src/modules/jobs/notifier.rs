/// User-facing notifications for jobs that could not be delivered
use crate::modules::jobs::domain::result::{ContentTarget, JobResult};
use crate::shared::utils::time::relative_age;
use crate::log_warn;
use dashmap::DashMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobNotification {
    pub job_id: i64,
    pub item: String,
    pub action: String,
    pub error: String,
    pub content_target: Option<ContentTarget>,
    pub created_at_ms: i64,
}

impl JobNotification {
    /// Build from a described failure. Missing descriptions fall back to
    /// the job id.
    pub fn from_result(job_id: i64, result: &JobResult, created_at_ms: i64) -> Self {
        Self {
            job_id,
            item: result
                .item
                .clone()
                .unwrap_or_else(|| format!("Job {}", job_id)),
            action: result.action.clone().unwrap_or_else(|| "Sync".to_string()),
            error: result
                .error
                .clone()
                .unwrap_or_else(|| result.outcome.to_string()),
            content_target: result.content_target,
            created_at_ms,
        }
    }

    pub fn title(&self) -> String {
        format!("{} failed: {}", self.action, self.item)
    }

    pub fn text(&self, now_ms: i64) -> String {
        format!(
            "{} ({})",
            self.error,
            relative_age(self.created_at_ms, now_ms)
        )
    }
}

pub trait JobNotifier: Send + Sync {
    /// Show a notification, replacing any earlier one for the same job.
    fn notify(&self, notification: JobNotification);

    /// Withdraw the notification of a job, if any.
    fn cancel(&self, job_id: i64);
}

/// In-process notification surface keyed by job id.
#[derive(Debug, Default)]
pub struct NotificationTray {
    entries: DashMap<i64, JobNotification>,
}

impl NotificationTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, job_id: i64) -> Option<JobNotification> {
        self.entries.get(&job_id).map(|entry| entry.value().clone())
    }

    /// All notifications, oldest job first.
    pub fn all(&self) -> Vec<JobNotification> {
        let mut all: Vec<JobNotification> =
            self.entries.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by_key(|n| n.job_id);
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl JobNotifier for NotificationTray {
    fn notify(&self, notification: JobNotification) {
        log_warn!(
            "{}: {}",
            notification.title(),
            notification.text(crate::shared::utils::time::now_ms())
        );
        self.entries.insert(notification.job_id, notification);
    }

    fn cancel(&self, job_id: i64) {
        self.entries.remove(&job_id);
    }
}
