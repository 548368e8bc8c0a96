/// Outcome of delivering one job to one backend
use crate::modules::backends::domain::BackendKind;
use serde::Serialize;

/// Classification of a single backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendOutcome {
    Success,
    ConnectionError,
    ServerError,
    ClientError,
    AuthError,
    NotFound,
}

impl BackendOutcome {
    /// The job can leave the queue after this outcome.
    pub fn is_removable(self) -> bool {
        matches!(
            self,
            BackendOutcome::Success | BackendOutcome::ClientError | BackendOutcome::NotFound
        )
    }

    /// Later jobs must not be attempted after this outcome.
    pub fn blocks_queue(self) -> bool {
        matches!(
            self,
            BackendOutcome::ConnectionError | BackendOutcome::ServerError | BackendOutcome::AuthError
        )
    }

    pub fn notifies(self) -> bool {
        self != BackendOutcome::Success
    }
}

impl std::fmt::Display for BackendOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendOutcome::Success => write!(f, "success"),
            BackendOutcome::ConnectionError => write!(f, "connection_error"),
            BackendOutcome::ServerError => write!(f, "server_error"),
            BackendOutcome::ClientError => write!(f, "client_error"),
            BackendOutcome::AuthError => write!(f, "auth_error"),
            BackendOutcome::NotFound => write!(f, "not_found"),
        }
    }
}

/// Where a notification should lead the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ContentTarget {
    Show(i64),
    Movie(i64),
    /// Account screen of a backend whose credentials were rejected.
    ConnectBackend(BackendKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub outcome: BackendOutcome,
    pub successful: bool,
    pub job_removable: bool,
    pub item: Option<String>,
    pub action: Option<String>,
    pub error: Option<String>,
    pub content_target: Option<ContentTarget>,
}

impl JobResult {
    pub fn success() -> Self {
        Self::from_outcome(BackendOutcome::Success, None)
    }

    pub fn failure(outcome: BackendOutcome, error: impl Into<String>) -> Self {
        Self::from_outcome(outcome, Some(error.into()))
    }

    fn from_outcome(outcome: BackendOutcome, error: Option<String>) -> Self {
        Self {
            outcome,
            successful: outcome == BackendOutcome::Success,
            job_removable: outcome.is_removable(),
            item: None,
            action: None,
            error,
            content_target: None,
        }
    }

    /// Attach the human description used by notifications.
    pub fn describe(
        mut self,
        item: impl Into<String>,
        action: impl Into<String>,
        content_target: ContentTarget,
    ) -> Self {
        self.item = Some(item.into());
        self.action = Some(action.into());
        // An auth failure points at the account screen instead of the item.
        if !matches!(self.content_target, Some(ContentTarget::ConnectBackend(_))) {
            self.content_target = Some(content_target);
        }
        self
    }

    pub fn with_content_target(mut self, content_target: ContentTarget) -> Self {
        self.content_target = Some(content_target);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classification() {
        use BackendOutcome::*;

        for outcome in [Success, ClientError, NotFound] {
            assert!(outcome.is_removable(), "{} should be removable", outcome);
            assert!(!outcome.blocks_queue());
        }
        for outcome in [ConnectionError, ServerError, AuthError] {
            assert!(outcome.blocks_queue(), "{} should block", outcome);
            assert!(!outcome.is_removable());
            assert!(outcome.notifies());
        }
        assert!(!Success.notifies());
        assert!(NotFound.notifies());
    }

    #[test]
    fn test_result_constructors() {
        let ok = JobResult::success();
        assert!(ok.successful);
        assert!(ok.job_removable);
        assert!(ok.error.is_none());

        let failed = JobResult::failure(BackendOutcome::ServerError, "HTTP 503");
        assert!(!failed.successful);
        assert!(!failed.job_removable);
        assert_eq!(failed.error.as_deref(), Some("HTTP 503"));
    }

    #[test]
    fn test_describe_keeps_reconnect_target() {
        let result = JobResult::failure(BackendOutcome::AuthError, "HTTP 401")
            .with_content_target(ContentTarget::ConnectBackend(BackendKind::Social))
            .describe("Dark 1x01", "Set watched", ContentTarget::Show(70523));

        assert_eq!(
            result.content_target,
            Some(ContentTarget::ConnectBackend(BackendKind::Social))
        );
        assert_eq!(result.item.as_deref(), Some("Dark 1x01"));

        let result = JobResult::failure(BackendOutcome::NotFound, "missing")
            .describe("Heat", "Add to watchlist", ContentTarget::Movie(949));
        assert_eq!(result.content_target, Some(ContentTarget::Movie(949)));
    }
}
