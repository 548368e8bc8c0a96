/// The backends this process can deliver to
use super::backend::{BackendKind, SyncBackend};
use std::sync::Arc;

/// Adapters built at startup, kept in delivery order.
///
/// Both the flag executor and the job processor ask this registry whether a
/// backend is enabled, so a job is only queued when a pass could deliver it.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn SyncBackend>>,
}

impl BackendRegistry {
    pub fn new(mut backends: Vec<Arc<dyn SyncBackend>>) -> Self {
        backends.sort_by_key(|backend| backend.kind());
        Self { backends }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SyncBackend>> {
        self.backends.iter()
    }

    pub fn kinds(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|b| b.kind()).collect()
    }

    /// An adapter for `kind` was built.
    pub fn contains(&self, kind: BackendKind) -> bool {
        self.backends.iter().any(|b| b.kind() == kind)
    }

    pub fn any_enabled(&self) -> bool {
        self.backends.iter().any(|b| b.is_enabled())
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
