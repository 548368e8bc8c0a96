/// Test doubles for sync backends
use async_trait::async_trait;
use mockall::mock;
use showsync::modules::backends::{BackendKind, SyncBackend};
use showsync::modules::jobs::{BackendOutcome, JobRecord, JobResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Deliveries seen by every fake sharing the log, in call order.
pub type CallLog = Arc<Mutex<Vec<(BackendKind, JobRecord)>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Backend that records each delivery and answers from a script. Once the
/// script runs out every call succeeds.
pub struct FakeBackend {
    kind: BackendKind,
    enabled: AtomicBool,
    /// Deliveries after which the account gets disconnected.
    disconnect_after: AtomicUsize,
    deliveries: AtomicUsize,
    script: Mutex<VecDeque<BackendOutcome>>,
    log: CallLog,
}

impl FakeBackend {
    pub fn new(kind: BackendKind, log: CallLog) -> Arc<Self> {
        Arc::new(Self {
            kind,
            enabled: AtomicBool::new(true),
            disconnect_after: AtomicUsize::new(usize::MAX),
            deliveries: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
            log,
        })
    }

    pub fn script(&self, outcomes: impl IntoIterator<Item = BackendOutcome>) {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Disable this backend once it has delivered `deliveries` jobs.
    pub fn disconnect_after(&self, deliveries: usize) {
        self.disconnect_after.store(deliveries, Ordering::SeqCst);
    }

    /// Records this backend was asked to deliver, oldest first.
    pub fn calls(&self) -> Vec<JobRecord> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _)| *kind == self.kind)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl SyncBackend for FakeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn deliver(&self, record: &JobRecord) -> JobResult {
        self.log.lock().unwrap().push((self.kind, record.clone()));
        let delivered = self.deliveries.fetch_add(1, Ordering::SeqCst) + 1;
        if delivered >= self.disconnect_after.load(Ordering::SeqCst) {
            self.set_enabled(false);
        }

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(BackendOutcome::Success);

        match outcome {
            BackendOutcome::Success => JobResult::success(),
            failed => JobResult::failure(failed, format!("{} returned {}", self.kind, failed)),
        }
    }
}

mock! {
    pub Backend {}

    #[async_trait]
    impl SyncBackend for Backend {
        fn kind(&self) -> BackendKind;
        fn is_enabled(&self) -> bool;
        fn supports(&self, record: &JobRecord) -> bool;
        async fn deliver(&self, record: &JobRecord) -> JobResult;
    }
}
