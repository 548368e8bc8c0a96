/// Drain pass tests
///
/// Tests cover:
/// - Delivery order across jobs and backends
/// - Blocking on transient failures
/// - Permanent failures, notifications and the capability table
/// - Queue clearing, also when the last backend goes away mid-pass
/// - Corrupt payloads
mod utils;

use showsync::modules::backends::{BackendKind, SyncBackend};
use showsync::modules::jobs::{
    BackendOutcome, ContentTarget, EpisodeFlag, JobDescriber, JobProcessor, JobRecord, JobResult,
    JobStore, JobStoreImpl, NotificationTray,
};
use showsync::modules::library::LibraryRepositoryImpl;
use showsync::shared::Database;
use std::sync::Arc;
use utils::factories::{self, JobRecordFactory, SHOW_ID};
use utils::fakes::{call_log, CallLog, FakeBackend, MockBackend};
use utils::db;

struct Harness {
    database: Database,
    store: Arc<JobStoreImpl>,
    library: Arc<LibraryRepositoryImpl>,
    tray: Arc<NotificationTray>,
    log: CallLog,
    cloud: Arc<FakeBackend>,
    social: Arc<FakeBackend>,
}

impl Harness {
    async fn new() -> Self {
        let database = db::fresh_database();
        let store = db::job_store(&database);
        let library = db::library(&database);
        factories::seed_library(library.as_ref()).await;

        let log = call_log();
        Self {
            cloud: FakeBackend::new(BackendKind::Cloud, log.clone()),
            social: FakeBackend::new(BackendKind::Social, log.clone()),
            database,
            store,
            library,
            tray: Arc::new(NotificationTray::new()),
            log,
        }
    }

    fn processor(&self) -> JobProcessor {
        self.processor_with(vec![
            self.social.clone() as Arc<dyn SyncBackend>,
            self.cloud.clone() as Arc<dyn SyncBackend>,
        ])
    }

    fn processor_with(&self, backends: Vec<Arc<dyn SyncBackend>>) -> JobProcessor {
        JobProcessor::new(
            self.store.clone(),
            backends,
            self.tray.clone(),
            JobDescriber::new(self.library.clone()),
        )
    }

    async fn enqueue(&self, record: JobRecord) -> i64 {
        self.store.enqueue(&record).await.unwrap().id
    }

    async fn queued(&self) -> Vec<JobRecord> {
        self.store
            .pending_after(None, 100)
            .await
            .unwrap()
            .iter()
            .map(|entry| entry.to_record().unwrap())
            .collect()
    }

    fn calls(&self) -> Vec<(BackendKind, i64)> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(kind, record)| (*kind, record.created_at_ms))
            .collect()
    }
}

// ================================================================================================
// ORDERING
// ================================================================================================

#[tokio::test]
async fn delivers_in_enqueue_order_cloud_first() {
    let h = Harness::new().await;
    h.enqueue(JobRecordFactory::watched(SHOW_ID, EpisodeFlag::Watched, 1_000))
        .await;
    h.enqueue(JobRecordFactory::watchlist_add(factories::MOVIE_ID, 1_001))
        .await;
    h.enqueue(JobRecordFactory::watched(SHOW_ID, EpisodeFlag::Unwatched, 1_002))
        .await;

    let report = h.processor().process().await.unwrap();

    assert_eq!(
        h.calls(),
        vec![
            (BackendKind::Cloud, 1_000),
            (BackendKind::Social, 1_000),
            (BackendKind::Cloud, 1_001),
            (BackendKind::Social, 1_001),
            (BackendKind::Cloud, 1_002),
            (BackendKind::Social, 1_002),
        ]
    );
    assert_eq!(report.processed, 3);
    assert_eq!(report.delivered, 3);
    assert_eq!(report.removed, 3);
    assert!(!report.blocked);
    assert!(h.queued().await.is_empty());
    assert!(h.tray.is_empty());
}

#[tokio::test]
async fn pages_through_long_queues() {
    let h = Harness::new().await;
    for i in 0..7 {
        h.enqueue(JobRecordFactory::watchlist_add(100 + i, 1_000 + i))
            .await;
    }

    let processor = h
        .processor_with(vec![h.cloud.clone() as Arc<dyn SyncBackend>])
        .with_page_size(2);
    let report = processor.process().await.unwrap();

    assert_eq!(report.delivered, 7);
    let order: Vec<i64> = h.calls().iter().map(|(_, at)| *at).collect();
    assert_eq!(order, (1_000..1_007).collect::<Vec<_>>());
    assert_eq!(h.store.count().await.unwrap(), 0);
}

// ================================================================================================
// BLOCKING FAILURES
// ================================================================================================

#[tokio::test]
async fn connection_error_keeps_both_jobs_for_target_42() {
    let h = Harness::new().await;
    h.enqueue(JobRecordFactory::watched(42, EpisodeFlag::Watched, 1_000))
        .await;
    h.enqueue(JobRecordFactory::watched(42, EpisodeFlag::Unwatched, 1_001))
        .await;
    h.cloud.script([BackendOutcome::ConnectionError]);

    let report = h.processor().process().await.unwrap();

    assert!(report.blocked);
    assert_eq!(report.removed, 0);
    // Social never sees a job the cloud could not take yet
    assert_eq!(h.calls(), vec![(BackendKind::Cloud, 1_000)]);

    let queued = h.queued().await;
    assert_eq!(queued.len(), 2);
    assert_eq!(queued[0].created_at_ms, 1_000);
    assert_eq!(queued[0].episode_flag(), Some(EpisodeFlag::Watched));
    assert_eq!(queued[1].created_at_ms, 1_001);
    assert_eq!(queued[1].episode_flag(), Some(EpisodeFlag::Unwatched));
}

#[tokio::test]
async fn blocked_pass_still_removes_finished_jobs() {
    let h = Harness::new().await;
    for i in 0..3 {
        h.enqueue(JobRecordFactory::watchlist_add(100 + i, 1_000 + i))
            .await;
    }
    h.cloud
        .script([BackendOutcome::Success, BackendOutcome::ServerError]);

    let report = h.processor().process().await.unwrap();

    assert!(report.blocked);
    assert_eq!(report.removed, 1);
    assert_eq!(report.notified, 1);
    let left: Vec<i64> = h.queued().await.iter().map(|r| r.created_at_ms).collect();
    assert_eq!(left, vec![1_001, 1_002]);
}

#[tokio::test]
async fn auth_error_on_social_blocks_and_notifies() {
    let h = Harness::new().await;
    let job_id = h
        .enqueue(JobRecordFactory::watched(SHOW_ID, EpisodeFlag::Watched, 1_000))
        .await;
    h.social.script([BackendOutcome::AuthError]);

    let report = h.processor().process().await.unwrap();

    assert!(report.blocked);
    assert_eq!(h.store.count().await.unwrap(), 1);
    let notification = h.tray.get(job_id).unwrap();
    assert!(notification.error.starts_with("Social:"));
}

#[tokio::test]
async fn success_on_retry_withdraws_the_notification() {
    let h = Harness::new().await;
    let job_id = h
        .enqueue(JobRecordFactory::watchlist_add(factories::MOVIE_ID, 1_000))
        .await;
    h.cloud.script([BackendOutcome::ServerError]);
    let processor = h.processor();

    let first = processor.process().await.unwrap();
    assert!(first.blocked);
    assert!(h.tray.get(job_id).is_some());

    let second = processor.process().await.unwrap();
    assert_eq!(second.delivered, 1);
    assert!(h.tray.get(job_id).is_none());
    assert_eq!(h.store.count().await.unwrap(), 0);
}

// ================================================================================================
// PERMANENT FAILURES
// ================================================================================================

#[tokio::test]
async fn not_found_removes_job_with_one_notification() {
    let h = Harness::new().await;
    let job_id = h
        .enqueue(JobRecordFactory::watched(SHOW_ID, EpisodeFlag::Watched, 1_000))
        .await;
    h.social.script([BackendOutcome::NotFound]);

    let report = h.processor().process().await.unwrap();

    assert_eq!(report.removed, 1);
    assert_eq!(report.notified, 1);
    assert_eq!(report.delivered, 0);
    assert_eq!(h.store.count().await.unwrap(), 0);

    assert_eq!(h.tray.len(), 1);
    let notification = h.tray.get(job_id).unwrap();
    assert_eq!(notification.item, "Dark 1x01");
    assert_eq!(notification.action, "Set watched");
    assert_eq!(notification.content_target, Some(ContentTarget::Show(SHOW_ID)));
    assert_eq!(notification.title(), "Set watched failed: Dark 1x01");
}

#[tokio::test]
async fn client_error_on_cloud_still_attempts_social() {
    let h = Harness::new().await;
    let job_id = h
        .enqueue(JobRecordFactory::watchlist_add(factories::MOVIE_ID, 1_000))
        .await;
    h.cloud.script([BackendOutcome::ClientError]);
    h.social.script([BackendOutcome::NotFound]);

    let report = h.processor().process().await.unwrap();

    assert_eq!(
        h.calls(),
        vec![(BackendKind::Cloud, 1_000), (BackendKind::Social, 1_000)]
    );
    assert_eq!(report.removed, 1);
    assert!(!report.blocked);

    // Both failures end up in one notification
    assert_eq!(h.tray.len(), 1);
    let notification = h.tray.get(job_id).unwrap();
    assert!(notification.error.contains("Cloud:"));
    assert!(notification.error.contains("Social:"));
    assert_eq!(notification.item, factories::MOVIE_TITLE);
    assert_eq!(
        notification.content_target,
        Some(ContentTarget::Movie(factories::MOVIE_ID))
    );
}

#[tokio::test]
async fn skipped_episodes_never_reach_social() {
    let h = Harness::new().await;
    h.enqueue(JobRecordFactory::skipped(SHOW_ID, 1_000)).await;

    let report = h.processor().process().await.unwrap();

    assert_eq!(h.calls(), vec![(BackendKind::Cloud, 1_000)]);
    assert_eq!(report.delivered, 1);
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn disabled_backend_is_not_called() {
    let h = Harness::new().await;
    h.enqueue(JobRecordFactory::watchlist_add(factories::MOVIE_ID, 1_000))
        .await;
    h.social.set_enabled(false);

    h.processor().process().await.unwrap();

    assert_eq!(h.calls(), vec![(BackendKind::Cloud, 1_000)]);
    assert!(h.social.calls().is_empty());
}

// ================================================================================================
// CLEANUP
// ================================================================================================

#[tokio::test]
async fn no_enabled_backend_clears_the_queue() {
    let h = Harness::new().await;
    for i in 0..3 {
        h.enqueue(JobRecordFactory::watchlist_add(100 + i, 1_000 + i))
            .await;
    }
    h.cloud.set_enabled(false);
    h.social.set_enabled(false);

    let report = h.processor().process().await.unwrap();

    assert_eq!(report.cleared, 3);
    assert_eq!(report.processed, 0);
    assert!(h.calls().is_empty());
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn disconnect_during_a_pass_clears_instead_of_delivering() {
    let h = Harness::new().await;
    for i in 0..3 {
        h.enqueue(JobRecordFactory::watchlist_add(100 + i, 1_000 + i))
            .await;
    }
    h.cloud.disconnect_after(1);

    let report = h
        .processor_with(vec![h.cloud.clone() as Arc<dyn SyncBackend>])
        .process()
        .await
        .unwrap();

    assert_eq!(h.calls(), vec![(BackendKind::Cloud, 1_000)]);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(report.cleared, 2);
    assert!(!report.blocked);
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn remove_obsolete_jobs_keeps_queue_while_a_backend_is_enabled() {
    let h = Harness::new().await;
    h.enqueue(JobRecordFactory::watchlist_add(factories::MOVIE_ID, 1_000))
        .await;
    let processor = h.processor();

    h.cloud.set_enabled(false);
    assert_eq!(processor.remove_obsolete_jobs().await.unwrap(), 0);
    assert_eq!(h.store.count().await.unwrap(), 1);

    h.social.set_enabled(false);
    assert_eq!(processor.remove_obsolete_jobs().await.unwrap(), 1);
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn corrupt_payload_is_dropped_and_pass_continues() {
    let h = Harness::new().await;
    db::insert_raw_job(&h.database, 500, 99, &[0x08, 0x01]);
    db::insert_raw_job(&h.database, 600, 1, &[0xff, 0xff, 0xff]);
    h.enqueue(JobRecordFactory::watchlist_add(factories::MOVIE_ID, 1_000))
        .await;

    let report = h.processor().process().await.unwrap();

    assert_eq!(report.corrupt, 2);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.removed, 3);
    assert_eq!(h.calls().len(), 2);
    assert!(h.tray.is_empty());
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn mocked_backend_is_called_once_per_job() {
    let h = Harness::new().await;
    h.enqueue(JobRecordFactory::watchlist_add(factories::MOVIE_ID, 1_000))
        .await;
    h.enqueue(JobRecordFactory::watchlist_add(factories::MOVIE_ID, 1_001))
        .await;

    let mut backend = MockBackend::new();
    backend.expect_kind().return_const(BackendKind::Cloud);
    backend.expect_is_enabled().return_const(true);
    backend.expect_supports().return_const(true);
    backend
        .expect_deliver()
        .times(2)
        .returning(|_| JobResult::success());

    let report = h
        .processor_with(vec![Arc::new(backend) as Arc<dyn SyncBackend>])
        .process()
        .await
        .unwrap();

    assert_eq!(report.delivered, 2);
    assert_eq!(h.store.count().await.unwrap(), 0);
}
