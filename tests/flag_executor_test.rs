/// Flag job executor tests
///
/// Tests cover:
/// - Local apply followed by enqueue and a sync request
/// - Offline use without enabled backends
/// - Failures and no-op changes leaving the queue alone
/// - A failed enqueue rolling back the local change
/// - Accounts without a built backend never queueing
/// - Submission order preserved in the queue
mod utils;

use futures::future::join_all;
use showsync::modules::backends::{
    BackendAccount, BackendClient, BackendKind, BackendRegistry, BackendSettings, CloudBackend,
    SyncBackend,
};
use showsync::modules::jobs::{EpisodeFlag, JobStore, JobStoreImpl, SyncTrigger};
use showsync::modules::library::{FlagJob, FlagJobExecutor, LibraryRepository, LibraryRepositoryImpl};
use showsync::shared::config::HttpTimeouts;
use showsync::shared::Database;
use showsync::AppError;
use std::sync::Arc;
use std::time::Duration;
use utils::db;
use utils::factories::{episode_id, seed_library, MOVIE_ID, SHOW_ID};

struct Harness {
    database: Database,
    store: Arc<JobStoreImpl>,
    library: Arc<LibraryRepositoryImpl>,
    settings: Arc<BackendSettings>,
    trigger: SyncTrigger,
    executor: FlagJobExecutor,
}

/// Registry holding only a cloud adapter; it is never called here.
fn cloud_only(settings: &Arc<BackendSettings>) -> Arc<BackendRegistry> {
    let cloud = CloudBackend::new(
        BackendClient::for_cloud(HttpTimeouts::default()).unwrap(),
        "http://127.0.0.1:9".to_string(),
        Arc::clone(settings),
    );
    Arc::new(BackendRegistry::new(vec![
        Arc::new(cloud) as Arc<dyn SyncBackend>
    ]))
}

async fn harness(connected: bool) -> Harness {
    let database = db::fresh_database();
    let store = db::job_store(&database);
    let library = db::library(&database);
    seed_library(library.as_ref()).await;

    let settings = Arc::new(BackendSettings::new());
    if connected {
        settings.connect(
            BackendKind::Cloud,
            BackendAccount::new(Some("me@example.com".to_string()), "token"),
        );
    }
    let trigger = SyncTrigger::new();
    let executor = FlagJobExecutor::start(
        library.clone(),
        cloud_only(&settings),
        trigger.clone(),
    );

    Harness {
        database,
        store,
        library,
        settings,
        trigger,
        executor,
    }
}

async fn sync_requested(trigger: &SyncTrigger) -> bool {
    tokio::time::timeout(Duration::from_millis(100), trigger.notified())
        .await
        .is_ok()
}

#[tokio::test]
async fn submit_applies_queues_and_requests_sync() {
    let h = harness(true).await;

    let outcome = h
        .executor
        .submit(FlagJob::EpisodeWatched {
            episode_id: episode_id(1, 1),
            flag: EpisodeFlag::Watched,
        })
        .await
        .unwrap();

    assert!(outcome.applied_locally);
    let entry = outcome.queued.unwrap();
    let record = outcome.record.unwrap();
    assert_eq!(record.target_id, SHOW_ID);
    assert_eq!(record.created_at_ms, entry.created_at_ms);
    assert_eq!(h.store.count().await.unwrap(), 1);
    assert!(sync_requested(&h.trigger).await);
}

#[tokio::test]
async fn offline_changes_apply_without_queueing() {
    let h = harness(false).await;

    let outcome = h
        .executor
        .submit(FlagJob::MovieWatchlist {
            movie_tmdb_id: MOVIE_ID,
            in_watchlist: true,
        })
        .await
        .unwrap();

    assert!(outcome.applied_locally);
    assert!(outcome.record.is_some());
    assert!(outcome.queued.is_none());
    assert_eq!(h.store.count().await.unwrap(), 0);
    assert!(!sync_requested(&h.trigger).await);
}

#[tokio::test]
async fn failed_apply_queues_nothing() {
    let h = harness(true).await;

    let err = h
        .executor
        .submit(FlagJob::EpisodeWatched {
            episode_id: 4_242,
            flag: EpisodeFlag::Watched,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn unchanged_scope_queues_nothing() {
    let h = harness(true).await;

    let outcome = h
        .executor
        .execute(FlagJob::SeasonCollected {
            show_tmdb_id: SHOW_ID,
            season: 7,
            collected: true,
        })
        .await
        .unwrap();

    assert!(!outcome.applied_locally);
    assert!(outcome.record.is_none());
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn rapid_submissions_queue_in_order() {
    let h = harness(true).await;
    let flags: Vec<EpisodeFlag> = (0..8)
        .map(|i| {
            if i % 2 == 0 {
                EpisodeFlag::Watched
            } else {
                EpisodeFlag::Unwatched
            }
        })
        .collect();

    let results = join_all(flags.iter().map(|flag| {
        h.executor.submit(FlagJob::EpisodeWatched {
            episode_id: episode_id(1, 3),
            flag: *flag,
        })
    }))
    .await;
    assert!(results.iter().all(|r| r.is_ok()));

    let queued: Vec<EpisodeFlag> = h
        .store
        .pending_after(None, 100)
        .await
        .unwrap()
        .iter()
        .filter_map(|entry| entry.to_record().unwrap().episode_flag())
        .collect();
    assert_eq!(queued, flags);
}

#[tokio::test]
async fn disconnecting_stops_queueing() {
    let h = harness(true).await;
    h.settings.disconnect(BackendKind::Cloud);

    let outcome = h
        .executor
        .execute(FlagJob::MovieCollection {
            movie_tmdb_id: MOVIE_ID,
            in_collection: true,
        })
        .await
        .unwrap();

    assert!(outcome.applied_locally);
    assert!(outcome.queued.is_none());
}

#[tokio::test]
async fn failed_enqueue_rolls_back_the_local_change() {
    let h = harness(true).await;
    db::reject_job_inserts(&h.database);

    let err = h
        .executor
        .submit(FlagJob::EpisodeWatched {
            episode_id: episode_id(1, 1),
            flag: EpisodeFlag::Watched,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DatabaseError(_)));
    let episode = h
        .library
        .find_episode(episode_id(1, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(episode.watched, EpisodeFlag::Unwatched);
    assert_eq!(episode.plays, 0);
    assert_eq!(h.store.count().await.unwrap(), 0);
    assert!(!sync_requested(&h.trigger).await);
}

#[tokio::test]
async fn account_without_a_backend_does_not_queue() {
    let h = harness(false).await;
    // Signed in to a service this process has no adapter for
    h.settings
        .connect(BackendKind::Social, BackendAccount::new(None, "token"));

    let outcome = h
        .executor
        .submit(FlagJob::MovieWatchlist {
            movie_tmdb_id: MOVIE_ID,
            in_watchlist: true,
        })
        .await
        .unwrap();

    assert!(outcome.applied_locally);
    assert!(outcome.queued.is_none());
    assert_eq!(h.store.count().await.unwrap(), 0);
}
