//! Composition root: wires storage, backends, the drain processor, the
//! scheduler and the flag executor together.

use crate::modules::backends::domain::{BackendAccount, BackendKind, BackendSettings, SyncBackend};
use crate::modules::backends::infrastructure::{BackendClient, CloudBackend, SocialBackend};
use crate::modules::jobs::{
    DrainReport, JobDescriber, JobProcessor, JobStore, JobStoreImpl, NotificationTray,
    SchedulerStatistics, SyncScheduler, SyncTrigger,
};
use crate::modules::library::{
    FlagJob, FlagJobExecutor, FlagJobOutcome, LibraryRepository, LibraryRepositoryImpl,
};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::{Database, SyncConfig};
use crate::log_info;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct SyncEngine {
    database: Database,
    library: Arc<dyn LibraryRepository>,
    store: Arc<dyn JobStore>,
    settings: Arc<BackendSettings>,
    notifications: Arc<NotificationTray>,
    processor: Arc<JobProcessor>,
    scheduler: Arc<SyncScheduler>,
    executor: FlagJobExecutor,
}

impl SyncEngine {
    /// Open the database, run migrations and create a backend for every
    /// configured service. Must be called inside a Tokio runtime.
    pub fn build(config: &SyncConfig) -> AppResult<Self> {
        let database = Database::open(&config.database_url)?;
        database.run_migrations()?;

        let settings = Arc::new(BackendSettings::from_config(config));
        let mut backends: Vec<Arc<dyn SyncBackend>> = Vec::new();

        if let Some(cloud) = &config.cloud {
            backends.push(Arc::new(CloudBackend::new(
                BackendClient::for_cloud(config.timeouts)?,
                cloud.base_url.clone(),
                Arc::clone(&settings),
            )));
        }
        if let Some(social) = &config.social {
            backends.push(Arc::new(SocialBackend::new(
                BackendClient::for_social(config.timeouts)?,
                social.base_url.clone(),
                social.client_id.clone(),
                Arc::clone(&settings),
            )));
        }

        log_info!(
            "Sync engine configured with backends: {:?}",
            settings.enabled_kinds()
        );

        Ok(Self::with_parts(
            database,
            backends,
            settings,
            config.sync_interval,
        ))
    }

    /// Wire an engine from already built parts. The database must be
    /// migrated. Must be called inside a Tokio runtime.
    pub fn with_parts(
        database: Database,
        backends: Vec<Arc<dyn SyncBackend>>,
        settings: Arc<BackendSettings>,
        sync_interval: Duration,
    ) -> Self {
        let library: Arc<dyn LibraryRepository> =
            Arc::new(LibraryRepositoryImpl::new(database.pool().clone()));
        let store: Arc<dyn JobStore> = Arc::new(JobStoreImpl::new(database.pool().clone()));
        let notifications = Arc::new(NotificationTray::new());

        let processor = Arc::new(JobProcessor::new(
            Arc::clone(&store),
            backends,
            notifications.clone(),
            JobDescriber::new(Arc::clone(&library)),
        ));

        let trigger = SyncTrigger::new();
        let scheduler = Arc::new(SyncScheduler::new(
            Arc::clone(&processor),
            trigger.clone(),
            sync_interval,
        ));
        let executor = FlagJobExecutor::start(Arc::clone(&library), processor.backends(), trigger);

        Self {
            database,
            library,
            store,
            settings,
            notifications,
            processor,
            scheduler,
            executor,
        }
    }

    /// Start periodic and on-demand drain passes.
    pub fn start(&self) -> JoinHandle<()> {
        self.scheduler.start()
    }

    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Apply a user change locally and queue it for the backends.
    pub async fn submit(&self, job: FlagJob) -> AppResult<FlagJobOutcome> {
        self.executor.submit(job).await
    }

    /// Run one drain pass right away on the caller's task.
    pub async fn sync_now(&self) -> AppResult<DrainReport> {
        self.processor.process().await
    }

    pub fn request_sync(&self) {
        self.scheduler.request_sync();
    }

    /// Sign in to a backend and request a sync. Fails for a backend this
    /// engine has no adapter for, since nothing could deliver its jobs.
    pub fn connect(&self, kind: BackendKind, account: BackendAccount) -> AppResult<()> {
        if !self.processor.backends().contains(kind) {
            return Err(AppError::ConfigError(format!(
                "{} is not configured",
                kind.display_name()
            )));
        }
        self.settings.connect(kind, account);
        self.scheduler.request_sync();
        Ok(())
    }

    /// Disconnect a backend. Once none is left the queue is dropped.
    /// Returns the number of removed jobs.
    pub async fn disconnect(&self, kind: BackendKind) -> AppResult<usize> {
        self.settings.disconnect(kind);
        self.processor.remove_obsolete_jobs().await
    }

    pub async fn statistics(&self) -> AppResult<SchedulerStatistics> {
        self.scheduler.get_statistics().await
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn library(&self) -> Arc<dyn LibraryRepository> {
        Arc::clone(&self.library)
    }

    pub fn store(&self) -> Arc<dyn JobStore> {
        Arc::clone(&self.store)
    }

    pub fn settings(&self) -> Arc<BackendSettings> {
        Arc::clone(&self.settings)
    }

    pub fn notifications(&self) -> Arc<NotificationTray> {
        Arc::clone(&self.notifications)
    }

    pub fn scheduler(&self) -> Arc<SyncScheduler> {
        Arc::clone(&self.scheduler)
    }
}
