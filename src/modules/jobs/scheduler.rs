/// Background trigger for drain passes
///
/// A single worker runs the processor periodically and whenever a sync is
/// requested. Requests made while a pass is running collapse into one
/// follow-up pass.
use crate::modules::jobs::processor::{DrainReport, JobProcessor};
use crate::shared::errors::AppResult;
use crate::{log_error, log_info};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Cheap handle used to ask for a sync pass.
#[derive(Debug, Clone, Default)]
pub struct SyncTrigger {
    notify: Arc<Notify>,
}

impl SyncTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a pass. Coalesces with requests that have not been served.
    pub fn request(&self) {
        self.notify.notify_one();
    }

    /// Wait for the next request.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}

pub struct SyncScheduler {
    processor: Arc<JobProcessor>,
    trigger: SyncTrigger,
    interval: Duration,
    cancel: CancellationToken,
    is_running: Arc<RwLock<bool>>,
    passes: AtomicU64,
    last_report: RwLock<Option<DrainReport>>,
}

impl SyncScheduler {
    pub fn new(processor: Arc<JobProcessor>, trigger: SyncTrigger, interval: Duration) -> Self {
        Self {
            processor,
            trigger,
            interval,
            cancel: CancellationToken::new(),
            is_running: Arc::new(RwLock::new(false)),
            passes: AtomicU64::new(0),
            last_report: RwLock::new(None),
        }
    }

    /// Spawn the worker on the current runtime.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run().await })
    }

    /// Worker loop. Runs a pass right away, then on every tick or request
    /// until stopped.
    pub async fn run(self: Arc<Self>) {
        log_info!("Sync scheduler started (interval {:?})", self.interval);
        *self.is_running.write().await = true;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = self.trigger.notified() => {}
                _ = ticker.tick() => {}
            }

            self.run_pass().await;
        }

        *self.is_running.write().await = false;
        log_info!("Sync scheduler stopped");
    }

    async fn run_pass(&self) {
        match self.processor.process().await {
            Ok(report) => {
                self.passes.fetch_add(1, Ordering::Relaxed);
                *self.last_report.write().await = Some(report);
            }
            // The queue is persisted; the next trigger starts over from it
            Err(e) => log_error!("Sync pass failed: {}", e),
        }
    }

    pub fn request_sync(&self) {
        self.trigger.request();
    }

    /// Stop after the pass in progress, if any.
    pub fn stop(&self) {
        self.cancel.cancel();
        log_info!("Sync scheduler stop requested");
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get statistics about the scheduler and job queue
    pub async fn get_statistics(&self) -> AppResult<SchedulerStatistics> {
        Ok(SchedulerStatistics {
            is_running: self.is_running().await,
            passes_completed: self.passes.load(Ordering::Relaxed),
            pending_jobs: self.processor.pending_count().await?,
            last_report: self.last_report.read().await.clone(),
        })
    }
}

/// Scheduler statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatistics {
    pub is_running: bool,
    pub passes_completed: u64,
    pub pending_jobs: i64,
    pub last_report: Option<DrainReport>,
}
