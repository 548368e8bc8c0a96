/// Drains the job queue against every enabled backend
///
/// One pass at a time walks the queue oldest first. A job leaves the queue
/// once every enabled backend either accepted it or rejected it for good;
/// the first transient failure stops the pass so later jobs never overtake
/// an earlier one.
use crate::modules::backends::domain::{BackendKind, BackendRegistry, SyncBackend};
use crate::modules::jobs::describer::JobDescriber;
use crate::modules::jobs::domain::entities::JobRecord;
use crate::modules::jobs::domain::repository::{JobCursor, JobStore};
use crate::modules::jobs::domain::result::JobResult;
use crate::modules::jobs::notifier::{JobNotification, JobNotifier};
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::{log_debug, log_error, log_info};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

const DEFAULT_PAGE_SIZE: usize = 50;

/// Summary of one drain pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Jobs looked at, including the one that blocked the pass.
    pub processed: usize,
    pub delivered: usize,
    pub removed: usize,
    pub corrupt: usize,
    pub notified: usize,
    pub blocked: bool,
    /// Jobs dropped because no backend was enabled, including when the
    /// last one was disconnected during the pass.
    pub cleared: usize,
}

enum Disposition {
    Remove,
    Block,
    /// Every backend was disconnected before this job reached one.
    NoBackend,
}

pub struct JobProcessor {
    store: Arc<dyn JobStore>,
    backends: Arc<BackendRegistry>,
    notifier: Arc<dyn JobNotifier>,
    describer: JobDescriber,
    drain_lock: Mutex<()>,
    page_size: usize,
}

impl JobProcessor {
    pub fn new(
        store: Arc<dyn JobStore>,
        backends: Vec<Arc<dyn SyncBackend>>,
        notifier: Arc<dyn JobNotifier>,
        describer: JobDescriber,
    ) -> Self {
        Self {
            store,
            backends: Arc::new(BackendRegistry::new(backends)),
            notifier,
            describer,
            drain_lock: Mutex::new(()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The backends this processor delivers to.
    pub fn backends(&self) -> Arc<BackendRegistry> {
        Arc::clone(&self.backends)
    }

    pub async fn pending_count(&self) -> AppResult<i64> {
        self.store.count().await
    }

    /// Run one drain pass. Waits for a pass already in progress.
    pub async fn process(&self) -> AppResult<DrainReport> {
        let _guard = self.drain_lock.lock().await;
        let timer = TimedOperation::new("job_drain");

        if !self.backends.any_enabled() {
            let cleared = self.clear_queue().await?;
            timer.finish();
            return Ok(DrainReport {
                cleared,
                ..Default::default()
            });
        }

        let mut report = DrainReport::default();
        let mut to_remove = Vec::new();
        let mut cursor: Option<JobCursor> = None;
        let mut backends_gone = false;

        'drain: loop {
            let page = self.store.pending_after(cursor, self.page_size).await?;
            let page_len = page.len();

            for entry in &page {
                cursor = Some(JobCursor::from(entry));
                report.processed += 1;

                let record = match entry.to_record() {
                    Ok(record) => record,
                    Err(e) => {
                        log_error!("Dropping job {}: {}", entry.id, e);
                        report.corrupt += 1;
                        to_remove.push(entry.id);
                        continue;
                    }
                };

                let (disposition, notified) = self.deliver(entry.id, &record).await;
                if notified {
                    report.notified += 1;
                }
                match disposition {
                    Disposition::Remove => {
                        if !notified {
                            report.delivered += 1;
                        }
                        to_remove.push(entry.id);
                    }
                    Disposition::Block => {
                        report.blocked = true;
                        break 'drain;
                    }
                    Disposition::NoBackend => {
                        backends_gone = true;
                        break 'drain;
                    }
                }
            }

            if page_len < self.page_size {
                break;
            }
        }

        // Finished jobs leave the queue even when the pass was blocked
        if !to_remove.is_empty() {
            report.removed = self.store.remove(&to_remove).await?;
        }

        if backends_gone && !self.backends.any_enabled() {
            report.cleared = self.clear_queue().await?;
        }

        LogContext::drain_summary(report.delivered, report.removed, report.blocked);
        timer.finish_with_info(&format!("{} jobs", report.processed));

        Ok(report)
    }

    /// Drop every queued job when no backend is enabled any more.
    /// Returns the number of removed jobs.
    pub async fn remove_obsolete_jobs(&self) -> AppResult<usize> {
        let _guard = self.drain_lock.lock().await;
        if self.backends.any_enabled() {
            return Ok(0);
        }
        self.clear_queue().await
    }

    async fn clear_queue(&self) -> AppResult<usize> {
        let cleared = self.store.clear_all().await?;
        if cleared > 0 {
            log_info!("No backend enabled, removed {} queued jobs", cleared);
        }
        Ok(cleared)
    }

    /// Deliver one job to each enabled backend in order and notify once for
    /// any failure.
    async fn deliver(&self, job_id: i64, record: &JobRecord) -> (Disposition, bool) {
        let mut failures: Vec<(BackendKind, JobResult)> = Vec::new();
        let mut disposition = Disposition::Remove;
        let mut any_enabled = false;

        for backend in self.backends.iter() {
            // Re-read per job so a disconnect mid-pass applies right away
            if !backend.is_enabled() {
                continue;
            }
            any_enabled = true;
            if !backend.supports(record) {
                log_debug!(
                    "Job {} ({}) not supported by {}, skipping",
                    job_id,
                    record.action,
                    backend.kind()
                );
                continue;
            }

            let timer = TimedOperation::new("backend_call");
            let result = backend.deliver(record).await;
            LogContext::backend_call(
                backend.kind().display_name(),
                job_id,
                &result.outcome.to_string(),
                Some(timer.elapsed_ms()),
            );

            let blocks = result.outcome.blocks_queue();
            if result.outcome.notifies() {
                failures.push((backend.kind(), result));
            }
            if blocks {
                disposition = Disposition::Block;
                break;
            }
        }

        if !any_enabled {
            return (Disposition::NoBackend, false);
        }

        if failures.is_empty() {
            self.notifier.cancel(job_id);
            return (disposition, false);
        }

        let notification = self.notification_for(job_id, record, failures).await;
        self.notifier.notify(notification);
        (disposition, true)
    }

    async fn notification_for(
        &self,
        job_id: i64,
        record: &JobRecord,
        failures: Vec<(BackendKind, JobResult)>,
    ) -> JobNotification {
        let error = failures
            .iter()
            .map(|(kind, result)| {
                format!(
                    "{}: {}",
                    kind.display_name(),
                    result
                        .error
                        .clone()
                        .unwrap_or_else(|| result.outcome.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("; ");

        // The first failure decides where the notification leads
        let mut failures = failures.into_iter();
        let first = match failures.next() {
            Some((_, result)) => result,
            None => JobResult::success(),
        };
        let mut described = self.describer.describe_result(record, first).await;
        described.error = Some(error);

        JobNotification::from_result(job_id, &described, record.created_at_ms)
    }
}
