/// Serial executor for user flag changes
///
/// Each job is applied to the local library and, when a backend is enabled,
/// queued for delivery in the same transaction. Jobs run one at a time in
/// submission order, so the queue order always matches the order the user
/// made the changes in.
use crate::modules::backends::domain::BackendRegistry;
use crate::modules::jobs::domain::entities::{JobQueueEntry, JobRecord};
use crate::modules::jobs::scheduler::SyncTrigger;
use crate::modules::library::domain::{FlagJob, LibraryRepository};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::time::now_ms;
use crate::{log_debug, log_info, log_warn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

const QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagJobOutcome {
    /// The local library changed.
    pub applied_locally: bool,
    /// What changed, if anything.
    pub record: Option<JobRecord>,
    /// Set when the change was queued for the backends.
    pub queued: Option<JobQueueEntry>,
}

impl FlagJobOutcome {
    fn unchanged() -> Self {
        Self {
            applied_locally: false,
            record: None,
            queued: None,
        }
    }
}

struct FlagJobRequest {
    job: FlagJob,
    reply_tx: oneshot::Sender<AppResult<FlagJobOutcome>>,
}

struct LocalApply {
    library: Arc<dyn LibraryRepository>,
    backends: Arc<BackendRegistry>,
    trigger: SyncTrigger,
    serial: Mutex<()>,
}

impl LocalApply {
    async fn run(&self, job: FlagJob) -> AppResult<FlagJobOutcome> {
        let _guard = self.serial.lock().await;

        if !self.backends.any_enabled() {
            let Some(record) = self.library.apply(&job, now_ms()).await? else {
                log_debug!("{:?} matched nothing to change", job);
                return Ok(FlagJobOutcome::unchanged());
            };
            return Ok(FlagJobOutcome {
                applied_locally: true,
                record: Some(record),
                queued: None,
            });
        }

        let Some(entry) = self.library.apply_and_enqueue(&job, now_ms()).await? else {
            log_debug!("{:?} matched nothing to change", job);
            return Ok(FlagJobOutcome::unchanged());
        };

        let record = entry.to_record()?;
        log_info!(
            "Queued job {} ({} for {})",
            entry.id,
            record.action,
            record.target_id
        );
        self.trigger.request();

        Ok(FlagJobOutcome {
            applied_locally: true,
            record: Some(record),
            queued: Some(entry),
        })
    }
}

pub struct FlagJobExecutor {
    apply: Arc<LocalApply>,
    submit_tx: mpsc::Sender<FlagJobRequest>,
}

impl FlagJobExecutor {
    /// Spawn the worker on the current runtime. It stops once the executor
    /// is dropped.
    ///
    /// `backends` must be the registry the job processor drains with.
    pub fn start(
        library: Arc<dyn LibraryRepository>,
        backends: Arc<BackendRegistry>,
        trigger: SyncTrigger,
    ) -> Self {
        let apply = Arc::new(LocalApply {
            library,
            backends,
            trigger,
            serial: Mutex::new(()),
        });
        let (submit_tx, submit_rx) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(Self::run_worker(Arc::clone(&apply), submit_rx));

        Self { apply, submit_tx }
    }

    async fn run_worker(apply: Arc<LocalApply>, mut rx: mpsc::Receiver<FlagJobRequest>) {
        while let Some(request) = rx.recv().await {
            let result = apply.run(request.job).await;
            if let Err(e) = &result {
                log_warn!("Flag job {:?} failed: {}", request.job, e);
            }
            // Caller may have gone away; the change stays applied either way
            let _ = request.reply_tx.send(result);
        }
        log_debug!("Flag job worker stopped");
    }

    /// Hand a job to the worker and wait for it to finish.
    pub async fn submit(&self, job: FlagJob) -> AppResult<FlagJobOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit_tx
            .send(FlagJobRequest { job, reply_tx })
            .await
            .map_err(|_| AppError::InternalError("Flag job worker stopped".to_string()))?;

        reply_rx
            .await
            .map_err(|_| AppError::InternalError("Flag job worker dropped the reply".to_string()))?
    }

    /// Run a job on the caller's task, still serialized with the worker.
    pub async fn execute(&self, job: FlagJob) -> AppResult<FlagJobOutcome> {
        self.apply.run(job).await
    }
}
