/// Network job queue
///
/// Every user change that must reach a remote backend is persisted as a job
/// and delivered in creation order.
///
/// Architecture:
/// - Domain: job entities, payload codec, delivery outcomes, store trait
/// - Infrastructure: Diesel-based SQLite job store
/// - Processor: drain pass over all enabled backends
/// - Notifier/Describer: user-facing failure notifications
/// - Scheduler: periodic and on-demand drain trigger
pub mod describer;
pub mod domain;
pub mod infrastructure;
pub mod notifier;
pub mod processor;
pub mod scheduler;

// Re-exports for easy access
pub use describer::{JobDescriber, JobDescription};
pub use domain::{
    entities::{EpisodeFlag, EpisodeInfo, JobAction, JobQueueEntry, JobRecord},
    repository::{JobCursor, JobStatistics, JobStore},
    result::{BackendOutcome, ContentTarget, JobResult},
};
pub use infrastructure::JobStoreImpl;
pub use notifier::{JobNotification, JobNotifier, NotificationTray};
pub use processor::{DrainReport, JobProcessor};
pub use scheduler::{SchedulerStatistics, SyncScheduler, SyncTrigger};
