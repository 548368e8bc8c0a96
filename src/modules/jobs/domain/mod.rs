pub mod entities;
pub mod payload;
pub mod repository;
pub mod result;

pub use entities::{EpisodeFlag, EpisodeInfo, JobAction, JobQueueEntry, JobRecord};
pub use repository::{JobCursor, JobStatistics, JobStore};
pub use result::{BackendOutcome, ContentTarget, JobResult};
