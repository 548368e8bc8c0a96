pub mod entities;
pub mod flag_job;
pub mod repository;

pub use entities::{Episode, Movie, Show};
pub use flag_job::{EpisodeScope, FlagJob};
pub use repository::LibraryRepository;
