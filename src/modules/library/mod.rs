/// Local library of shows, episodes and movies
///
/// - Domain: library entities, user flag jobs and the repository port
/// - Infrastructure: Diesel-based SQLite repository
/// - Application: serial executor that applies flag jobs and queues them
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{FlagJobExecutor, FlagJobOutcome};
pub use domain::{Episode, EpisodeScope, FlagJob, LibraryRepository, Movie, Show};
pub use infrastructure::LibraryRepositoryImpl;
