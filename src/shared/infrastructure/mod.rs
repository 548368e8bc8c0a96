/// Shared infrastructure concerns
///
/// SQLite connection pool and embedded migrations used by the job store
/// and the local library.
pub mod database;

// Re-exports for convenience
pub use database::{Database, DbConnection, DbPool};
