// Shared kernel: errors, configuration, persistence and logging used by
// every module.

pub mod config; // Environment-driven configuration
pub mod errors; // Shared error types
pub mod infrastructure; // Shared infrastructure (database)
pub mod utils; // Shared utilities

// Re-exports for convenience
pub use config::SyncConfig;
pub use infrastructure::database::Database;
