pub mod backends;
pub mod jobs;
pub mod library;
