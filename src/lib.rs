pub mod engine;
pub mod modules;
mod schema;
pub mod shared;

pub use engine::SyncEngine;
pub use shared::errors::{AppError, AppResult};
