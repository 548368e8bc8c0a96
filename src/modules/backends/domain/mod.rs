pub mod backend;
pub mod registry;
pub mod settings;

pub use backend::{BackendKind, SyncBackend};
pub use registry::BackendRegistry;
pub use settings::{BackendAccount, BackendSettings};
