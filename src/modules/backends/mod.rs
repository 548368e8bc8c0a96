/// Remote sync backends
///
/// - Domain: backend kinds, the `SyncBackend` port, the registry of built
///   adapters and account settings
/// - Infrastructure: shared HTTP client and the cloud and social adapters
pub mod domain;
pub mod infrastructure;

pub use domain::{BackendAccount, BackendKind, BackendRegistry, BackendSettings, SyncBackend};
pub use infrastructure::{BackendClient, CloudBackend, RetryPolicy, SocialBackend};
