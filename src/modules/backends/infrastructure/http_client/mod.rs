pub mod backend_client;
pub mod retry_policy;

pub use backend_client::{BackendClient, BackendResponse};
pub use retry_policy::RetryPolicy;
