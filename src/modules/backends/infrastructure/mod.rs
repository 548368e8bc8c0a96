pub mod cloud;
pub mod http_client;
pub mod social;

pub use cloud::CloudBackend;
pub use http_client::{BackendClient, RetryPolicy};
pub use social::SocialBackend;
