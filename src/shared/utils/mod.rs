pub mod logger;
pub mod time;
pub mod validation;

pub use validation::Validator;
