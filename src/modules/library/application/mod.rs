pub mod flag_executor;

pub use flag_executor::{FlagJobExecutor, FlagJobOutcome};
