// Port Layer - Interfaces for external dependencies

pub mod process_executor;
pub mod time_provider;

// Re-exports
pub use process_executor::{DetachedProcess, ExecutionError, ExecutionOutcome, ProcessExecutor};
pub use time_provider::TimeProvider;
