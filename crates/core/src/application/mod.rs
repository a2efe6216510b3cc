// Application Layer - discovery and device operations

pub mod orchestrator;
pub mod registry;

// Re-exports
pub use orchestrator::{SessionOrchestrator, ToolPaths};
pub use registry::DeviceRegistry;
