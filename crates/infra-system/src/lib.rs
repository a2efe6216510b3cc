// Droidlink Infrastructure - System Adapters
// Implements: ProcessExecutor, tool discovery

pub mod subprocess_executor;
pub mod tool_locator;

pub use subprocess_executor::SubprocessExecutor;
pub use tool_locator::{BridgeTool, ToolLocator};
