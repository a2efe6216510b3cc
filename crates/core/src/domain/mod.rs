// Domain Layer - Device records, command lines and output parsing

pub mod bridge_command;
pub mod command;
pub mod device;
pub mod error;
pub mod options;
pub mod parse;

// Re-exports
pub use bridge_command::{tokenize_shell_command, BridgeCommand};
pub use command::{CommandResult, PackageInstallResult};
pub use device::{DeviceDetails, DeviceId, DeviceInfo, DeviceStatus};
pub use error::DomainError;
pub use options::{InputAction, MirrorOptions, RecordOptions};
