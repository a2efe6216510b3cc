// Orchestrator constants (no magic values)

/// Default port for network debugging (`connect` and `tcpip`)
pub const DEFAULT_NETWORK_PORT: u16 = 5555;

/// Scratch location for screenshots on the device
pub const REMOTE_SCREENSHOT_PATH: &str = "/sdcard/screenshot.png";

/// Scratch location for screen recordings on the device
pub const REMOTE_RECORDING_PATH: &str = "/sdcard/recording.mp4";

/// Message when the transfer tool prints nothing on success
pub const PUSH_OK_MESSAGE: &str = "File pushed successfully";
pub const PULL_OK_MESSAGE: &str = "File pulled successfully";
