//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.
//! `DeviceInfo` and `CommandResult` are returned as-is from the core.

use droidlink_core::domain::{DeviceInfo, InputAction, MirrorOptions, PackageInstallResult};
use serde::{Deserialize, Serialize};

fn default_network_port() -> u16 {
    droidlink_core::application::orchestrator::constants::DEFAULT_NETWORK_PORT
}

/// devices.discover.v1 / devices.list.v1
#[derive(Debug, Clone, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceInfo>,
}

/// devices.get.v1
#[derive(Debug, Deserialize)]
pub struct DeviceRequest {
    pub device_id: String,
}

/// device.connect.v1 - Connect over the network
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub ip: String,
    #[serde(default = "default_network_port")]
    pub port: u16,
}

/// device.tcpip.v1 - Switch a USB device to network debugging
#[derive(Debug, Deserialize)]
pub struct TcpIpRequest {
    pub device_id: String,
    #[serde(default = "default_network_port")]
    pub port: u16,
}

/// device.install.v1
#[derive(Debug, Deserialize)]
pub struct InstallRequest {
    pub device_id: String,
    pub package_path: String,
}

/// device.install_batch.v1
#[derive(Debug, Deserialize)]
pub struct InstallBatchRequest {
    pub device_id: String,
    pub package_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallBatchResponse {
    pub results: Vec<PackageInstallResult>,
}

/// device.push.v1 / device.pull.v1
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub device_id: String,
    pub local_path: String,
    pub remote_path: String,
}

/// device.shell.v1
#[derive(Debug, Deserialize)]
pub struct ShellRequest {
    pub device_id: String,
    pub command: String,
}

/// device.screenshot.v1
#[derive(Debug, Deserialize)]
pub struct ScreenshotRequest {
    pub device_id: String,
    #[serde(default)]
    pub output_path: Option<String>,
}

/// device.record.v1
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub device_id: String,
    #[serde(default)]
    pub seconds: Option<u32>,
    #[serde(default)]
    pub output_path: Option<String>,
}

/// device.input.v1
#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub device_id: String,
    pub action: InputAction,
}

/// mirror.start.v1 - option fields sit next to `device_id`
#[derive(Debug, Default, Deserialize)]
pub struct MirrorRequest {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(flatten)]
    pub options: MirrorOptions,
}

/// admin.status.v1
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub bridge_tool: String,
    pub mirror_tool: Option<String>,
    pub signing_key_present: bool,
    pub cached_devices: usize,
    pub uptime_seconds: u64,
}
