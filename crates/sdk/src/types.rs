//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from api-rpc crate.

use serde::{Deserialize, Serialize};

/// One attached device as last discovered
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceInfo {
    pub id: String,
    /// `device`, `offline`, `unauthorized` or `unknown`
    pub status: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub android_version: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub battery_level: u8,
    #[serde(default)]
    pub screen_resolution: String,
}

/// Response carrying a device list
#[derive(Debug, Clone, Deserialize)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceInfo>,
}

/// Uniform outcome of a device operation
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub pid: Option<u32>,
}

/// One entry of a batch install
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageInstallResult {
    pub package_path: String,
    pub result: CommandResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallBatchResponse {
    pub results: Vec<PackageInstallResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceRequest {
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectRequest {
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct TcpIpRequest {
    pub device_id: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallRequest {
    pub device_id: String,
    pub package_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallBatchRequest {
    pub device_id: String,
    pub package_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    pub device_id: String,
    pub local_path: String,
    pub remote_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShellRequest {
    pub device_id: String,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenshotRequest {
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordRequest {
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

/// Input event to inject
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputAction {
    Tap { x: u32, y: u32 },
    Swipe {
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration_ms: u32,
    },
    Text { text: String },
    #[serde(rename = "keyevent")]
    KeyEvent { keycode: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct InputRequest {
    pub device_id: String,
    pub action: InputAction,
}

/// Mirroring launch request; unset options use the daemon's defaults
#[derive(Debug, Clone, Default, Serialize)]
pub struct MirrorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stay_awake: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_touches: Option<bool>,
}

/// Daemon status
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub bridge_tool: String,
    pub mirror_tool: Option<String>,
    pub signing_key_present: bool,
    pub cached_devices: usize,
    pub uptime_seconds: u64,
}
