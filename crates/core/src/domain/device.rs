// Device Domain Model

use serde::{Deserialize, Serialize};

/// Bridge-assigned device identifier (serial or `ip:port` for network devices)
pub type DeviceId = String;

/// Connection state reported by the bridge tool's device list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Device,
    Offline,
    Unauthorized,
    Unknown,
}

impl DeviceStatus {
    /// Map the bridge tool's status token. Anything unrecognised is `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "device" => DeviceStatus::Device,
            "offline" => DeviceStatus::Offline,
            "unauthorized" => DeviceStatus::Unauthorized,
            _ => DeviceStatus::Unknown,
        }
    }

    /// Only devices in this state answer shell queries
    pub fn is_online(&self) -> bool {
        matches!(self, DeviceStatus::Device)
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceStatus::Device => write!(f, "device"),
            DeviceStatus::Offline => write!(f, "offline"),
            DeviceStatus::Unauthorized => write!(f, "unauthorized"),
            DeviceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Last-known state of one device.
///
/// Detail fields use sentinel defaults for "unknown": empty strings and a
/// battery level of 0. Firmware variance makes absence common, so these are
/// not modelled as `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    id: DeviceId,
    pub status: DeviceStatus,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub android_version: String,
    #[serde(default)]
    pub ip_address: String,
    /// 0-100, 0 means unknown
    #[serde(default)]
    pub battery_level: u8,
    #[serde(default)]
    pub screen_resolution: String,
}

impl DeviceInfo {
    /// Create a partially-populated record as produced by the device list
    pub fn new(id: impl Into<DeviceId>, status: DeviceStatus) -> Self {
        Self {
            id: id.into(),
            status,
            model: String::new(),
            android_version: String::new(),
            ip_address: String::new(),
            battery_level: 0,
            screen_resolution: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Apply gathered details field by field.
    ///
    /// Every detail field is replaced wholesale; the id and status are never
    /// touched.
    pub fn apply_details(&mut self, details: DeviceDetails) {
        self.model = details.model;
        self.android_version = details.android_version;
        self.ip_address = details.ip_address;
        self.battery_level = details.battery_level;
        self.screen_resolution = details.screen_resolution;
    }
}

/// Result of one detail-gathering pass. Each field falls back to its
/// "unknown" default independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDetails {
    pub model: String,
    pub android_version: String,
    pub ip_address: String,
    pub battery_level: u8,
    pub screen_resolution: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_token() {
        assert_eq!(DeviceStatus::from_token("device"), DeviceStatus::Device);
        assert_eq!(DeviceStatus::from_token("offline"), DeviceStatus::Offline);
        assert_eq!(
            DeviceStatus::from_token("unauthorized"),
            DeviceStatus::Unauthorized
        );
        assert_eq!(DeviceStatus::from_token("recovery"), DeviceStatus::Unknown);
        // Tokens are case-sensitive, as the bridge tool prints them
        assert_eq!(DeviceStatus::from_token("Device"), DeviceStatus::Unknown);
    }

    #[test]
    fn test_apply_details_replaces_all_detail_fields() {
        let mut device = DeviceInfo::new("emulator-5554", DeviceStatus::Device);
        device.apply_details(DeviceDetails {
            model: "Pixel 7".to_string(),
            android_version: "14".to_string(),
            ip_address: "192.168.1.42".to_string(),
            battery_level: 87,
            screen_resolution: "1080x2400".to_string(),
        });
        assert_eq!(device.model, "Pixel 7");
        assert_eq!(device.battery_level, 87);

        // A later pass with nothing found resets to defaults, no merging
        device.apply_details(DeviceDetails::default());
        assert_eq!(device.id(), "emulator-5554");
        assert_eq!(device.status, DeviceStatus::Device);
        assert!(device.model.is_empty());
        assert_eq!(device.battery_level, 0);
    }

    #[test]
    fn test_serializes_with_lowercase_status() {
        let device = DeviceInfo::new("R58M123", DeviceStatus::Unauthorized);
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["id"], "R58M123");
        assert_eq!(json["status"], "unauthorized");
        assert_eq!(json["battery_level"], 0);
    }
}
