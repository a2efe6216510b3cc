// Output Parsers
//
// Pure transforms over one blob of bridge tool output. Detail parsers are
// fail-soft: a missing or malformed field yields the field's "unknown"
// default, never an error.

use super::device::{DeviceInfo, DeviceStatus};

/// Battery dump marker
pub const BATTERY_LEVEL_MARKER: &str = "level:";

/// Screen size report marker
pub const PHYSICAL_SIZE_MARKER: &str = "Physical size:";

/// Interface whose route carries the device's LAN address
pub const WIFI_INTERFACE: &str = "wlan0";

/// Route table token preceding the source address
pub const ROUTE_SRC_TOKEN: &str = "src";

/// Parse the device-list report.
///
/// The first line is a header and is dropped without looking at it. Every
/// other non-blank line contributes one device if it has at least two
/// whitespace-separated tokens (`<id> <status> ...`).
pub fn parse_device_list(output: &str) -> Vec<DeviceInfo> {
    output
        .trim()
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (Some(id), Some(status)) => {
                    Some(DeviceInfo::new(id, DeviceStatus::from_token(status)))
                }
                _ => None,
            }
        })
        .collect()
}

/// Single-line property value; empty means the property is absent
pub fn parse_property(output: &str) -> String {
    output.trim().to_string()
}

/// Battery level from `dumpsys battery`.
///
/// Only the first line containing `level:` is considered. Returns `None` when
/// there is no such line, or its value is not a percentage.
pub fn parse_battery_level(output: &str) -> Option<u8> {
    let line = output
        .lines()
        .find(|line| line.contains(BATTERY_LEVEL_MARKER))?;
    let value = line.split(':').nth(1)?.trim();
    value.parse::<u8>().ok().filter(|level| *level <= 100)
}

/// Physical screen size from `wm size`, empty if the marker is missing
pub fn parse_screen_size(output: &str) -> String {
    output
        .split_once(PHYSICAL_SIZE_MARKER)
        .map(|(_, rest)| rest.lines().next().unwrap_or_default().trim().to_string())
        .unwrap_or_default()
}

/// LAN address from `ip route`: the first token after `src` on the first
/// line mentioning both the wifi interface and `src`
pub fn parse_ip_address(output: &str) -> String {
    output
        .lines()
        .find(|line| line.contains(WIFI_INTERFACE) && line.contains(ROUTE_SRC_TOKEN))
        .and_then(|line| line.split_once(ROUTE_SRC_TOKEN))
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Connect confirmation. Case-insensitive substring, as the bridge tool
/// prints both "connected to" and "already connected to".
pub fn is_connect_confirmed(output: &str) -> bool {
    output.to_lowercase().contains("connected")
}

/// Network-mode switch confirmation ("restarting in TCP mode port: 5555")
pub fn is_tcpip_confirmed(output: &str) -> bool {
    output.to_lowercase().contains("restarting")
}

/// Package install confirmation. Case-sensitive: "Success" exactly.
pub fn is_install_confirmed(output: &str) -> bool {
    output.contains("Success")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_LIST: &str = "List of devices attached\n\
        emulator-5554          device product:sdk_gphone64 model:sdk_gphone64 transport_id:1\n\
        R58M123ABC             unauthorized usb:1-1 transport_id:2\n\
        \n\
        192.168.1.5:5555       offline transport_id:3\n\
        lonely\n";

    #[test]
    fn test_device_list_skips_header_and_short_lines() {
        let devices = parse_device_list(DEVICE_LIST);
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].id(), "emulator-5554");
        assert_eq!(devices[0].status, DeviceStatus::Device);
        assert_eq!(devices[1].status, DeviceStatus::Unauthorized);
        assert_eq!(devices[2].id(), "192.168.1.5:5555");
        assert_eq!(devices[2].status, DeviceStatus::Offline);
        assert!(devices.iter().all(|d| d.model.is_empty()));
    }

    #[test]
    fn test_device_list_header_is_not_validated() {
        // Whatever the first line says, it is dropped
        let devices = parse_device_list("abc device\ndef device\n");
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id(), "def");
    }

    #[test]
    fn test_device_list_empty() {
        assert!(parse_device_list("").is_empty());
        assert!(parse_device_list("List of devices attached\n\n").is_empty());
    }

    #[test]
    fn test_property_is_trimmed() {
        assert_eq!(parse_property("Pixel 7\r\n"), "Pixel 7");
        assert_eq!(parse_property("\n"), "");
    }

    #[test]
    fn test_battery_level() {
        let dump = "Current Battery Service state:\n  AC powered: false\n  level: 87\n  scale: 100\n";
        assert_eq!(parse_battery_level(dump), Some(87));
        assert_eq!(parse_battery_level("  AC powered: true\n  scale: 100\n"), None);
    }

    #[test]
    fn test_battery_level_first_match_only() {
        // The first `level:` line decides, even when it is malformed
        let dump = "  level: n/a\n  level: 50\n";
        assert_eq!(parse_battery_level(dump), None);
        assert_eq!(parse_battery_level("level: 250"), None);
    }

    #[test]
    fn test_screen_size() {
        assert_eq!(parse_screen_size("Physical size: 1080x2280\n"), "1080x2280");
        assert_eq!(
            parse_screen_size("Physical size: 1440x3120\nOverride size: 1080x2340\n"),
            "1440x3120"
        );
        assert_eq!(parse_screen_size("Override size: 720x1280"), "");
        assert_eq!(parse_screen_size(""), "");
    }

    #[test]
    fn test_ip_address() {
        let routes = "10.0.0.0/8 dev rmnet0 proto kernel scope link src 10.12.1.4\n\
            192.168.1.0/24 dev wlan0 proto kernel scope link src 192.168.1.42 \n";
        assert_eq!(parse_ip_address(routes), "192.168.1.42");
        assert_eq!(parse_ip_address("192.168.1.0/24 dev wlan0 scope link"), "");
        assert_eq!(parse_ip_address("dev wlan0 src"), "");
    }

    #[test]
    fn test_connect_marker() {
        assert!(is_connect_confirmed("connected to 192.168.1.5:5555"));
        assert!(is_connect_confirmed("already connected to 192.168.1.5:5555"));
        assert!(is_connect_confirmed("Connected to 192.168.1.5:5555"));
        // "connect" alone is not the marker
        assert!(!is_connect_confirmed("unable to connect to 192.168.1.5:5555"));
        assert!(!is_connect_confirmed(
            "failed to connect to '192.168.1.5:5555': Connection refused"
        ));
    }

    #[test]
    fn test_tcpip_marker() {
        assert!(is_tcpip_confirmed("restarting in TCP mode port: 5555"));
        assert!(is_tcpip_confirmed("Restarting in TCP mode"));
        assert!(!is_tcpip_confirmed("error: no devices/emulators found"));
    }

    #[test]
    fn test_install_marker_is_case_sensitive() {
        assert!(is_install_confirmed("Performing Streamed Install\nSuccess\n"));
        assert!(!is_install_confirmed("success"));
        assert!(!is_install_confirmed(
            "Failure [INSTALL_FAILED_VERSION_DOWNGRADE]"
        ));
    }
}
