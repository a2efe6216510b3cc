// Detail-gathering for one online device

use super::SessionOrchestrator;
use crate::domain::bridge_command::{PROP_ANDROID_VERSION, PROP_MODEL};
use crate::domain::parse::{
    parse_battery_level, parse_ip_address, parse_property, parse_screen_size,
};
use crate::domain::{BridgeCommand, DeviceDetails};
use tracing::{debug, info_span, warn, Instrument};

impl SessionOrchestrator {
    /// Query model, version, battery, screen size and IP concurrently.
    ///
    /// Each field is independent: a query that cannot run, or output that
    /// does not parse, leaves only that field at its default.
    pub(super) async fn gather_details(&self, device_id: &str) -> DeviceDetails {
        let model = BridgeCommand::GetProp {
            device: device_id,
            key: PROP_MODEL,
        };
        let version = BridgeCommand::GetProp {
            device: device_id,
            key: PROP_ANDROID_VERSION,
        };
        let battery = BridgeCommand::BatteryDump { device: device_id };
        let screen = BridgeCommand::ScreenSize { device: device_id };
        let routes = BridgeCommand::IpRoute { device: device_id };

        let (model, version, battery, screen, routes) = async {
            tokio::join!(
                self.query_detail("model", model),
                self.query_detail("android_version", version),
                self.query_detail("battery_level", battery),
                self.query_detail("screen_resolution", screen),
                self.query_detail("ip_address", routes),
            )
        }
        .instrument(info_span!("gather_details", device_id = %device_id))
        .await;

        let battery_level = battery.as_deref().and_then(parse_battery_level);
        if battery.is_some() && battery_level.is_none() {
            debug!(device_id = %device_id, "No battery level in dump");
        }

        DeviceDetails {
            model: model.as_deref().map(parse_property).unwrap_or_default(),
            android_version: version.as_deref().map(parse_property).unwrap_or_default(),
            battery_level: battery_level.unwrap_or(0),
            screen_resolution: screen.as_deref().map(parse_screen_size).unwrap_or_default(),
            ip_address: routes.as_deref().map(parse_ip_address).unwrap_or_default(),
        }
    }

    /// Stdout of one detail query, `None` if it could not run
    async fn query_detail(&self, field: &'static str, command: BridgeCommand<'_>) -> Option<String> {
        match self.run(command).await {
            Ok(outcome) => Some(outcome.stdout),
            Err(e) => {
                warn!(field, error = %e, "Could not query device detail");
                None
            }
        }
    }
}
