//! Simple SDK Example
//!
//! Demonstrates basic usage of the Droidlink SDK.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package droidlink-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple
//!    ```

use droidlink_sdk::DroidlinkClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = DroidlinkClient::connect("http://127.0.0.1:9537").await?;

    let status = client.status().await?;
    println!(
        "Droidlink v{} (bridge: {}, mirroring: {})",
        status.version,
        status.bridge_tool,
        status.mirror_tool.as_deref().unwrap_or("unavailable")
    );

    let devices = client.discover().await?;
    println!("Found {} device(s)", devices.len());

    for device in devices.iter().filter(|d| d.status == "device") {
        println!(
            "  {} {} (Android {}, battery {}%)",
            device.id, device.model, device.android_version, device.battery_level
        );

        let result = client.shell(&device.id, "getprop ro.product.cpu.abi").await?;
        if result.success {
            println!("    abi: {}", result.output.unwrap_or_default());
        } else {
            println!("    shell failed: {}", result.error.unwrap_or_default());
        }
    }

    Ok(())
}
