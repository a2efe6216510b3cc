//! Droidlink SDK - Rust Client Library
//!
//! Provides a convenient client for the Droidlink device bridge daemon.
//!
//! # Example
//!
//! ```no_run
//! use droidlink_sdk::DroidlinkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect to daemon
//!     let client = DroidlinkClient::connect("http://127.0.0.1:9537").await?;
//!
//!     // Take a screenshot of every online device
//!     for device in client.discover().await? {
//!         if device.status == "device" {
//!             let result = client.screenshot(&device.id, None).await?;
//!             println!("{}: {:?}", device.id, result.path);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::DroidlinkClient;
pub use error::{Result, SdkError};
pub use types::{
    CommandResult, DeviceInfo, InputAction, MirrorRequest, PackageInstallResult, StatusResponse,
};
