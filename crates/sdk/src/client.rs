//! Droidlink Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    CommandResult, ConnectRequest, DeviceInfo, DeviceRequest, DevicesResponse, InputAction,
    InputRequest, InstallBatchRequest, InstallBatchResponse, InstallRequest, MirrorRequest,
    PackageInstallResult, RecordRequest, ScreenshotRequest, ShellRequest, StatusResponse,
    TcpIpRequest, TransferRequest,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Recordings can take up to three minutes plus the pull
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Droidlink daemon client
///
/// Provides a high-level interface to the device bridge daemon.
///
/// # Example
///
/// ```no_run
/// use droidlink_sdk::DroidlinkClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DroidlinkClient::connect("http://127.0.0.1:9537").await?;
/// for device in client.discover().await? {
///     println!("{} {}", device.id, device.model);
/// }
/// # Ok(())
/// # }
/// ```
pub struct DroidlinkClient {
    client: HttpClient,
}

impl DroidlinkClient {
    /// Connect to the Droidlink daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9537`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    async fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        method: &str,
        request: &Req,
    ) -> Result<Resp> {
        let response = self.client.request(method, object_params(request)?).await?;
        Ok(response)
    }

    /// Run a discovery pass on the daemon
    pub async fn discover(&self) -> Result<Vec<DeviceInfo>> {
        let response: DevicesResponse = self
            .client
            .request("devices.discover.v1", rpc_params![])
            .await?;
        Ok(response.devices)
    }

    /// Devices from the last discovery pass
    pub async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let response: DevicesResponse = self
            .client
            .request("devices.list.v1", rpc_params![])
            .await?;
        Ok(response.devices)
    }

    /// One cached device; unknown ids are an RPC error with code 4001
    pub async fn get_device(&self, device_id: impl Into<String>) -> Result<DeviceInfo> {
        self.call(
            "devices.get.v1",
            &DeviceRequest {
                device_id: device_id.into(),
            },
        )
        .await
    }

    /// Connect to a device over the network
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use droidlink_sdk::DroidlinkClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = DroidlinkClient::connect("http://127.0.0.1:9537").await?;
    /// let result = client.connect_device("192.168.1.20", 5555).await?;
    /// assert!(result.success);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect_device(&self, ip: impl Into<String>, port: u16) -> Result<CommandResult> {
        self.call(
            "device.connect.v1",
            &ConnectRequest {
                ip: ip.into(),
                port,
            },
        )
        .await
    }

    /// Switch a USB device to network debugging
    pub async fn enable_tcpip(&self, device_id: impl Into<String>, port: u16) -> Result<CommandResult> {
        self.call(
            "device.tcpip.v1",
            &TcpIpRequest {
                device_id: device_id.into(),
                port,
            },
        )
        .await
    }

    pub async fn install(
        &self,
        device_id: impl Into<String>,
        package_path: impl Into<String>,
    ) -> Result<CommandResult> {
        self.call(
            "device.install.v1",
            &InstallRequest {
                device_id: device_id.into(),
                package_path: package_path.into(),
            },
        )
        .await
    }

    /// Install several packages in order
    pub async fn install_batch(
        &self,
        device_id: impl Into<String>,
        package_paths: Vec<String>,
    ) -> Result<Vec<PackageInstallResult>> {
        let response: InstallBatchResponse = self
            .call(
                "device.install_batch.v1",
                &InstallBatchRequest {
                    device_id: device_id.into(),
                    package_paths,
                },
            )
            .await?;
        Ok(response.results)
    }

    pub async fn push(
        &self,
        device_id: impl Into<String>,
        local_path: impl Into<String>,
        remote_path: impl Into<String>,
    ) -> Result<CommandResult> {
        let request = TransferRequest {
            device_id: device_id.into(),
            local_path: local_path.into(),
            remote_path: remote_path.into(),
        };
        self.call("device.push.v1", &request).await
    }

    pub async fn pull(
        &self,
        device_id: impl Into<String>,
        remote_path: impl Into<String>,
        local_path: impl Into<String>,
    ) -> Result<CommandResult> {
        let request = TransferRequest {
            device_id: device_id.into(),
            local_path: local_path.into(),
            remote_path: remote_path.into(),
        };
        self.call("device.pull.v1", &request).await
    }

    /// Run a shell command line; it is split on whitespace, quotes are not honored
    pub async fn shell(
        &self,
        device_id: impl Into<String>,
        command: impl Into<String>,
    ) -> Result<CommandResult> {
        self.call(
            "device.shell.v1",
            &ShellRequest {
                device_id: device_id.into(),
                command: command.into(),
            },
        )
        .await
    }

    pub async fn screenshot(
        &self,
        device_id: impl Into<String>,
        output_path: Option<String>,
    ) -> Result<CommandResult> {
        self.call(
            "device.screenshot.v1",
            &ScreenshotRequest {
                device_id: device_id.into(),
                output_path,
            },
        )
        .await
    }

    pub async fn record(
        &self,
        device_id: impl Into<String>,
        seconds: Option<u32>,
        output_path: Option<String>,
    ) -> Result<CommandResult> {
        self.call(
            "device.record.v1",
            &RecordRequest {
                device_id: device_id.into(),
                seconds,
                output_path,
            },
        )
        .await
    }

    pub async fn input(&self, device_id: impl Into<String>, action: InputAction) -> Result<CommandResult> {
        self.call(
            "device.input.v1",
            &InputRequest {
                device_id: device_id.into(),
                action,
            },
        )
        .await
    }

    /// Launch screen mirroring; the result carries the process id
    pub async fn start_mirror(&self, request: MirrorRequest) -> Result<CommandResult> {
        self.call("mirror.start.v1", &request).await
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        let response = self
            .client
            .request("admin.status.v1", rpc_params![])
            .await?;
        Ok(response)
    }
}

/// Named params built from a request struct's fields
fn object_params<T: Serialize>(request: &T) -> Result<ObjectParams> {
    let value = serde_json::to_value(request)?;
    let serde_json::Value::Object(fields) = value else {
        return Err(SdkError::Other("request must serialize to an object".to_string()));
    };
    let mut params = ObjectParams::new();
    for (name, value) in fields {
        params.insert(&name, value)?;
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::core::traits::ToRpcParams;

    #[test]
    fn test_object_params_use_field_names() {
        let params = object_params(&ShellRequest {
            device_id: "emu".to_string(),
            command: "ls".to_string(),
        })
        .unwrap();

        let raw = params.to_rpc_params().unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(raw.get()).unwrap();
        assert_eq!(value["device_id"], "emu");
        assert_eq!(value["command"], "ls");
    }

    #[test]
    fn test_object_params_rejects_non_objects() {
        assert!(object_params(&vec![1, 2]).is_err());
    }
}
