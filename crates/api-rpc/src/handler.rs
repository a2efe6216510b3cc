//! RPC Method Handlers
//!
//! Thin adapters from JSON-RPC params to SessionOrchestrator calls.
//! Operation failures travel inside `CommandResult`; only bad params,
//! unknown devices and throttling become JSON-RPC errors.

use crate::error::{throttled, to_rpc_error};
use crate::rate_limiter::RateLimiter;
use crate::types::{
    ConnectRequest, DeviceRequest, DevicesResponse, InputRequest, InstallBatchRequest,
    InstallBatchResponse, InstallRequest, MirrorRequest, RecordRequest, ScreenshotRequest,
    ShellRequest, StatusResponse, TcpIpRequest, TransferRequest,
};
use droidlink_core::application::SessionOrchestrator;
use droidlink_core::domain::{CommandResult, DeviceInfo, RecordOptions};
use droidlink_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// What a request is throttled against. Each scope has its own key space.
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    Device(&'a str),
    Endpoint(&'a str, u16),
    Operation(&'static str),
}

impl fmt::Display for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Device(id) => write!(f, "device:{}", id),
            Scope::Endpoint(ip, port) => write!(f, "endpoint:{}:{}", ip, port),
            Scope::Operation(name) => write!(f, "op:{}", name),
        }
    }
}

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    orchestrator: Arc<SessionOrchestrator>,
    rate_limiter: Arc<RateLimiter>,
    signing_key: Option<PathBuf>,
    start_time: Instant,
}

impl RpcHandler {
    pub fn new(
        orchestrator: Arc<SessionOrchestrator>,
        rate_limiter: Arc<RateLimiter>,
        signing_key: Option<PathBuf>,
    ) -> Self {
        Self {
            orchestrator,
            rate_limiter,
            signing_key,
            start_time: Instant::now(),
        }
    }

    /// Consume one token from the scope's bucket
    fn throttle(&self, scope: Scope<'_>) -> Result<(), ErrorObjectOwned> {
        let key = scope.to_string();
        if !self.rate_limiter.check(&key) {
            debug!(key = %key, "Request throttled");
            return Err(throttled(&key));
        }
        Ok(())
    }

    /// Validate and throttle a device-scoped request
    fn admit(&self, device_id: &str) -> Result<(), ErrorObjectOwned> {
        if device_id.trim().is_empty() {
            return Err(to_rpc_error(AppError::Validation(
                "device_id must not be empty".to_string(),
            )));
        }
        self.throttle(Scope::Device(device_id))
    }

    /// devices.discover.v1
    pub async fn discover(&self) -> Result<DevicesResponse, ErrorObjectOwned> {
        self.throttle(Scope::Operation("discover"))?;
        Ok(DevicesResponse {
            devices: self.orchestrator.discover().await,
        })
    }

    /// devices.list.v1
    pub async fn list(&self) -> Result<DevicesResponse, ErrorObjectOwned> {
        Ok(DevicesResponse {
            devices: self.orchestrator.cached_devices(),
        })
    }

    /// devices.get.v1
    pub async fn get(&self, params: DeviceRequest) -> Result<DeviceInfo, ErrorObjectOwned> {
        self.orchestrator
            .cached_device(&params.device_id)
            .ok_or_else(|| {
                to_rpc_error(AppError::NotFound(format!(
                    "Device {} not found",
                    params.device_id
                )))
            })
    }

    /// device.connect.v1
    pub async fn connect(&self, params: ConnectRequest) -> Result<CommandResult, ErrorObjectOwned> {
        if params.ip.trim().is_empty() {
            return Err(to_rpc_error(AppError::Validation(
                "ip must not be empty".to_string(),
            )));
        }
        self.throttle(Scope::Endpoint(params.ip.trim(), params.port))?;
        Ok(self.orchestrator.connect_network(&params.ip, params.port).await)
    }

    /// device.tcpip.v1
    pub async fn tcpip(&self, params: TcpIpRequest) -> Result<CommandResult, ErrorObjectOwned> {
        self.admit(&params.device_id)?;
        Ok(self
            .orchestrator
            .enable_network_debug(&params.device_id, params.port)
            .await)
    }

    /// device.install.v1
    pub async fn install(&self, params: InstallRequest) -> Result<CommandResult, ErrorObjectOwned> {
        self.admit(&params.device_id)?;
        Ok(self
            .orchestrator
            .install_package(&params.device_id, &params.package_path)
            .await)
    }

    /// device.install_batch.v1
    pub async fn install_batch(
        &self,
        params: InstallBatchRequest,
    ) -> Result<InstallBatchResponse, ErrorObjectOwned> {
        if params.package_paths.is_empty() {
            return Err(to_rpc_error(AppError::Validation(
                "package_paths must not be empty".to_string(),
            )));
        }
        self.admit(&params.device_id)?;
        Ok(InstallBatchResponse {
            results: self
                .orchestrator
                .install_packages(&params.device_id, &params.package_paths)
                .await,
        })
    }

    /// device.push.v1
    pub async fn push(&self, params: TransferRequest) -> Result<CommandResult, ErrorObjectOwned> {
        self.admit(&params.device_id)?;
        Ok(self
            .orchestrator
            .push_file(&params.device_id, &params.local_path, &params.remote_path)
            .await)
    }

    /// device.pull.v1
    pub async fn pull(&self, params: TransferRequest) -> Result<CommandResult, ErrorObjectOwned> {
        self.admit(&params.device_id)?;
        Ok(self
            .orchestrator
            .pull_file(&params.device_id, &params.remote_path, &params.local_path)
            .await)
    }

    /// device.shell.v1
    pub async fn shell(&self, params: ShellRequest) -> Result<CommandResult, ErrorObjectOwned> {
        self.admit(&params.device_id)?;
        if params.command.trim().is_empty() {
            return Err(to_rpc_error(AppError::Validation(
                "command must not be empty".to_string(),
            )));
        }
        Ok(self
            .orchestrator
            .shell_exec(&params.device_id, &params.command)
            .await)
    }

    /// device.screenshot.v1
    pub async fn screenshot(
        &self,
        params: ScreenshotRequest,
    ) -> Result<CommandResult, ErrorObjectOwned> {
        self.admit(&params.device_id)?;
        Ok(self
            .orchestrator
            .screenshot(&params.device_id, params.output_path.as_deref())
            .await)
    }

    /// device.record.v1
    pub async fn record(&self, params: RecordRequest) -> Result<CommandResult, ErrorObjectOwned> {
        let options = params
            .seconds
            .map(|seconds| RecordOptions { seconds })
            .unwrap_or_default();
        options
            .validate()
            .map_err(|e| to_rpc_error(AppError::Domain(e)))?;
        self.admit(&params.device_id)?;
        Ok(self
            .orchestrator
            .record_screen(&params.device_id, options, params.output_path.as_deref())
            .await)
    }

    /// device.input.v1
    pub async fn input(&self, params: InputRequest) -> Result<CommandResult, ErrorObjectOwned> {
        self.admit(&params.device_id)?;
        Ok(self
            .orchestrator
            .send_input(&params.device_id, &params.action)
            .await)
    }

    /// mirror.start.v1
    pub async fn start_mirror(
        &self,
        params: MirrorRequest,
    ) -> Result<CommandResult, ErrorObjectOwned> {
        let scope = match params.device_id.as_deref() {
            Some(id) => Scope::Device(id),
            None => Scope::Operation("mirror"),
        };
        self.throttle(scope)?;
        Ok(self
            .orchestrator
            .start_mirror(params.device_id.as_deref(), &params.options))
    }

    /// admin.status.v1
    pub async fn status(&self) -> Result<StatusResponse, ErrorObjectOwned> {
        let tools = self.orchestrator.tools();
        Ok(StatusResponse {
            version: droidlink_core::VERSION.to_string(),
            bridge_tool: tools.bridge.clone(),
            mirror_tool: tools.mirror.clone(),
            signing_key_present: self.signing_key.is_some(),
            cached_devices: self.orchestrator.registry().len(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use droidlink_core::application::ToolPaths;
    use droidlink_core::port::process_executor::mocks::ScriptedExecutor;
    use droidlink_core::port::time_provider::mocks::FixedTimeProvider;
    use droidlink_core::port::ExecutionOutcome;

    fn handler(exec: &Arc<ScriptedExecutor>, burst: u32) -> RpcHandler {
        let orchestrator = SessionOrchestrator::new(
            exec.clone(),
            ToolPaths {
                bridge: "adb".to_string(),
                mirror: None,
            },
            Arc::new(FixedTimeProvider(0)),
        );
        RpcHandler::new(
            Arc::new(orchestrator),
            Arc::new(RateLimiter::new(burst, 1)),
            None,
        )
    }

    #[tokio::test]
    async fn test_get_unknown_device_is_not_found() {
        let exec = Arc::new(ScriptedExecutor::new());
        let handler = handler(&exec, 10);

        let err = handler
            .get(DeviceRequest {
                device_id: "ghost".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), code::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_discover_then_get() {
        let exec = Arc::new(ScriptedExecutor::new());
        exec.respond(
            &["devices", "-l"],
            ExecutionOutcome::success("List of devices attached\nemu offline\n"),
        );
        let handler = handler(&exec, 10);

        let discovered = handler.discover().await.unwrap();
        assert_eq!(discovered.devices.len(), 1);

        let device = handler
            .get(DeviceRequest {
                device_id: "emu".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(device.id(), "emu");
        assert_eq!(handler.list().await.unwrap().devices.len(), 1);
    }

    #[tokio::test]
    async fn test_throttling_is_per_device() {
        let exec = Arc::new(ScriptedExecutor::new());
        let handler = handler(&exec, 2);
        let shell = |id: &str| ShellRequest {
            device_id: id.to_string(),
            command: "true".to_string(),
        };

        assert!(handler.shell(shell("a")).await.is_ok());
        assert!(handler.shell(shell("a")).await.is_ok());
        let err = handler.shell(shell("a")).await.unwrap_err();
        assert_eq!(err.code(), code::THROTTLED);

        assert!(handler.shell(shell("b")).await.is_ok());
    }

    #[tokio::test]
    async fn test_device_ids_never_share_operation_buckets() {
        let exec = Arc::new(ScriptedExecutor::new());
        let handler = handler(&exec, 1);

        assert!(handler.discover().await.is_ok());
        assert!(handler
            .shell(ShellRequest {
                device_id: "discover".to_string(),
                command: "ls".to_string(),
            })
            .await
            .is_ok());

        assert!(handler.start_mirror(MirrorRequest::default()).await.is_ok());
        assert!(handler
            .start_mirror(MirrorRequest {
                device_id: Some("mirror".to_string()),
                ..Default::default()
            })
            .await
            .is_ok());

        let err = handler.discover().await.unwrap_err();
        assert_eq!(err.code(), code::THROTTLED);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let exec = Arc::new(ScriptedExecutor::new());
        let handler = handler(&exec, 10);

        let err = handler
            .shell(ShellRequest {
                device_id: "".to_string(),
                command: "ls".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::VALIDATION_ERROR);

        let err = handler
            .install_batch(InstallBatchRequest {
                device_id: "emu".to_string(),
                package_paths: vec![],
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::VALIDATION_ERROR);

        let err = handler
            .record(RecordRequest {
                device_id: "emu".to_string(),
                seconds: Some(0),
                output_path: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::VALIDATION_ERROR);
        assert_eq!(exec.call_count(), 0);
    }

    #[tokio::test]
    async fn test_operation_failure_is_a_result_not_an_error() {
        let exec = Arc::new(ScriptedExecutor::new());
        exec.respond(
            &["-s", "emu", "install", "bad.apk"],
            ExecutionOutcome::success("Failure [INSTALL_FAILED_INVALID_APK]"),
        );
        let handler = handler(&exec, 10);

        let result = handler
            .install(InstallRequest {
                device_id: "emu".to_string(),
                package_path: "bad.apk".to_string(),
            })
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_mirror_without_tool_reports_failure() {
        let exec = Arc::new(ScriptedExecutor::new());
        let handler = handler(&exec, 10);

        let result = handler.start_mirror(MirrorRequest::default()).await.unwrap();

        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_status() {
        let exec = Arc::new(ScriptedExecutor::new());
        let handler = handler(&exec, 10);

        let status = handler.status().await.unwrap();

        assert_eq!(status.bridge_tool, "adb");
        assert!(status.mirror_tool.is_none());
        assert!(!status.signing_key_present);
        assert_eq!(status.cached_devices, 0);
    }
}
