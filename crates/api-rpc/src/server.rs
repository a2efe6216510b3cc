//! JSON-RPC Server
//!
//! Serves JSON-RPC 2.0 over HTTP, bound to localhost by default.

use crate::handler::RpcHandler;
use crate::types::{
    ConnectRequest, DeviceRequest, InputRequest, InstallBatchRequest, InstallRequest,
    MirrorRequest, RecordRequest, ScreenshotRequest, ShellRequest, TcpIpRequest, TransferRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::sync::Arc;
use tracing::info;

// RPC Server Configuration
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9537;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// Register a method whose params deserialize into `$req`
macro_rules! register {
    // Params may be omitted entirely; absent params mean `$req::default()`
    ($module:expr, $handler:expr, $name:literal, optional $req:ty, $method:ident) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($name, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: Option<$req> = params.parse()?;
                    handler.$method(req.unwrap_or_default()).await
                }
            })
            .map_err(|e| e.to_string())?;
    }};
    ($module:expr, $handler:expr, $name:literal, $req:ty, $method:ident) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($name, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: $req = params.parse()?;
                    handler.$method(req).await
                }
            })
            .map_err(|e| e.to_string())?;
    }};
    ($module:expr, $handler:expr, $name:literal, $method:ident) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($name, move |_, _, _| {
                let handler = handler.clone();
                async move { handler.$method().await }
            })
            .map_err(|e| e.to_string())?;
    }};
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Every method name, for registration and discovery
    pub const METHODS: &'static [&'static str] = &[
        "devices.discover.v1",
        "devices.list.v1",
        "devices.get.v1",
        "device.connect.v1",
        "device.tcpip.v1",
        "device.install.v1",
        "device.install_batch.v1",
        "device.push.v1",
        "device.pull.v1",
        "device.shell.v1",
        "device.screenshot.v1",
        "device.record.v1",
        "device.input.v1",
        "mirror.start.v1",
        "admin.status.v1",
    ];

    /// Build the module with every method registered
    pub fn module(&self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());
        let handler = &self.handler;

        // Discovery & registry
        register!(module, handler, "devices.discover.v1", discover);
        register!(module, handler, "devices.list.v1", list);
        register!(module, handler, "devices.get.v1", DeviceRequest, get);

        // Device operations
        register!(module, handler, "device.connect.v1", ConnectRequest, connect);
        register!(module, handler, "device.tcpip.v1", TcpIpRequest, tcpip);
        register!(module, handler, "device.install.v1", InstallRequest, install);
        register!(module, handler, "device.install_batch.v1", InstallBatchRequest, install_batch);
        register!(module, handler, "device.push.v1", TransferRequest, push);
        register!(module, handler, "device.pull.v1", TransferRequest, pull);
        register!(module, handler, "device.shell.v1", ShellRequest, shell);
        register!(module, handler, "device.screenshot.v1", ScreenshotRequest, screenshot);
        register!(module, handler, "device.record.v1", RecordRequest, record);
        register!(module, handler, "device.input.v1", InputRequest, input);
        register!(module, handler, "mirror.start.v1", optional MirrorRequest, start_mirror);

        // Admin
        register!(module, handler, "admin.status.v1", status);

        Ok(module)
    }

    /// Start the JSON-RPC server
    ///
    /// Security: binds to 127.0.0.1 unless configured otherwise
    pub async fn start(self) -> Result<ServerHandle, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let module = self.module()?;

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        info!(methods = Self::METHODS.len(), "JSON-RPC server started successfully");

        Ok(server.start(module))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiter::RateLimiter;
    use droidlink_core::application::{SessionOrchestrator, ToolPaths};
    use droidlink_core::port::process_executor::mocks::ScriptedExecutor;
    use droidlink_core::port::time_provider::mocks::FixedTimeProvider;

    fn server() -> RpcServer {
        let orchestrator = SessionOrchestrator::new(
            Arc::new(ScriptedExecutor::new()),
            ToolPaths {
                bridge: "adb".to_string(),
                mirror: Some("scrcpy".to_string()),
            },
            Arc::new(FixedTimeProvider(0)),
        );
        let handler = RpcHandler::new(
            Arc::new(orchestrator),
            Arc::new(RateLimiter::new(10, 10)),
            None,
        );
        RpcServer::new(RpcServerConfig::default(), handler)
    }

    #[test]
    fn test_all_methods_registered() {
        let module = server().module().unwrap();
        let registered: Vec<&str> = module.method_names().collect();
        for method in RpcServer::METHODS {
            assert!(registered.contains(method), "{} not registered", method);
        }
        assert_eq!(registered.len(), RpcServer::METHODS.len());
    }

    async fn call_raw(request: &str) -> serde_json::Value {
        let module = server().module().unwrap();
        let (response, _) = module.raw_json_request(request, 1).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[tokio::test]
    async fn test_mirror_start_without_params_uses_defaults() {
        let response =
            call_raw(r#"{"jsonrpc":"2.0","method":"mirror.start.v1","id":1}"#).await;

        assert!(response.get("error").is_none(), "{}", response);
        assert_eq!(response["result"]["success"], true);
        assert!(response["result"]["pid"].is_u64());
    }

    #[tokio::test]
    async fn test_mirror_start_with_empty_params() {
        let response =
            call_raw(r#"{"jsonrpc":"2.0","method":"mirror.start.v1","params":{},"id":1}"#).await;

        assert_eq!(response["result"]["success"], true);
    }

    #[tokio::test]
    async fn test_device_method_still_requires_params() {
        let response =
            call_raw(r#"{"jsonrpc":"2.0","method":"device.shell.v1","id":1}"#).await;

        assert_eq!(response["error"]["code"], -32602);
    }

    #[test]
    fn test_default_config_is_localhost() {
        let config = RpcServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9537);
    }
}
