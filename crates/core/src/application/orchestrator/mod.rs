// Session Orchestrator - device discovery and per-device operations

pub mod constants;
mod details;

use constants::*;

use crate::application::registry::DeviceRegistry;
use crate::domain::parse::{
    is_connect_confirmed, is_install_confirmed, is_tcpip_confirmed, parse_device_list,
};
use crate::domain::{
    tokenize_shell_command, BridgeCommand, CommandResult, DeviceInfo, InputAction, MirrorOptions,
    PackageInstallResult, RecordOptions,
};
use crate::error::{AppError, Result};
use crate::port::{ExecutionOutcome, ProcessExecutor, TimeProvider};
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

/// Resolved executable paths, supplied by the tool locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub bridge: String,
    /// `None` when the mirroring tool is not installed
    pub mirror: Option<String>,
}

/// Session Orchestrator
///
/// Stateless request/response apart from the Registry cache. Every public
/// operation converts its failures into `CommandResult { success: false }`
/// so callers driving a fleet can treat all responses alike.
pub struct SessionOrchestrator {
    executor: Arc<dyn ProcessExecutor>,
    tools: ToolPaths,
    registry: Arc<DeviceRegistry>,
    time_provider: Arc<dyn TimeProvider>,
    capture_dir: PathBuf,
    span: Span,
}

impl SessionOrchestrator {
    pub fn new(
        executor: Arc<dyn ProcessExecutor>,
        tools: ToolPaths,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            executor,
            tools,
            registry: Arc::new(DeviceRegistry::new()),
            time_provider,
            capture_dir: PathBuf::from("."),
            span: Span::none(),
        }
    }

    /// Share an existing registry
    pub fn with_registry(mut self, registry: Arc<DeviceRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Directory for generated screenshot / recording file names
    pub fn with_capture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.capture_dir = dir.into();
        self
    }

    /// Parent span for every operation span (the logging capability)
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    // ------------------------------------------------------------------
    // Discovery
    // ------------------------------------------------------------------

    /// List attached devices and gather details for every online one.
    ///
    /// Details are gathered concurrently; the result keeps discovery order.
    /// A device whose queries fail keeps default detail fields without
    /// affecting the others. If the device list itself cannot be obtained
    /// the result is empty and the Registry is left untouched.
    pub async fn discover(&self) -> Vec<DeviceInfo> {
        let span = info_span!(parent: &self.span, "discover");
        async {
            let listing = match self.run(BridgeCommand::ListDevices).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "Failed to list devices");
                    return Vec::new();
                }
            };
            if !listing.is_success() {
                warn!(
                    exit_code = listing.exit_code,
                    stderr = %listing.stderr.trim(),
                    "Device list exited non-zero, parsing output anyway"
                );
            }

            let discovered = parse_device_list(&listing.stdout);
            let devices = join_all(discovered.into_iter().map(|mut device| async move {
                if device.status.is_online() {
                    let details = self.gather_details(device.id()).await;
                    device.apply_details(details);
                } else {
                    debug!(device_id = %device.id(), status = %device.status, "Skipping details");
                }
                device
            }))
            .await;

            self.registry.refresh(devices.clone());
            info!(
                devices = devices.len(),
                online = devices.iter().filter(|d| d.status.is_online()).count(),
                "Discovery pass completed"
            );
            devices
        }
        .instrument(span)
        .await
    }

    /// Registry snapshot without touching the bridge tool
    pub fn cached_devices(&self) -> Vec<DeviceInfo> {
        self.registry.list()
    }

    pub fn cached_device(&self, device_id: &str) -> Option<DeviceInfo> {
        self.registry.get(device_id)
    }

    // ------------------------------------------------------------------
    // Network debugging
    // ------------------------------------------------------------------

    /// `connect ip:port`, confirmed by "connected" in the output
    pub async fn connect_network(&self, ip: &str, port: u16) -> CommandResult {
        let span = info_span!(parent: &self.span, "connect_network", ip = %ip, port);
        let result = async {
            if ip.trim().is_empty() {
                return Err(AppError::Validation("ip address is empty".to_string()));
            }
            let endpoint = format!("{}:{}", ip.trim(), port);
            let outcome = self
                .run(BridgeCommand::Connect {
                    endpoint: &endpoint,
                })
                .await?;
            let result = CommandResult::from_marker(
                is_connect_confirmed(&outcome.stdout),
                &outcome.stdout,
                || format!("could not connect to {}", endpoint),
            );
            Ok(result.with_endpoint(endpoint).with_port(port))
        }
        .instrument(span.clone())
        .await;
        span.in_scope(|| settle("connect_network", result))
    }

    /// `tcpip port`, confirmed by "restarting" in the output
    pub async fn enable_network_debug(&self, device_id: &str, port: u16) -> CommandResult {
        let span = info_span!(parent: &self.span, "enable_network_debug", device_id = %device_id, port);
        let result = async {
            require_device(device_id)?;
            let outcome = self
                .run(BridgeCommand::TcpIp {
                    device: device_id,
                    port,
                })
                .await?;
            let result = CommandResult::from_marker(
                is_tcpip_confirmed(&outcome.stdout),
                &outcome.stdout,
                || format!("{} did not switch to network mode", device_id),
            );
            Ok::<_, AppError>(result.with_port(port))
        }
        .instrument(span.clone())
        .await;
        span.in_scope(|| settle("enable_network_debug", result))
    }

    // ------------------------------------------------------------------
    // Packages & files
    // ------------------------------------------------------------------

    /// `install path`, confirmed by "Success" (case-sensitive)
    pub async fn install_package(&self, device_id: &str, package_path: &str) -> CommandResult {
        let span = info_span!(parent: &self.span, "install_package", device_id = %device_id, package = %package_path);
        let result = self
            .try_install(device_id, package_path)
            .instrument(span.clone())
            .await;
        span.in_scope(|| settle("install_package", result))
    }

    /// Install several packages in order. One failure does not stop the rest.
    pub async fn install_packages(
        &self,
        device_id: &str,
        package_paths: &[String],
    ) -> Vec<PackageInstallResult> {
        let mut results = Vec::with_capacity(package_paths.len());
        for (i, package_path) in package_paths.iter().enumerate() {
            info!(
                device_id = %device_id,
                current = i + 1,
                total = package_paths.len(),
                package = %package_path,
                "Installing package"
            );
            results.push(PackageInstallResult {
                package_path: package_path.clone(),
                result: self.install_package(device_id, package_path).await,
            });
        }
        results
    }

    async fn try_install(&self, device_id: &str, package_path: &str) -> Result<CommandResult> {
        require_device(device_id)?;
        if package_path.trim().is_empty() {
            return Err(AppError::Validation("package path is empty".to_string()));
        }
        let outcome = self
            .run(BridgeCommand::Install {
                device: device_id,
                package: package_path,
            })
            .await?;
        Ok(CommandResult::from_marker(
            is_install_confirmed(&outcome.stdout),
            &outcome.stdout,
            || format!("install of {} was not confirmed", package_path),
        ))
    }

    /// `push local remote`, success iff exit code 0
    pub async fn push_file(&self, device_id: &str, local_path: &str, remote_path: &str) -> CommandResult {
        let span = info_span!(parent: &self.span, "push_file", device_id = %device_id);
        let result = async {
            require_device(device_id)?;
            let outcome = self
                .run(BridgeCommand::Push {
                    device: device_id,
                    local: local_path,
                    remote: remote_path,
                })
                .await?;
            Ok::<_, AppError>(transfer_result(&outcome, PUSH_OK_MESSAGE).with_path(remote_path))
        }
        .instrument(span.clone())
        .await;
        span.in_scope(|| settle("push_file", result))
    }

    /// `pull remote local`, success iff exit code 0
    pub async fn pull_file(&self, device_id: &str, remote_path: &str, local_path: &str) -> CommandResult {
        let span = info_span!(parent: &self.span, "pull_file", device_id = %device_id);
        let result = async {
            require_device(device_id)?;
            let outcome = self
                .run(BridgeCommand::Pull {
                    device: device_id,
                    remote: remote_path,
                    local: local_path,
                })
                .await?;
            Ok::<_, AppError>(transfer_result(&outcome, PULL_OK_MESSAGE).with_path(local_path))
        }
        .instrument(span.clone())
        .await;
        span.in_scope(|| settle("pull_file", result))
    }

    // ------------------------------------------------------------------
    // Shell & input
    // ------------------------------------------------------------------

    /// Run a shell command line on the device.
    ///
    /// The line is split on whitespace with no quoting support. Success iff
    /// exit code 0; stdout is always returned, stderr only when non-empty.
    pub async fn shell_exec(&self, device_id: &str, command: &str) -> CommandResult {
        let span = info_span!(parent: &self.span, "shell_exec", device_id = %device_id);
        let result = async {
            require_device(device_id)?;
            let tokens = tokenize_shell_command(command)?;
            let outcome = self
                .run(BridgeCommand::Shell {
                    device: device_id,
                    tokens,
                })
                .await?;
            Ok::<_, AppError>(shell_result(&outcome))
        }
        .instrument(span.clone())
        .await;
        span.in_scope(|| settle("shell_exec", result))
    }

    /// Inject a tap, swipe, text or key event through `input`
    pub async fn send_input(&self, device_id: &str, action: &InputAction) -> CommandResult {
        let span = info_span!(parent: &self.span, "send_input", device_id = %device_id);
        let result = async {
            require_device(device_id)?;
            let mut tokens = vec!["input".to_string()];
            tokens.extend(action.to_input_args()?);
            let outcome = self
                .run(BridgeCommand::Shell {
                    device: device_id,
                    tokens,
                })
                .await?;
            Ok::<_, AppError>(shell_result(&outcome))
        }
        .instrument(span.clone())
        .await;
        span.in_scope(|| settle("send_input", result))
    }

    // ------------------------------------------------------------------
    // Screen capture
    // ------------------------------------------------------------------

    /// Capture on device, pull to `output_path`, remove the device copy.
    ///
    /// Success is decided by the pull step alone; cleanup failures are only
    /// logged.
    pub async fn screenshot(&self, device_id: &str, output_path: Option<&str>) -> CommandResult {
        let span = info_span!(parent: &self.span, "screenshot", device_id = %device_id);
        let result = async {
            require_device(device_id)?;
            let local = self.capture_path(output_path, "screenshot", device_id, "png");
            self.capture_and_fetch(
                device_id,
                BridgeCommand::ScreenCap {
                    device: device_id,
                    remote: REMOTE_SCREENSHOT_PATH,
                },
                REMOTE_SCREENSHOT_PATH,
                &local,
                "Screenshot saved",
            )
            .await
        }
        .instrument(span.clone())
        .await;
        span.in_scope(|| settle("screenshot", result))
    }

    /// Record the screen for `options.seconds`, then pull and clean up like
    /// `screenshot`
    pub async fn record_screen(
        &self,
        device_id: &str,
        options: RecordOptions,
        output_path: Option<&str>,
    ) -> CommandResult {
        let span = info_span!(parent: &self.span, "record_screen", device_id = %device_id, seconds = options.seconds);
        let result = async {
            require_device(device_id)?;
            options.validate()?;
            let local = self.capture_path(output_path, "recording", device_id, "mp4");
            self.capture_and_fetch(
                device_id,
                BridgeCommand::ScreenRecord {
                    device: device_id,
                    seconds: options.seconds,
                    remote: REMOTE_RECORDING_PATH,
                },
                REMOTE_RECORDING_PATH,
                &local,
                "Recording saved",
            )
            .await
        }
        .instrument(span.clone())
        .await;
        span.in_scope(|| settle("record_screen", result))
    }

    async fn capture_and_fetch(
        &self,
        device_id: &str,
        capture: BridgeCommand<'_>,
        remote: &str,
        local: &str,
        saved_message: &str,
    ) -> Result<CommandResult> {
        let captured = self.run(capture).await?;
        if !captured.is_success() {
            warn!(reason = %captured.failure_reason(), "Capture step exited non-zero");
        }

        let pulled = self
            .run(BridgeCommand::Pull {
                device: device_id,
                remote,
                local,
            })
            .await?;

        match self
            .run(BridgeCommand::Remove {
                device: device_id,
                remote,
            })
            .await
        {
            Ok(outcome) if !outcome.is_success() => {
                warn!(remote = %remote, reason = %outcome.failure_reason(), "Device cleanup failed")
            }
            Err(e) => warn!(remote = %remote, error = %e, "Device cleanup failed"),
            Ok(_) => {}
        }

        let result = if pulled.is_success() {
            CommandResult::ok(saved_message)
        } else {
            CommandResult::failed(pulled.failure_reason())
        };
        Ok(result.with_path(local))
    }

    fn capture_path(&self, requested: Option<&str>, prefix: &str, device_id: &str, ext: &str) -> String {
        match requested.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => path.to_string(),
            None => {
                let file = format!(
                    "{}_{}_{}.{}",
                    prefix,
                    device_id.replace([':', '/', '\\'], "_"),
                    self.time_provider.now_secs(),
                    ext
                );
                self.capture_dir.join(file).to_string_lossy().into_owned()
            }
        }
    }

    // ------------------------------------------------------------------
    // Mirroring
    // ------------------------------------------------------------------

    /// Launch the mirroring tool detached and return its pid.
    ///
    /// Fire-and-forget: the process is never awaited, supervised or
    /// cancelled from here. Success only means the spawn itself worked.
    pub fn start_mirror(&self, device_id: Option<&str>, options: &MirrorOptions) -> CommandResult {
        let device_id = device_id.map(str::trim).filter(|id| !id.is_empty());
        let span = info_span!(parent: &self.span, "start_mirror", device_id = ?device_id);
        let _entered = span.enter();

        let result = self.try_start_mirror(device_id, options);
        settle("start_mirror", result)
    }

    fn try_start_mirror(
        &self,
        device_id: Option<&str>,
        options: &MirrorOptions,
    ) -> Result<CommandResult> {
        let tool = self.tools.mirror.as_deref().ok_or_else(|| {
            AppError::ToolNotFound("screen mirroring tool is not installed".to_string())
        })?;
        let args = options.to_args(device_id);
        let process = self.executor.spawn_detached(tool, &args)?;
        info!(pid = ?process.pid, "Mirroring process started");

        let result = CommandResult::ok("Mirroring started");
        Ok(match process.pid {
            Some(pid) => result.with_pid(pid),
            None => result,
        })
    }

    // ------------------------------------------------------------------

    async fn run(&self, command: BridgeCommand<'_>) -> Result<ExecutionOutcome> {
        let args = command.to_args();
        debug!(args = ?args, "Running bridge command");
        Ok(self.executor.execute(&self.tools.bridge, &args).await?)
    }
}

fn require_device(device_id: &str) -> Result<()> {
    if device_id.trim().is_empty() {
        return Err(AppError::Validation("device id is empty".to_string()));
    }
    Ok(())
}

fn transfer_result(outcome: &ExecutionOutcome, ok_message: &str) -> CommandResult {
    if outcome.is_success() {
        let stdout = outcome.stdout.trim();
        CommandResult::ok(if stdout.is_empty() { ok_message } else { stdout })
    } else {
        CommandResult::failed(outcome.failure_reason())
    }
}

fn shell_result(outcome: &ExecutionOutcome) -> CommandResult {
    let stderr = outcome.stderr.trim();
    let mut result = CommandResult {
        success: outcome.is_success(),
        output: Some(outcome.stdout.trim().to_string()),
        error: (!stderr.is_empty()).then(|| stderr.to_string()),
        ..Default::default()
    };
    if !result.success && result.error.is_none() {
        result.error = Some(format!("command exited with code {}", outcome.exit_code));
    }
    result
}

/// Operation boundary: every failure becomes a `CommandResult`
fn settle(operation: &'static str, result: Result<CommandResult>) -> CommandResult {
    match result {
        Ok(result) => {
            if !result.success {
                warn!(operation, error = ?result.error, "Operation reported failure");
            }
            result
        }
        Err(e) => {
            warn!(operation, error = %e, "Operation failed");
            CommandResult::failed(e.to_string())
        }
    }
}
