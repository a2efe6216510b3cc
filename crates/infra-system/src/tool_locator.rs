// Tool locator - resolves the bridge and mirroring executables

use droidlink_core::{AppError, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// External tools the orchestrator drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeTool {
    /// Android Debug Bridge
    Adb,
    /// Screen mirroring client
    Scrcpy,
}

impl BridgeTool {
    /// Bare executable name as found on PATH
    pub fn binary_name(&self) -> &'static str {
        match self {
            BridgeTool::Adb => "adb",
            BridgeTool::Scrcpy => "scrcpy",
        }
    }

    /// File name inside the bundled tools directory
    fn bundled_file_name(&self) -> String {
        if cfg!(windows) {
            format!("{}.exe", self.binary_name())
        } else {
            self.binary_name().to_string()
        }
    }

    /// Argument that makes the tool print its version and exit
    fn version_arg(&self) -> &'static str {
        match self {
            BridgeTool::Adb => "version",
            BridgeTool::Scrcpy => "--version",
        }
    }
}

/// Finds tool executables: explicit path, then bundled dir, then PATH
#[derive(Debug, Clone)]
pub struct ToolLocator {
    bundled_dir: Option<PathBuf>,
}

impl ToolLocator {
    /// `bundled_dir` may contain `~`, expanded against the home directory
    pub fn new(bundled_dir: Option<&str>) -> Self {
        Self {
            bundled_dir: bundled_dir.map(expand_path),
        }
    }

    /// Resolve `tool` to a runnable path.
    ///
    /// # Errors
    /// - AppError::ToolNotFound if an explicit path does not exist, or no
    ///   candidate is found
    pub fn locate(&self, tool: BridgeTool, explicit_path: Option<&str>) -> Result<String> {
        if let Some(explicit) = explicit_path.map(str::trim).filter(|p| !p.is_empty()) {
            let path = expand_path(explicit);
            if path.is_file() {
                info!(tool = tool.binary_name(), path = %path.display(), "Using configured tool path");
                return Ok(path.to_string_lossy().into_owned());
            }
            return Err(AppError::ToolNotFound(format!(
                "{} not found at configured path {}",
                tool.binary_name(),
                path.display()
            )));
        }

        if let Some(dir) = &self.bundled_dir {
            let candidate = dir.join(tool.bundled_file_name());
            if candidate.is_file() {
                info!(tool = tool.binary_name(), path = %candidate.display(), "Using bundled tool");
                return Ok(candidate.to_string_lossy().into_owned());
            }
            debug!(tool = tool.binary_name(), path = %candidate.display(), "No bundled tool");
        }

        if probe(tool.binary_name(), tool.version_arg()) {
            info!(tool = tool.binary_name(), "Using tool from PATH");
            return Ok(tool.binary_name().to_string());
        }

        Err(AppError::ToolNotFound(format!(
            "{} is not bundled and not on PATH",
            tool.binary_name()
        )))
    }

    /// The signing credential path if the file exists
    pub fn signing_key(&self, path: &str) -> Option<PathBuf> {
        let path = expand_path(path);
        path.is_file().then_some(path)
    }
}

/// Run `program arg` and report whether it exited cleanly
fn probe(program: &str, arg: &str) -> bool {
    Command::new(program)
        .arg(arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
