// Subprocess executor implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, warn};

use droidlink_core::port::process_executor::NO_EXIT_CODE;
use droidlink_core::port::{
    DetachedProcess, ExecutionError, ExecutionOutcome, ProcessExecutor, TimeProvider,
};

/// Subprocess executor
/// Runs the bridge / mirroring tools as tokio child processes
pub struct SubprocessExecutor {
    time_provider: Arc<dyn TimeProvider>,
}

impl SubprocessExecutor {
    /// Create a new subprocess executor
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }

    /// Build outcome from process output
    fn build_outcome(output: std::process::Output) -> ExecutionOutcome {
        ExecutionOutcome {
            exit_code: output.status.code().unwrap_or(NO_EXIT_CODE),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

#[async_trait]
impl ProcessExecutor for SubprocessExecutor {
    async fn execute(
        &self,
        tool: &str,
        args: &[String],
    ) -> Result<ExecutionOutcome, ExecutionError> {
        let start_time = self.time_provider.now_millis();
        debug!(tool = %tool, args = ?args, "Starting subprocess");

        // Both streams are piped and drained together by wait_with_output,
        // so a chatty stderr cannot block stdout
        let child = Command::new(tool)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", tool, e)))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecutionError::Io(e.to_string()))?;

        let outcome = Self::build_outcome(output);
        let duration_ms = self.time_provider.now_millis() - start_time;

        info!(
            tool = %tool,
            subcommand = ?args.iter().find(|a| !a.starts_with('-')),
            duration_ms = %duration_ms,
            exit_code = outcome.exit_code,
            "Subprocess completed"
        );

        Ok(outcome)
    }

    fn spawn_detached(
        &self,
        tool: &str,
        args: &[String],
    ) -> Result<DetachedProcess, ExecutionError> {
        let mut child = Command::new(tool)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", tool, e)))?;

        let pid = child.id();
        info!(tool = %tool, pid = ?pid, "Detached process started");

        // Reap the child when it exits; nobody waits on it otherwise
        let tool = tool.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(tool = %tool, pid = ?pid, status = %status, "Detached process exited"),
                Err(e) => warn!(tool = %tool, pid = ?pid, error = %e, "Failed to reap detached process"),
            }
        });

        Ok(DetachedProcess { pid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidlink_core::port::time_provider::SystemTimeProvider;

    fn executor() -> SubprocessExecutor {
        SubprocessExecutor::new(Arc::new(SystemTimeProvider))
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_captures_both_streams() {
        let outcome = executor()
            .execute("sh", &args(&["-c", "echo hello; echo oops >&2; exit 3"]))
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, 3);
        assert_eq!(outcome.stdout, "hello\n");
        assert_eq!(outcome.stderr, "oops\n");
        assert!(!outcome.is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_decodes_invalid_utf8_lossily() {
        let outcome = executor()
            .execute("sh", &args(&["-c", "printf 'ok\\377done'"]))
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.stdout, "ok\u{FFFD}done");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_signal_reports_no_exit_code() {
        let outcome = executor()
            .execute("sh", &args(&["-c", "kill -9 $$"]))
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, NO_EXIT_CODE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_drains_large_stderr() {
        // Far more than a pipe buffer on stderr must not block the run
        let outcome = executor()
            .execute(
                "sh",
                &args(&["-c", "i=0; while [ $i -lt 20000 ]; do echo line$i >&2; i=$((i+1)); done; echo done"]),
            )
            .await
            .unwrap();

        assert_eq!(outcome.stdout, "done\n");
        assert!(outcome.stderr.lines().count() == 20000);
    }

    #[tokio::test]
    async fn test_missing_tool_is_spawn_failure() {
        let result = executor()
            .execute("/nonexistent/droidlink-bridge-tool", &args(&["devices"]))
            .await;

        assert!(matches!(result, Err(ExecutionError::SpawnFailed(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_detached_returns_immediately() {
        let process = executor()
            .spawn_detached("sleep", &args(&["5"]))
            .unwrap();

        assert!(process.pid.is_some());
    }

    #[tokio::test]
    async fn test_spawn_detached_missing_tool() {
        let result = executor().spawn_detached("/nonexistent/droidlink-mirror-tool", &[]);

        assert!(matches!(result, Err(ExecutionError::SpawnFailed(_))));
    }
}
