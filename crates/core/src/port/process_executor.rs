// Process Executor Port
// Abstraction over running the external bridge / mirroring tools

use async_trait::async_trait;
use thiserror::Error;

/// Exit code reported when the process ended without one (killed by signal)
pub const NO_EXIT_CODE: i32 = -1;

/// Result of one completed subprocess invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub exit_code: i32,
    /// Decoded lossily: invalid UTF-8 becomes U+FFFD
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutcome {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Exit code 0 with the given stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout, "")
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best human-readable failure description: stderr, then stdout, then code
    pub fn failure_reason(&self) -> String {
        [self.stderr.trim(), self.stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("bridge tool exited with code {}", self.exit_code))
    }
}

/// A process started without waiting for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachedProcess {
    pub pid: Option<u32>,
}

/// Execution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Process Executor trait
///
/// Implementations:
/// - SubprocessExecutor: tokio child processes
/// - ScriptedExecutor: canned outputs for tests
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run `tool args...` to completion, draining both output streams.
    ///
    /// A non-zero exit code is a normal outcome, not an error.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    /// - ExecutionError::Io if its output cannot be collected
    async fn execute(&self, tool: &str, args: &[String]) -> Result<ExecutionOutcome, ExecutionError>;

    /// Start `tool args...` and return immediately.
    ///
    /// The process is never awaited or cancelled by the caller.
    fn spawn_detached(&self, tool: &str, args: &[String])
        -> Result<DetachedProcess, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted executor: exact-argument responses, per-device failures
    pub struct ScriptedExecutor {
        responses: Mutex<HashMap<Vec<String>, ExecutionOutcome>>,
        failing_devices: Mutex<HashSet<String>>,
        device_delays: Mutex<HashMap<String, Duration>>,
        tool_error: Mutex<Option<ExecutionError>>,
        spawn_error: Mutex<Option<ExecutionError>>,
        calls: Mutex<Vec<Vec<String>>>,
        spawned: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl Default for ScriptedExecutor {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ScriptedExecutor {
        /// Unscripted calls succeed with empty output
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                failing_devices: Mutex::new(HashSet::new()),
                device_delays: Mutex::new(HashMap::new()),
                tool_error: Mutex::new(None),
                spawn_error: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
                spawned: Mutex::new(Vec::new()),
            }
        }

        pub fn respond(&self, args: &[&str], outcome: ExecutionOutcome) {
            let key = args.iter().map(|s| s.to_string()).collect();
            self.responses.lock().unwrap().insert(key, outcome);
        }

        /// Every `-s <device_id> ...` call fails to spawn
        pub fn fail_device(&self, device_id: &str) {
            self.failing_devices
                .lock()
                .unwrap()
                .insert(device_id.to_string());
        }

        /// Every `-s <device_id> ...` call answers only after `delay`
        pub fn delay_device(&self, device_id: &str, delay: Duration) {
            self.device_delays
                .lock()
                .unwrap()
                .insert(device_id.to_string(), delay);
        }

        /// Every `execute` call fails with this error
        pub fn fail_all(&self, error: ExecutionError) {
            *self.tool_error.lock().unwrap() = Some(error);
        }

        pub fn fail_spawn(&self, error: ExecutionError) {
            *self.spawn_error.lock().unwrap() = Some(error);
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn spawned(&self) -> Vec<(String, Vec<String>)> {
            self.spawned.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessExecutor for ScriptedExecutor {
        async fn execute(
            &self,
            _tool: &str,
            args: &[String],
        ) -> Result<ExecutionOutcome, ExecutionError> {
            self.calls.lock().unwrap().push(args.to_vec());

            if let Some(err) = self.tool_error.lock().unwrap().clone() {
                return Err(err);
            }
            if args.first().map(String::as_str) == Some("-s") {
                if let Some(device) = args.get(1) {
                    let delay = self.device_delays.lock().unwrap().get(device).copied();
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    if self.failing_devices.lock().unwrap().contains(device) {
                        return Err(ExecutionError::SpawnFailed(format!(
                            "device {} unreachable",
                            device
                        )));
                    }
                }
            }

            Ok(self
                .responses
                .lock()
                .unwrap()
                .get(args)
                .cloned()
                .unwrap_or_else(|| ExecutionOutcome::success("")))
        }

        fn spawn_detached(
            &self,
            tool: &str,
            args: &[String],
        ) -> Result<DetachedProcess, ExecutionError> {
            if let Some(err) = self.spawn_error.lock().unwrap().clone() {
                return Err(err);
            }
            let mut spawned = self.spawned.lock().unwrap();
            spawned.push((tool.to_string(), args.to_vec()));
            Ok(DetachedProcess {
                pid: Some(40_000 + spawned.len() as u32),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_prefers_stderr() {
        let outcome = ExecutionOutcome::new(1, "out", "adb: error: remote object does not exist\n");
        assert_eq!(
            outcome.failure_reason(),
            "adb: error: remote object does not exist"
        );
        assert_eq!(ExecutionOutcome::new(1, " out ", "").failure_reason(), "out");
        assert_eq!(
            ExecutionOutcome::new(7, "", "  ").failure_reason(),
            "bridge tool exited with code 7"
        );
    }

    #[tokio::test]
    async fn test_scripted_executor_matches_exact_args() {
        let exec = mocks::ScriptedExecutor::new();
        exec.respond(&["devices", "-l"], ExecutionOutcome::success("List\n"));

        let args = vec!["devices".to_string(), "-l".to_string()];
        let outcome = exec.execute("adb", &args).await.unwrap();
        assert_eq!(outcome.stdout, "List\n");

        let other = vec!["version".to_string()];
        assert_eq!(exec.execute("adb", &other).await.unwrap().stdout, "");
        assert_eq!(exec.call_count(), 2);
    }

    #[tokio::test]
    async fn test_scripted_executor_failing_device() {
        let exec = mocks::ScriptedExecutor::new();
        exec.fail_device("dev2");

        let args: Vec<String> = ["-s", "dev2", "shell", "wm", "size"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(matches!(
            exec.execute("adb", &args).await,
            Err(ExecutionError::SpawnFailed(_))
        ));
    }
}
