// Command Result - uniform outcome of every orchestrator operation

use serde::{Deserialize, Serialize};

/// Outcome of one device operation.
///
/// `success == false` always carries a non-empty `error` or an explanatory
/// `message`. Operation-specific extras (`endpoint`, `port`, `path`, `pid`)
/// are only present where the operation produces them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl CommandResult {
    /// Successful result with a message payload
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Failed result with an error description
    pub fn failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            error: Some(if error.is_empty() {
                "operation failed".to_string()
            } else {
                error
            }),
            ..Default::default()
        }
    }

    /// Result judged by a textual marker in the tool output.
    ///
    /// The trimmed output is always reported as `message`. When the marker is
    /// missing, `error` explains why so the failure is never silent.
    pub fn from_marker(found: bool, output: &str, missing: impl FnOnce() -> String) -> Self {
        let message = output.trim().to_string();
        Self {
            success: found,
            error: (!found).then(|| {
                if message.is_empty() {
                    missing()
                } else {
                    format!("{}: {}", missing(), message)
                }
            }),
            message: Some(message),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }
}

/// One entry of a batch install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInstallResult {
    pub package_path: String,
    pub result: CommandResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_never_has_empty_error() {
        let result = CommandResult::failed("");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("operation failed"));
    }

    #[test]
    fn test_from_marker_missing_explains_failure() {
        let result = CommandResult::from_marker(false, "  boom\n", || "no marker".to_string());
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("boom"));
        assert_eq!(result.error.as_deref(), Some("no marker: boom"));

        let result = CommandResult::from_marker(false, "", || "no marker".to_string());
        assert_eq!(result.error.as_deref(), Some("no marker"));
    }

    #[test]
    fn test_from_marker_found() {
        let result = CommandResult::from_marker(true, "Success\n", || unreachable!());
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.message.as_deref(), Some("Success"));
    }

    #[test]
    fn test_absent_fields_are_not_serialized() {
        let json = serde_json::to_value(CommandResult::ok("done").with_pid(42)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["pid"], 42);
        assert!(json.get("error").is_none());
        assert!(json.get("path").is_none());
    }
}
