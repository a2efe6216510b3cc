//! Daemon configuration from `DROIDLINK_*` environment variables

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9537;
const DEFAULT_TOOLS_DIR: &str = "~/.droidlink/tools";
const DEFAULT_CAPTURE_DIR: &str = ".";
const DEFAULT_SIGNING_KEY: &str = "~/.android/adbkey";
const DEFAULT_RATE_LIMIT_BURST: u32 = 20;
const DEFAULT_RATE_LIMIT_RATE: u32 = 10;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Everything the daemon reads from its environment at startup
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub rpc_host: String,
    pub rpc_port: u16,
    pub adb_path: Option<String>,
    pub scrcpy_path: Option<String>,
    pub tools_dir: String,
    pub capture_dir: PathBuf,
    pub signing_key: String,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
    pub rate_limit_burst: u32,
    pub rate_limit_rate: u32,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; invalid numbers are errors, not defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_format = match get("DROIDLINK_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            rpc_host: get("DROIDLINK_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port: parse_or(&get, "DROIDLINK_RPC_PORT", DEFAULT_RPC_PORT)?,
            adb_path: get("DROIDLINK_ADB_PATH"),
            scrcpy_path: get("DROIDLINK_SCRCPY_PATH"),
            tools_dir: get("DROIDLINK_TOOLS_DIR").unwrap_or_else(|| DEFAULT_TOOLS_DIR.to_string()),
            capture_dir: expand(
                &get("DROIDLINK_CAPTURE_DIR").unwrap_or_else(|| DEFAULT_CAPTURE_DIR.to_string()),
            ),
            signing_key: get("DROIDLINK_SIGNING_KEY")
                .unwrap_or_else(|| DEFAULT_SIGNING_KEY.to_string()),
            log_format,
            log_dir: get("DROIDLINK_LOG_DIR").map(|dir| expand(&dir)),
            rate_limit_burst: parse_or(&get, "DROIDLINK_RATE_LIMIT_BURST", DEFAULT_RATE_LIMIT_BURST)?,
            rate_limit_rate: parse_or(&get, "DROIDLINK_RATE_LIMIT_RATE", DEFAULT_RATE_LIMIT_RATE)?,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value {:?}", key, raw)),
        None => Ok(default),
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
