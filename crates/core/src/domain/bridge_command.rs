// Bridge tool command lines
//
// Every subcommand the orchestrator issues is built here so the argument
// layout lives in one place.

use super::error::{DomainError, Result};

/// Property key for the device model
pub const PROP_MODEL: &str = "ro.product.model";

/// Property key for the Android release version
pub const PROP_ANDROID_VERSION: &str = "ro.build.version.release";

/// A single bridge tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand<'a> {
    /// `devices -l`
    ListDevices,
    /// `-s <id> shell getprop <key>`
    GetProp { device: &'a str, key: &'a str },
    /// `-s <id> shell dumpsys battery`
    BatteryDump { device: &'a str },
    /// `-s <id> shell wm size`
    ScreenSize { device: &'a str },
    /// `-s <id> shell ip route`
    IpRoute { device: &'a str },
    /// `connect <ip:port>`
    Connect { endpoint: &'a str },
    /// `-s <id> tcpip <port>`
    TcpIp { device: &'a str, port: u16 },
    /// `-s <id> install <path>`
    Install { device: &'a str, package: &'a str },
    /// `-s <id> push <local> <remote>`
    Push {
        device: &'a str,
        local: &'a str,
        remote: &'a str,
    },
    /// `-s <id> pull <remote> <local>`
    Pull {
        device: &'a str,
        remote: &'a str,
        local: &'a str,
    },
    /// `-s <id> shell <tokens...>`
    Shell {
        device: &'a str,
        tokens: Vec<String>,
    },
    /// `-s <id> shell screencap <path>`
    ScreenCap { device: &'a str, remote: &'a str },
    /// `-s <id> shell screenrecord --time-limit <s> <path>`
    ScreenRecord {
        device: &'a str,
        seconds: u32,
        remote: &'a str,
    },
    /// `-s <id> shell rm <path>`
    Remove { device: &'a str, remote: &'a str },
}

impl BridgeCommand<'_> {
    /// Render to the ordered argument list passed to the bridge tool
    pub fn to_args(&self) -> Vec<String> {
        fn on(device: &str, rest: &[&str]) -> Vec<String> {
            let mut args = Vec::with_capacity(rest.len() + 2);
            args.push("-s".to_string());
            args.push(device.to_string());
            args.extend(rest.iter().map(|s| s.to_string()));
            args
        }

        match self {
            BridgeCommand::ListDevices => vec!["devices".to_string(), "-l".to_string()],
            BridgeCommand::GetProp { device, key } => on(device, &["shell", "getprop", *key]),
            BridgeCommand::BatteryDump { device } => on(device, &["shell", "dumpsys", "battery"]),
            BridgeCommand::ScreenSize { device } => on(device, &["shell", "wm", "size"]),
            BridgeCommand::IpRoute { device } => on(device, &["shell", "ip", "route"]),
            BridgeCommand::Connect { endpoint } => {
                vec!["connect".to_string(), (*endpoint).to_string()]
            }
            BridgeCommand::TcpIp { device, port } => on(device, &["tcpip", port.to_string().as_str()]),
            BridgeCommand::Install { device, package } => on(device, &["install", *package]),
            BridgeCommand::Push {
                device,
                local,
                remote,
            } => on(device, &["push", *local, *remote]),
            BridgeCommand::Pull {
                device,
                remote,
                local,
            } => on(device, &["pull", *remote, *local]),
            BridgeCommand::Shell { device, tokens } => {
                let mut args = on(device, &["shell"]);
                args.extend(tokens.iter().cloned());
                args
            }
            BridgeCommand::ScreenCap { device, remote } => {
                on(device, &["shell", "screencap", *remote])
            }
            BridgeCommand::ScreenRecord {
                device,
                seconds,
                remote,
            } => on(
                device,
                &[
                    "shell",
                    "screenrecord",
                    "--time-limit",
                    seconds.to_string().as_str(),
                    *remote,
                ],
            ),
            BridgeCommand::Remove { device, remote } => on(device, &["shell", "rm", *remote]),
        }
    }
}

/// Split a shell command line on arbitrary whitespace.
///
/// There is no quoting support: `ls "/sdcard/My Folder"` yields three tokens
/// with the quotes kept. An empty command is rejected because `shell` with
/// no arguments opens an interactive session.
pub fn tokenize_shell_command(command: &str) -> Result<Vec<String>> {
    let tokens: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() {
        return Err(DomainError::Validation("shell command is empty".to_string()));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices_args() {
        assert_eq!(BridgeCommand::ListDevices.to_args(), vec!["devices", "-l"]);
    }

    #[test]
    fn test_device_scoped_args() {
        let cmd = BridgeCommand::GetProp {
            device: "emulator-5554",
            key: PROP_MODEL,
        };
        assert_eq!(
            cmd.to_args(),
            vec!["-s", "emulator-5554", "shell", "getprop", "ro.product.model"]
        );

        let cmd = BridgeCommand::Pull {
            device: "abc",
            remote: "/sdcard/a.png",
            local: "a.png",
        };
        assert_eq!(cmd.to_args(), vec!["-s", "abc", "pull", "/sdcard/a.png", "a.png"]);

        let cmd = BridgeCommand::TcpIp {
            device: "abc",
            port: 5555,
        };
        assert_eq!(cmd.to_args(), vec!["-s", "abc", "tcpip", "5555"]);
    }

    #[test]
    fn test_screenrecord_args() {
        let cmd = BridgeCommand::ScreenRecord {
            device: "abc",
            seconds: 12,
            remote: "/sdcard/recording.mp4",
        };
        assert_eq!(
            cmd.to_args(),
            vec![
                "-s",
                "abc",
                "shell",
                "screenrecord",
                "--time-limit",
                "12",
                "/sdcard/recording.mp4"
            ]
        );
    }

    #[test]
    fn test_tokenize_simple_command() {
        assert_eq!(tokenize_shell_command("ls /sdcard").unwrap(), vec!["ls", "/sdcard"]);
        assert_eq!(
            tokenize_shell_command("  pm   list\tpackages \n").unwrap(),
            vec!["pm", "list", "packages"]
        );
    }

    #[test]
    fn test_tokenize_has_no_quote_support() {
        // Known limitation: quoted arguments with spaces are split naively
        let tokens = tokenize_shell_command("ls \"/sdcard/My Folder\"").unwrap();
        assert_eq!(tokens, vec!["ls", "\"/sdcard/My", "Folder\""]);
    }

    #[test]
    fn test_tokenize_rejects_blank() {
        assert!(tokenize_shell_command("").is_err());
        assert!(tokenize_shell_command("   \t").is_err());
    }
}
