//! droidctl - Command-line interface for the Droidlink daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9537";

#[derive(Parser)]
#[command(name = "droidctl")]
#[command(about = "Droidlink device bridge CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "DROIDLINK_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List devices (cached unless --refresh)
    Devices {
        /// Run a discovery pass first
        #[arg(short, long)]
        refresh: bool,
    },

    /// Show one cached device
    Device { device_id: String },

    /// Connect to a device over the network
    Connect {
        ip: String,
        #[arg(short, long, default_value = "5555")]
        port: u16,
    },

    /// Switch a USB device to network debugging
    Tcpip {
        device_id: String,
        #[arg(short, long, default_value = "5555")]
        port: u16,
    },

    /// Install one or more packages, in order
    Install {
        device_id: String,
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Copy a local file to the device
    Push {
        device_id: String,
        local_path: String,
        remote_path: String,
    },

    /// Copy a device file to the local machine
    Pull {
        device_id: String,
        remote_path: String,
        local_path: String,
    },

    /// Run a shell command (split on whitespace, quotes are not honored)
    Shell {
        device_id: String,
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Capture a screenshot
    Screenshot {
        device_id: String,
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Record the screen
    Record {
        device_id: String,
        /// Length in seconds (1-180)
        #[arg(short, long)]
        seconds: Option<u32>,
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Inject an input event
    Input {
        device_id: String,
        #[command(subcommand)]
        action: InputCommand,
    },

    /// Launch screen mirroring
    Mirror {
        device_id: Option<String>,
        #[arg(long)]
        bitrate: Option<String>,
        #[arg(long)]
        max_size: Option<String>,
        #[arg(long)]
        renderer: Option<String>,
        #[arg(long)]
        no_stay_awake: bool,
        #[arg(long)]
        no_show_touches: bool,
    },

    /// Show daemon status
    Status,
}

#[derive(Subcommand)]
enum InputCommand {
    Tap {
        x: u32,
        y: u32,
    },
    Swipe {
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        #[arg(short, long, default_value = "500")]
        duration_ms: u32,
    },
    Text {
        text: String,
    },
    Key {
        keycode: String,
    },
}

impl InputCommand {
    fn to_action(&self) -> serde_json::Value {
        match self {
            InputCommand::Tap { x, y } => json!({"type": "tap", "x": x, "y": y}),
            InputCommand::Swipe {
                x1,
                y1,
                x2,
                y2,
                duration_ms,
            } => json!({
                "type": "swipe",
                "x1": x1,
                "y1": y1,
                "x2": x2,
                "y2": y2,
                "duration_ms": duration_ms,
            }),
            InputCommand::Text { text } => json!({"type": "text", "text": text}),
            InputCommand::Key { keycode } => json!({"type": "keyevent", "keycode": keycode}),
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct DeviceRow {
    id: String,
    status: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    #[tabled(rename = "android")]
    android_version: String,
    #[serde(default)]
    #[tabled(rename = "battery")]
    battery_level: u8,
    #[serde(default)]
    #[tabled(rename = "screen")]
    screen_resolution: String,
    #[serde(default)]
    #[tabled(rename = "ip")]
    ip_address: String,
}

#[derive(Deserialize)]
struct CommandOutcome {
    success: bool,
    message: Option<String>,
    output: Option<String>,
    error: Option<String>,
    path: Option<String>,
    pid: Option<u32>,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

/// Print a device operation result; returns its success flag
fn print_outcome(result: serde_json::Value) -> Result<bool> {
    let outcome: CommandOutcome = serde_json::from_value(result)?;
    if outcome.success {
        let headline = outcome.message.as_deref().unwrap_or("Done");
        println!("{}", format!("✓ {}", headline).green().bold());
        if let Some(path) = &outcome.path {
            println!("  {} {}", "Path:".bold(), path);
        }
        if let Some(pid) = outcome.pid {
            println!("  {} {}", "PID:".bold(), pid);
        }
    } else {
        let error = outcome.error.as_deref().unwrap_or("operation failed");
        println!("{}", format!("✗ {}", error).red().bold());
    }
    if let Some(output) = outcome.output.filter(|o| !o.is_empty()) {
        println!("{}", output);
    }
    Ok(outcome.success)
}

fn print_devices(result: serde_json::Value) -> Result<()> {
    let rows: Vec<DeviceRow> = serde_json::from_value(result["devices"].clone())?;
    if rows.is_empty() {
        println!("{}", "No devices attached".yellow());
        return Ok(());
    }
    println!("{}", Table::new(rows));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let url = cli.rpc_url.as_str();

    let success = match cli.command {
        Commands::Devices { refresh } => {
            let method = if refresh {
                "devices.discover.v1"
            } else {
                "devices.list.v1"
            };
            print_devices(call_rpc(url, method, json!({})).await?)?;
            true
        }

        Commands::Device { device_id } => {
            let result = call_rpc(url, "devices.get.v1", json!({ "device_id": device_id })).await?;
            let row: DeviceRow = serde_json::from_value(result)?;
            println!("{}", Table::new(vec![row]));
            true
        }

        Commands::Connect { ip, port } => print_outcome(
            call_rpc(url, "device.connect.v1", json!({ "ip": ip, "port": port })).await?,
        )?,

        Commands::Tcpip { device_id, port } => print_outcome(
            call_rpc(
                url,
                "device.tcpip.v1",
                json!({ "device_id": device_id, "port": port }),
            )
            .await?,
        )?,

        Commands::Install {
            device_id,
            packages,
        } => {
            if let [package] = packages.as_slice() {
                print_outcome(
                    call_rpc(
                        url,
                        "device.install.v1",
                        json!({ "device_id": device_id, "package_path": package }),
                    )
                    .await?,
                )?
            } else {
                let result = call_rpc(
                    url,
                    "device.install_batch.v1",
                    json!({ "device_id": device_id, "package_paths": packages }),
                )
                .await?;
                let results = result["results"].as_array().cloned().unwrap_or_default();
                let mut all_ok = true;
                for (i, entry) in results.into_iter().enumerate() {
                    println!(
                        "{}",
                        format!("[{}/{}] {}", i + 1, packages.len(), entry["package_path"]).bold()
                    );
                    all_ok &= print_outcome(entry["result"].clone())?;
                }
                all_ok
            }
        }

        Commands::Push {
            device_id,
            local_path,
            remote_path,
        } => print_outcome(
            call_rpc(
                url,
                "device.push.v1",
                json!({ "device_id": device_id, "local_path": local_path, "remote_path": remote_path }),
            )
            .await?,
        )?,

        Commands::Pull {
            device_id,
            remote_path,
            local_path,
        } => print_outcome(
            call_rpc(
                url,
                "device.pull.v1",
                json!({ "device_id": device_id, "local_path": local_path, "remote_path": remote_path }),
            )
            .await?,
        )?,

        Commands::Shell { device_id, command } => print_outcome(
            call_rpc(
                url,
                "device.shell.v1",
                json!({ "device_id": device_id, "command": command.join(" ") }),
            )
            .await?,
        )?,

        Commands::Screenshot { device_id, output } => print_outcome(
            call_rpc(
                url,
                "device.screenshot.v1",
                json!({ "device_id": device_id, "output_path": output }),
            )
            .await?,
        )?,

        Commands::Record {
            device_id,
            seconds,
            output,
        } => {
            println!("{}", "Recording...".cyan());
            print_outcome(
                call_rpc(
                    url,
                    "device.record.v1",
                    json!({ "device_id": device_id, "seconds": seconds, "output_path": output }),
                )
                .await?,
            )?
        }

        Commands::Input { device_id, action } => print_outcome(
            call_rpc(
                url,
                "device.input.v1",
                json!({ "device_id": device_id, "action": action.to_action() }),
            )
            .await?,
        )?,

        Commands::Mirror {
            device_id,
            bitrate,
            max_size,
            renderer,
            no_stay_awake,
            no_show_touches,
        } => {
            let mut params = json!({
                "stay_awake": !no_stay_awake,
                "show_touches": !no_show_touches,
            });
            for (key, value) in [
                ("device_id", device_id),
                ("bitrate", bitrate),
                ("max_size", max_size),
                ("renderer", renderer),
            ] {
                if let Some(value) = value {
                    params[key] = json!(value);
                }
            }
            print_outcome(call_rpc(url, "mirror.start.v1", params).await?)?
        }

        Commands::Status => {
            println!("{}", "Daemon Status".cyan().bold());
            println!();

            match call_rpc(url, "admin.status.v1", json!({})).await {
                Ok(status) => {
                    println!("  {} {}", "RPC URL:".bold(), url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!("  {} {}", "Version:".bold(), status["version"]);
                    println!();
                    println!("  {} {}", "Bridge tool:".bold(), status["bridge_tool"]);
                    match status["mirror_tool"].as_str() {
                        Some(path) => println!("  {} {}", "Mirror tool:".bold(), path),
                        None => println!("  {} {}", "Mirror tool:".bold(), "unavailable".yellow()),
                    }
                    let key = if status["signing_key_present"].as_bool().unwrap_or(false) {
                        "present".green()
                    } else {
                        "missing".yellow()
                    };
                    println!("  {} {}", "Signing key:".bold(), key);
                    println!();
                    println!("  {} {}", "Cached devices:".bold(), status["cached_devices"]);
                    println!("  {} {} seconds", "Uptime:".bold(), status["uptime_seconds"]);
                    true
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                    false
                }
            }
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
