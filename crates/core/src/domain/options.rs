// Operation option records (mirroring, recording, input injection)

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Longest recording the on-device recorder accepts
pub const MAX_RECORD_SECONDS: u32 = 180;

/// Screen-mirroring launch options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorOptions {
    pub bitrate: String,
    pub max_size: String,
    pub renderer: String,
    pub stay_awake: bool,
    pub show_touches: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            bitrate: "8M".to_string(),
            max_size: "1080".to_string(),
            renderer: "opengl".to_string(),
            stay_awake: true,
            show_touches: true,
        }
    }
}

impl MirrorOptions {
    /// Full argument list for the mirroring tool
    pub fn to_args(&self, device_id: Option<&str>) -> Vec<String> {
        let mut args = Vec::with_capacity(10);
        if let Some(id) = device_id {
            args.push("-s".to_string());
            args.push(id.to_string());
        }
        args.extend([
            "--video-bit-rate".to_string(),
            self.bitrate.clone(),
            "--max-size".to_string(),
            self.max_size.clone(),
            "--render-driver".to_string(),
            self.renderer.clone(),
        ]);
        if self.stay_awake {
            args.push("--stay-awake".to_string());
        }
        if self.show_touches {
            args.push("--show-touches".to_string());
        }
        args
    }
}

/// Screen recording options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordOptions {
    pub seconds: u32,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self { seconds: 30 }
    }
}

impl RecordOptions {
    pub fn validate(&self) -> Result<()> {
        if self.seconds == 0 || self.seconds > MAX_RECORD_SECONDS {
            return Err(DomainError::Validation(format!(
                "recording length {}s out of range (1-{}s)",
                self.seconds, MAX_RECORD_SECONDS
            )));
        }
        Ok(())
    }
}

fn default_swipe_ms() -> u32 {
    500
}

/// Input event injected through the device's `input` tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputAction {
    Tap {
        x: u32,
        y: u32,
    },
    Swipe {
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        #[serde(default = "default_swipe_ms")]
        duration_ms: u32,
    },
    Text {
        text: String,
    },
    #[serde(rename = "keyevent")]
    KeyEvent {
        keycode: String,
    },
}

impl InputAction {
    /// Tokens following `shell input`
    pub fn to_input_args(&self) -> Result<Vec<String>> {
        let args = match self {
            InputAction::Tap { x, y } => vec!["tap".to_string(), x.to_string(), y.to_string()],
            InputAction::Swipe {
                x1,
                y1,
                x2,
                y2,
                duration_ms,
            } => vec![
                "swipe".to_string(),
                x1.to_string(),
                y1.to_string(),
                x2.to_string(),
                y2.to_string(),
                duration_ms.to_string(),
            ],
            InputAction::Text { text } => {
                if text.trim().is_empty() {
                    return Err(DomainError::Validation("input text is empty".to_string()));
                }
                // `input text` reads %s as a space
                vec!["text".to_string(), text.replace(' ', "%s")]
            }
            InputAction::KeyEvent { keycode } => {
                let keycode = keycode.trim();
                if keycode.is_empty() || keycode.contains(char::is_whitespace) {
                    return Err(DomainError::Validation(format!(
                        "invalid keycode: {:?}",
                        keycode
                    )));
                }
                vec!["keyevent".to_string(), keycode.to_string()]
            }
        };
        Ok(args)
    }
}
