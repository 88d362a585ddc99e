use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Appearance options. The engine copies these into the frame container
/// untouched; only the player reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_led_color")]
    pub led_color: String,
    #[serde(default = "default_true")]
    pub wire_labels: bool,
    #[serde(default = "default_true")]
    pub show_explanations: bool,
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
}

fn default_background_color() -> String {
    "#d9e4ec".into()
}

fn default_led_color() -> String {
    "#b1161c".into()
}

fn default_true() -> bool {
    true
}

fn default_frame_delay_ms() -> u64 {
    400
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            background_color: default_background_color(),
            led_color: default_led_color(),
            wire_labels: true,
            show_explanations: true,
            frame_delay_ms: default_frame_delay_ms(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, or from the user config file when `path`
    /// is `None`. Anything unreadable falls back to the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("blocksim");
        path.push("settings.json");
        path
    }

    /// `ledColor` as RGB, if it is a `#rrggbb` string.
    pub fn led_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.led_color)
    }

    /// `backgroundColor` as RGB, if it is a `#rrggbb` string.
    pub fn background_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.background_color)
    }
}

fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
