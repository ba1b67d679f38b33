//! Application configuration.
//!
//! The configuration is loaded from a JSON file, by default
//! `$XDG_CONFIG_HOME/ddc-switcher/config.json` (`--config <path>` overrides
//! it).  Every section is optional, so a minimal `{}` file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "ddcutil": {
//!     "binary": "/usr/bin/ddcutil",
//!     "extra_args": ["--sleep-multiplier", "0.5"],
//!     "query_timeout_ms": 2500
//!   },
//!   "inputs": [
//!     { "name": "HDMI-1", "code": "0x11" },
//!     { "name": "HDMI-2", "code": "0x12" },
//!     { "name": "DisplayPort-1", "code": "0x0f" }
//!   ]
//! }
//! ```

use crate::monitor::InputCode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How to invoke the display-control tool.
    #[serde(default)]
    pub ddcutil: DdcutilConfig,

    /// The inputs offered for switching.
    #[serde(default)]
    pub inputs: InputCatalogue,

    /// Where monitor preferences are stored.  Defaults to
    /// `settings.json` next to the config file.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

/// Invocation settings for `ddcutil`.
///
/// All durations are in **milliseconds**.  The runner raises anything
/// below 100ms to 100ms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DdcutilConfig {
    /// Program name or path.
    pub binary: String,
    /// Arguments inserted right after the binary on every call.
    pub extra_args: Vec<String>,
    /// Budget for `detect` (each of the verbose and terse attempts).
    pub detect_timeout_ms: u64,
    /// Budget for one `getvcp 60` query.
    pub query_timeout_ms: u64,
    /// How long to let a monitor settle after `setvcp` before confirming.
    pub confirm_delay_ms: u64,
}

impl Default for DdcutilConfig {
    fn default() -> Self {
        Self {
            binary: "ddcutil".into(),
            extra_args: Vec::new(),
            detect_timeout_ms: 5000,
            query_timeout_ms: 3000,
            confirm_delay_ms: 2000,
        }
    }
}

impl DdcutilConfig {
    pub fn detect_timeout(&self) -> Duration {
        Duration::from_millis(self.detect_timeout_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }
}

/// A named input source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSource {
    pub name: String,
    pub code: InputCode,
}

/// The closed set of inputs this installation knows how to select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputCatalogue(Vec<InputSource>);

impl Default for InputCatalogue {
    fn default() -> Self {
        Self(vec![
            InputSource {
                name: "HDMI-1".into(),
                code: InputCode::HDMI_1,
            },
            InputSource {
                name: "DisplayPort-1".into(),
                code: InputCode::DISPLAY_PORT_1,
            },
            InputSource {
                name: "USB-C".into(),
                code: InputCode::USB_C,
            },
        ])
    }
}

impl InputCatalogue {
    pub fn new(sources: Vec<InputSource>) -> Self {
        Self(sources)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputSource> {
        self.0.iter()
    }

    pub fn is_recognized(&self, code: InputCode) -> bool {
        self.0.iter().any(|s| s.code == code)
    }

    pub fn name_of(&self, code: InputCode) -> Option<&str> {
        self.0.iter().find(|s| s.code == code).map(|s| s.name.as_str())
    }

    /// Look up an input by name (case-insensitive) or by code.
    pub fn lookup(&self, name_or_code: &str) -> Option<InputCode> {
        let wanted = name_or_code.trim();
        if let Some(source) = self
            .0
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(wanted))
        {
            return Some(source.code);
        }
        InputCode::parse(wanted).filter(|code| self.is_recognized(*code))
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/ddc-switcher`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("ddc-switcher")
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
