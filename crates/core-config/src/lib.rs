//! Configuration loading for the redline engine.
//!
//! The engine itself takes an [`EngineConfig`] at construction time; this
//! crate additionally parses an optional `redline.toml` so binaries can
//! override the timing tunables without recompiling. Unknown fields are
//! ignored and parse errors fall back to defaults so a stale config file
//! never blocks a session.

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Construction-time engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Inter-byte idle threshold separating keystroke messages. Humans type
    /// slower than this; escape sequences burst faster.
    pub machine_interval: Duration,
    /// Period between terminal size polls.
    pub size_polling_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            machine_interval: Duration::from_millis(1),
            size_polling_interval: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    #[serde(default = "TimingConfig::default_machine_interval_ms")]
    pub machine_interval_ms: u64,
    #[serde(default = "TimingConfig::default_size_polling_ms")]
    pub size_polling_ms: u64,
}

impl TimingConfig {
    const fn default_machine_interval_ms() -> u64 {
        1
    }
    const fn default_size_polling_ms() -> u64 {
        10
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            machine_interval_ms: Self::default_machine_interval_ms(),
            size_polling_ms: Self::default_size_polling_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Original file content, when one was read.
    pub raw: Option<String>,
    pub file: ConfigFile,
}

impl Config {
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            machine_interval: Duration::from_millis(self.file.timing.machine_interval_ms.max(1)),
            size_polling_interval: Duration::from_millis(self.file.timing.size_polling_ms.max(1)),
        }
    }
}

/// Config path following platform conventions: prefer a working-directory
/// `redline.toml`, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("redline.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("redline").join("redline.toml");
    }
    PathBuf::from("redline.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(target: "config", path = %path.display(), "config_loaded");
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}
