//! Logging configuration
//!
//! The subscriber itself is installed by the binary; this only describes what
//! it should do.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Where and how verbosely to log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level: trace, debug, info, warn, error
    pub level: String,
    /// Log to stderr
    pub console_output: bool,
    /// Log to `file_path`
    pub file_output: bool,
    pub file_path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            file_path: PathBuf::from("hue-dmx.log"),
        }
    }
}

impl LogConfig {
    /// Configured level, INFO when it cannot be parsed
    pub fn parse_level(&self) -> LevelFilter {
        LevelFilter::from_str(self.level.trim()).unwrap_or(LevelFilter::INFO)
    }
}
