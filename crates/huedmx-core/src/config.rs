//! Static configuration loaded once at startup
//!
//! The file is TOML:
//!
//! ```toml
//! stub_dmx = false
//!
//! [bridge]
//! address = "192.168.1.20"
//! application_key = "..."
//!
//! [[fixtures]]
//! name = "Buddha"
//! light_id = "1a50407e-3634-4815-8246-dd2fba3c7cba"
//! address = 1
//! kind = "dimmer"
//! ```
//!
//! `HUE_API_KEY`, `HUE_BRIDGE_IP` and `STUB_DMX` in the environment override the
//! file.

use crate::error::ConfigError;
use crate::fixture::{Fixture, FixtureKind};
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Highest addressable DMX channel
pub const MAX_DMX_ADDRESS: u16 = 512;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Render but never touch the bus
    #[serde(default)]
    pub stub_dmx: bool,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub dmx: DmxConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub fixtures: Vec<FixtureConfig>,
}

/// Hue bridge connection settings
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// IP address or host name of the bridge
    pub address: String,
    /// Sent as `hue-application-key`
    pub application_key: String,
    /// Event stream is considered dead after this long without data
    pub event_timeout_secs: u64,
    /// Pause before re-opening a broken event stream
    pub reconnect_backoff_secs: u64,
    /// Keep-alive interval, 0 disables
    pub heartbeat_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            application_key: String::new(),
            event_timeout_secs: 240,
            reconnect_backoff_secs: 2,
            heartbeat_secs: 180,
        }
    }
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("address", &self.address)
            .field("application_key", &"***REDACTED***")
            .field("event_timeout_secs", &self.event_timeout_secs)
            .field("reconnect_backoff_secs", &self.reconnect_backoff_secs)
            .field("heartbeat_secs", &self.heartbeat_secs)
            .finish()
    }
}

impl BridgeConfig {
    pub fn event_timeout(&self) -> Duration {
        Duration::from_secs(self.event_timeout_secs)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        (self.heartbeat_secs > 0).then(|| Duration::from_secs(self.heartbeat_secs))
    }
}

/// Update pipeline tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Coalescing window after the first change in a quiet period
    pub debounce_ms: u64,
    /// Upper bound on fixture updates in flight at once
    pub max_concurrent_updates: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            max_concurrent_updates: 5,
        }
    }
}

impl PipelineConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Serial bus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmxConfig {
    /// Serial device path; auto-detected FTDI adapter when absent
    pub port: Option<String>,
    /// Break length in microseconds (protocol minimum is 88)
    pub break_us: u64,
    /// Mark-after-break length in microseconds (protocol minimum is 8)
    pub mark_after_break_us: u64,
}

impl Default for DmxConfig {
    fn default() -> Self {
        Self {
            port: None,
            break_us: 1000,
            mark_after_break_us: 12,
        }
    }
}

impl DmxConfig {
    pub fn break_duration(&self) -> Duration {
        Duration::from_micros(self.break_us)
    }

    pub fn mark_after_break(&self) -> Duration {
        Duration::from_micros(self.mark_after_break_us)
    }
}

/// One patched fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureConfig {
    pub name: String,
    pub light_id: String,
    pub address: u16,
    pub kind: FixtureKind,
}

impl AppConfig {
    /// Read, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse without overrides or validation
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `HUE_API_KEY`, `HUE_BRIDGE_IP` and `STUB_DMX` from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("HUE_API_KEY").filter(|v| !v.is_empty()) {
            self.bridge.application_key = key;
        }
        if let Some(address) = lookup("HUE_BRIDGE_IP").filter(|v| !v.is_empty()) {
            self.bridge.address = address;
        }
        if let Some(stub) = lookup("STUB_DMX") {
            self.stub_dmx = stub.trim().eq_ignore_ascii_case("true");
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.address.trim().is_empty() {
            return Err(ConfigError::MissingBridgeSetting("address"));
        }
        if self.bridge.application_key.trim().is_empty() {
            return Err(ConfigError::MissingBridgeSetting("application_key"));
        }
        if self.pipeline.max_concurrent_updates == 0 {
            return Err(ConfigError::InvalidPipeline(
                "max_concurrent_updates must be at least 1".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for fixture in &self.fixtures {
            if !names.insert(fixture.name.as_str()) {
                return Err(ConfigError::DuplicateName(fixture.name.clone()));
            }
            if fixture.address < 1 || fixture.address > MAX_DMX_ADDRESS {
                return Err(ConfigError::AddressOutOfRange {
                    fixture: fixture.name.clone(),
                    address: fixture.address,
                });
            }
            let channels = fixture.kind.channel_count();
            if usize::from(fixture.address) + channels - 1 > usize::from(MAX_DMX_ADDRESS) {
                return Err(ConfigError::FootprintOutOfRange {
                    fixture: fixture.name.clone(),
                    address: fixture.address,
                    channels,
                });
            }
        }

        let fixtures = self.build_fixtures();
        for (i, first) in fixtures.iter().enumerate() {
            if let Some(second) = fixtures[i + 1..].iter().find(|f| first.overlaps(f)) {
                return Err(ConfigError::AddressConflict {
                    first: first.name().to_string(),
                    second: second.name().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Fixture instances in configuration order
    pub fn build_fixtures(&self) -> Vec<Fixture> {
        self.fixtures
            .iter()
            .map(|f| Fixture::new(f.name.clone(), f.light_id.clone(), f.address, f.kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [bridge]
        address = "192.168.1.20"
        application_key = "secret_key_456"

        [pipeline]
        debounce_ms = 150

        [[fixtures]]
        name = "Buddha"
        light_id = "1a50407e-3634-4815-8246-dd2fba3c7cba"
        address = 1
        kind = "dimmer"

        [[fixtures]]
        name = "Saber"
        light_id = "e6c587a3-f25e-47a5-9807-a60029187af4"
        address = 2
        kind = "rgbw_spot"
    "#;

    #[test]
    fn test_parse_sample() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        assert!(!config.stub_dmx);
        assert_eq!(config.pipeline.debounce(), Duration::from_millis(150));
        assert_eq!(config.pipeline.max_concurrent_updates, 5);
        assert_eq!(config.bridge.event_timeout_secs, 240);
        assert_eq!(config.dmx.break_us, 1000);
        assert_eq!(config.fixtures.len(), 2);
        assert_eq!(config.fixtures[1].kind, FixtureKind::RgbwSpot);
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::from_toml_str(SAMPLE).unwrap();
        config.apply_overrides(|key| match key {
            "HUE_API_KEY" => Some("from_env".to_string()),
            "STUB_DMX" => Some("TRUE".to_string()),
            _ => None,
        });
        assert_eq!(config.bridge.application_key, "from_env");
        assert_eq!(config.bridge.address, "192.168.1.20");
        assert!(config.stub_dmx);
    }

    #[test]
    fn test_address_conflict_detected() {
        let mut config = AppConfig::from_toml_str(SAMPLE).unwrap();
        config.fixtures[1].address = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AddressConflict { .. })
        ));
    }

    #[test]
    fn test_footprint_past_end() {
        let mut config = AppConfig::from_toml_str(SAMPLE).unwrap();
        config.fixtures[1].address = 510;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FootprintOutOfRange { .. })
        ));
    }

    #[test]
    fn test_address_zero_rejected() {
        let mut config = AppConfig::from_toml_str(SAMPLE).unwrap();
        config.fixtures[0].address = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AddressOutOfRange { .. })
        ));
    }

    #[test]
    fn test_missing_key_rejected() {
        let mut config = AppConfig::from_toml_str(SAMPLE).unwrap();
        config.bridge.application_key.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingBridgeSetting("application_key"))
        ));
    }

    #[test]
    fn test_bridge_config_debug_redaction() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        let debug_str = format!("{:?}", config.bridge);
        assert!(debug_str.contains("***REDACTED***"));
        assert!(!debug_str.contains("secret_key_456"));
        assert!(debug_str.contains("192.168.1.20"));
    }

    #[test]
    fn test_heartbeat_disabled() {
        let mut config = AppConfig::default();
        assert!(config.bridge.heartbeat_interval().is_some());
        config.bridge.heartbeat_secs = 0;
        assert!(config.bridge.heartbeat_interval().is_none());
    }
}
