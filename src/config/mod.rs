//! Session configuration
//!
//! The DAQ variant is always selected by configuration, never auto-detected:
//! the two dialects share no reliable distinguishing marker mid-stream.
//!
//! # Example
//! ```ignore
//! let config = SessionConfig::load("rawtrig.toml")?;
//! let session = Session::open("run42.dat", config)?;
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which DAQ program wrote the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaqVariant {
    /// Custom control GUI: 4-word event headers, channel bitmask, optional ZLE
    #[serde(rename = "rawcaen")]
    RawCaen,
    /// CAEN WaveDump: 6-word event headers, one channel per file, no ZLE
    #[serde(rename = "wavedump")]
    WaveDump,
}

impl std::fmt::Display for DaqVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaqVariant::RawCaen => write!(f, "rawcaen"),
            DaqVariant::WaveDump => write!(f, "wavedump"),
        }
    }
}

/// Per-session decoding configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// DAQ variant that produced the file
    #[serde(default = "default_variant")]
    pub variant: DaqVariant,

    /// Digitizer channel cardinality (8 for V1720, 16 for V1730-class
    /// boards). Bounds the active-channel bitmask scan.
    #[serde(default = "default_channel_count")]
    pub channel_count: u32,

    /// Hardware tick period in nanoseconds (8 ns for the formats in scope)
    #[serde(default = "default_tick_ns")]
    pub tick_ns: f64,
}

fn default_variant() -> DaqVariant {
    DaqVariant::RawCaen
}

fn default_channel_count() -> u32 {
    8
}

fn default_tick_ns() -> f64 {
    8.0
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            channel_count: default_channel_count(),
            tick_ns: default_tick_ns(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for a WaveDump recording
    pub fn wavedump() -> Self {
        Self {
            variant: DaqVariant::WaveDump,
            channel_count: 1,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_count == 0 || self.channel_count > 16 {
            return Err(ConfigError::Invalid(format!(
                "channel_count must be 1..=16, got {}",
                self.channel_count
            )));
        }
        if self.tick_ns <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tick_ns must be positive, got {}",
                self.tick_ns
            )));
        }
        Ok(())
    }

    /// Tick period in seconds
    pub fn tick_seconds(&self) -> f64 {
        self.tick_ns * 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.variant, DaqVariant::RawCaen);
        assert_eq!(config.channel_count, 8);
        assert_eq!(config.tick_ns, 8.0);
    }

    #[test]
    fn parse_minimal_toml() {
        let config = SessionConfig::from_toml("").unwrap();
        assert_eq!(config.variant, DaqVariant::RawCaen);
        assert_eq!(config.channel_count, 8);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
variant = "wavedump"
channel_count = 4
tick_ns = 4.0
"#;
        let config = SessionConfig::from_toml(toml).unwrap();
        assert_eq!(config.variant, DaqVariant::WaveDump);
        assert_eq!(config.channel_count, 4);
        assert_eq!(config.tick_ns, 4.0);
    }

    #[test]
    fn reject_zero_channels() {
        assert!(SessionConfig::from_toml("channel_count = 0").is_err());
    }

    #[test]
    fn accept_sixteen_channels() {
        let config = SessionConfig::from_toml("channel_count = 16").unwrap();
        assert_eq!(config.channel_count, 16);
    }

    #[test]
    fn reject_too_many_channels() {
        assert!(SessionConfig::from_toml("channel_count = 17").is_err());
    }

    #[test]
    fn reject_negative_tick() {
        assert!(SessionConfig::from_toml("tick_ns = -1.0").is_err());
    }

    #[test]
    fn wavedump_preset() {
        let config = SessionConfig::wavedump();
        assert_eq!(config.variant, DaqVariant::WaveDump);
        assert_eq!(config.channel_count, 1);
        assert_eq!(config.tick_ns, 8.0);
    }

    #[test]
    fn tick_seconds_conversion() {
        let config = SessionConfig::default();
        assert!((config.tick_seconds() - 8e-9).abs() < 1e-15);
    }

    #[test]
    fn variant_display() {
        assert_eq!(DaqVariant::RawCaen.to_string(), "rawcaen");
        assert_eq!(DaqVariant::WaveDump.to_string(), "wavedump");
    }
}
