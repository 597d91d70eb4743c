//! Configuration schema definitions.
//!
//! Every section carries `#[serde(default)]`, so a file only needs the keys it
//! changes. Endpoint keys left out of a `[left]`/`[right]` section are filled
//! in from the built-in endpoint by the loader.

use super::error::{ConfigError, ConfigResult};
use crate::bridge::{BridgeSettings, DispatchMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Left side of the bridge
    pub left: EndpointConfig,
    /// Right side of the bridge
    pub right: EndpointConfig,
    /// Timing and buffering shared by both ports
    pub serial: SerialConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// How the user stops the bridge
    pub interrupt: InterruptConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left: EndpointConfig::new("COM1,19200,N,8,1", "Left Port"),
            right: EndpointConfig::new("COM2,19200,N,8,1", "Right Port"),
            serial: SerialConfig::default(),
            logging: LoggingConfig::default(),
            interrupt: InterruptConfig::default(),
        }
    }
}

impl Config {
    /// Reject values the bridge cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.read_buffer_size == 0 {
            return Err(ConfigError::validation(
                "serial.read_buffer_size",
                "must be greater than zero",
            ));
        }
        if self.serial.poll_interval_ms == 0 {
            return Err(ConfigError::validation(
                "serial.poll_interval_ms",
                "must be greater than zero",
            ));
        }
        if self.serial.read_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "serial.read_timeout_ms",
                "must be greater than zero",
            ));
        }
        for (key, endpoint) in [("left", &self.left), ("right", &self.right)] {
            if endpoint.port.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("{key}.port"),
                    "port definition is empty",
                ));
            }
        }
        Ok(())
    }

    /// Settings for one bridge run.
    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            left_label: self.left.label.clone(),
            right_label: self.right.label.clone(),
            read_buffer_size: self.serial.read_buffer_size,
            poll_interval: self.serial.poll_interval(),
            log_control_flow: self.logging.log_control_flow,
            dispatch: self.serial.dispatch,
        }
    }
}

/// One bridged port.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EndpointConfig {
    /// Port definition: `PORT,BAUD,PARITY,DATABITS,STOPBITS`
    pub port: String,
    /// Name used in logs and error messages
    pub label: String,
}

impl EndpointConfig {
    pub fn new(port: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            label: label.into(),
        }
    }
}

/// Serial timing section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Read timeout in milliseconds; bounds how long a reader takes to notice shutdown
    pub read_timeout_ms: u64,
    /// Bytes requested per read
    pub read_buffer_size: usize,
    /// Interval between two samples of CTS/DSR, in milliseconds
    pub poll_interval_ms: u64,
    /// "concurrent" or "ordered"
    pub dispatch: DispatchMode,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 100,
            read_buffer_size: crate::bridge::reader::DEFAULT_READ_BUFFER_SIZE,
            poll_interval_ms: 10,
            dispatch: DispatchMode::default(),
        }
    }
}

impl SerialConfig {
    /// Get the read timeout as Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Get the poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Also append log entries to this file
    pub file: Option<PathBuf>,
    /// Log every mirrored CTS/DSR transition
    pub log_control_flow: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            log_control_flow: false,
        }
    }
}

/// Interrupt configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterruptConfig {
    /// Stop when a line is entered on stdin
    pub keypress: bool,
}

impl Default for InterruptConfig {
    fn default() -> Self {
        Self { keypress: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.left.port, "COM1,19200,N,8,1");
        assert_eq!(config.left.label, "Left Port");
        assert_eq!(config.right.port, "COM2,19200,N,8,1");
        assert_eq!(config.right.label, "Right Port");
        assert_eq!(config.serial.read_timeout(), Duration::from_millis(100));
        assert_eq!(config.serial.read_buffer_size, 4096);
        assert_eq!(config.logging.level, "info");
        assert!(config.interrupt.keypress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml_str = r#"
            [left]
            port = "/dev/ttyUSB0,9600,E,7,2"

            [serial]
            dispatch = "ordered"

            [logging]
            file = "tap.log"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.left.port, "/dev/ttyUSB0,9600,E,7,2");
        assert_eq!(config.right.port, "COM2,19200,N,8,1");
        assert_eq!(config.right.label, "Right Port");
        assert_eq!(config.serial.dispatch, DispatchMode::Ordered);
        assert_eq!(config.serial.poll_interval_ms, 10);
        assert_eq!(config.logging.file, Some(PathBuf::from("tap.log")));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[left]"));
        assert!(toml_str.contains("[serial]"));
        assert!(toml_str.contains("dispatch = \"concurrent\""));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.serial.read_buffer_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("serial.read_buffer_size"));

        let mut config = Config::default();
        config.serial.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.serial.read_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.right.port = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("right.port"));
    }

    #[test]
    fn test_bridge_settings() {
        let mut config = Config::default();
        config.left.label = "Modem".to_string();
        config.serial.poll_interval_ms = 25;
        config.logging.log_control_flow = true;

        let settings = config.bridge_settings();
        assert_eq!(settings.left_label, "Modem");
        assert_eq!(settings.right_label, "Right Port");
        assert_eq!(settings.poll_interval, Duration::from_millis(25));
        assert!(settings.log_control_flow);
    }
}
