//! Error types for the bridge and the command-line application.

use crate::bridge::event::OutputLine;
use crate::config::ConfigError;
use crate::port::PortError;
use thiserror::Error;

/// A fatal failure inside a running bridge.
///
/// Every variant names the endpoint it happened on: the source endpoint for
/// reads and status samples, the destination endpoint for writes and line
/// changes.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("error reading serial port {label}: {source}")]
    Read {
        label: String,
        #[source]
        source: PortError,
    },

    #[error("error getting status bits on {label}: {source}")]
    ModemStatus {
        label: String,
        #[source]
        source: PortError,
    },

    #[error("error setting {line} on {label} to {level}: {source}")]
    SetLine {
        label: String,
        line: OutputLine,
        level: bool,
        #[source]
        source: PortError,
    },

    #[error("error writing data to {label}: {source}")]
    Write {
        label: String,
        #[source]
        source: PortError,
    },

    /// A monitor, reader or applier task panicked or was aborted.
    #[error("bridge task failed: {0}")]
    TaskFailed(String),
}

impl BridgeError {
    /// Label of the endpoint the failure is attributed to.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Read { label, .. }
            | Self::ModemStatus { label, .. }
            | Self::SetLine { label, .. }
            | Self::Write { label, .. } => Some(label),
            Self::TaskFailed(_) => None,
        }
    }
}

/// Errors that stop the application before or around a bridge run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("error parsing port definition for {label}: {source}")]
    Definition {
        label: String,
        #[source]
        source: PortError,
    },

    #[error("Error opening Port to {label}: {source}")]
    Open {
        label: String,
        #[source]
        source: PortError,
    },

    #[error("error listing serial ports: {0}")]
    ListPorts(#[source] PortError),

    #[error("error opening log file: {0}")]
    LogFile(#[source] std::io::Error),

    #[error("error initializing logging: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_names_destination() {
        let err = BridgeError::Write {
            label: "Right Port".to_string(),
            source: PortError::Io(std::io::Error::other("broken pipe")),
        };
        assert_eq!(err.label(), Some("Right Port"));
        assert_eq!(
            err.to_string(),
            "error writing data to Right Port: I/O error: broken pipe"
        );
    }

    #[test]
    fn test_set_line_error_display() {
        let err = BridgeError::SetLine {
            label: "Left Port".to_string(),
            line: OutputLine::Dtr,
            level: true,
            source: PortError::config("not permitted"),
        };
        assert_eq!(
            err.to_string(),
            "error setting DTR on Left Port to true: Configuration error: not permitted"
        );
    }

    #[test]
    fn test_open_error_display() {
        let err = AppError::Open {
            label: "Left Port".to_string(),
            source: PortError::not_found("COM9"),
        };
        assert_eq!(
            err.to_string(),
            "Error opening Port to Left Port: Serial port not found: COM9"
        );
    }
}
