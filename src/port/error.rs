//! Port-specific error types.
//!
//! Errors raised while parsing a port definition, opening a device or doing
//! I/O on it. The bridge wraps these with the endpoint label they belong to.

use thiserror::Error;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port configuration failed or is not supported by the backend.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A `PORT,BAUD,PARITY,DATABITS,STOPBITS` string did not match the grammar.
    #[error("invalid serial port definition: {0}")]
    InvalidDefinition(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an InvalidDefinition error carrying the rejected string.
    pub fn invalid_definition(definition: impl Into<String>) -> Self {
        Self::InvalidDefinition(definition.into())
    }

    /// Create a Timeout error from a duration.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout(duration)
    }
}
