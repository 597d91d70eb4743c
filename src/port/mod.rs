//! Port abstraction layer for serial communication.
//!
//! Provides the `PortHandle` trait the bridge is written against, the
//! hardware implementation, a scriptable mock for tests, and the parser for
//! `PORT,BAUD,PARITY,DATABITS,STOPBITS` definitions.

pub mod error;
pub mod mock;
pub mod settings;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::MockSerialPort;
pub use settings::LinkSettings;
pub use sync_port::SyncSerialPort;
pub use traits::*;

/// Serial ports currently present on the system.
pub fn available_ports() -> Result<Vec<serialport::SerialPortInfo>, PortError> {
    serialport::available_ports().map_err(PortError::Serial)
}
