//! Serial Tap Library
//!
//! A bidirectional bridge between two serial ports. Bytes read on either port
//! are written to the other, CTS/DSR transitions on one port drive RTS/DTR on
//! the other, and every forwarded chunk is logged as a hex dump.
//!
//! # Modules
//!
//! - `bridge`: The proxy engine (monitors, readers, router, appliers, shutdown)
//! - `config`: Configuration management with TOML support
//! - `error`: Bridge and application error types
//! - `logging`: Subscriber setup and traffic formatting
//! - `port`: Port abstraction layer for serial communication
//!
//! # Example
//!
//! ```rust,no_run
//! use serial_tap::{Bridge, BridgeSettings, LinkSettings, ShutdownCoordinator, SyncSerialPort};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let timeout = Duration::from_millis(100);
//! let left = SyncSerialPort::open(&"COM5,19200,N,8,1".parse::<LinkSettings>()?, timeout)?;
//! let right = SyncSerialPort::open(&"COM6,19200,N,8,1".parse::<LinkSettings>()?, timeout)?;
//!
//! let bridge = Bridge::new(Arc::new(left), Arc::new(right), BridgeSettings::default());
//! let cause = bridge.run(ShutdownCoordinator::new()).await;
//! println!("stopped: {cause}");
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod logging;
pub mod port;

// Re-export commonly used types for convenience
pub use bridge::{
    Bridge, BridgeSettings, BridgeState, ControlLine, DispatchMode, OutputLine, PortEvent,
    ShutdownCause, ShutdownCoordinator, ShutdownReporter,
};
pub use error::{AppError, BridgeError};
pub use port::{
    DataBits, LinkSettings, MockSerialPort, ModemStatus, Parity, PortError, PortHandle, StopBits,
    SyncSerialPort,
};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
