//! Core traits for serial port abstraction.
//!
//! Defines the `PortHandle` trait that lets the bridge drive both real serial
//! ports and mock implementations, plus the line-setting enums shared by the
//! definition parser and the port opener.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    /// Map a numeric bit count (5-8) to the enum.
    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            5 => Some(Self::Five),
            6 => Some(Self::Six),
            7 => Some(Self::Seven),
            8 => Some(Self::Eight),
            _ => None,
        }
    }

    pub fn count(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    /// Single-letter code used in port definitions (`N`, `O`, `E`, `M`, `S`).
    pub fn code(self) -> char {
        match self {
            Self::None => 'N',
            Self::Odd => 'O',
            Self::Even => 'E',
            Self::Mark => 'M',
            Self::Space => 'S',
        }
    }
}

impl TryFrom<Parity> for serialport::Parity {
    type Error = PortError;

    fn try_from(parity: Parity) -> Result<Self, Self::Error> {
        match parity {
            Parity::None => Ok(serialport::Parity::None),
            Parity::Odd => Ok(serialport::Parity::Odd),
            Parity::Even => Ok(serialport::Parity::Even),
            Parity::Mark | Parity::Space => Err(PortError::config(format!(
                "{:?} parity is not supported by the serial backend",
                parity
            ))),
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => f.write_str("1"),
            Self::OnePointFive => f.write_str("1.5"),
            Self::Two => f.write_str("2"),
        }
    }
}

impl TryFrom<StopBits> for serialport::StopBits {
    type Error = PortError;

    fn try_from(bits: StopBits) -> Result<Self, Self::Error> {
        match bits {
            StopBits::One => Ok(serialport::StopBits::One),
            StopBits::Two => Ok(serialport::StopBits::Two),
            StopBits::OnePointFive => Err(PortError::config(
                "1.5 stop bits are not supported by the serial backend",
            )),
        }
    }
}

/// Snapshot of the monitored input lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModemStatus {
    /// Clear To Send.
    pub cts: bool,
    /// Data Set Ready.
    pub dsr: bool,
}

/// An opened serial device shared by the tasks of one endpoint.
///
/// All methods take `&self`: the monitor, the reader and any number of
/// appliers call into the same handle concurrently, so implementations must
/// let a blocking read proceed independently of writes and line changes.
pub trait PortHandle: Send + Sync + fmt::Debug {
    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Read bytes into `buffer`, blocking for at most the port's read timeout.
    ///
    /// A timeout with nothing received is `Ok(0)`, not an error.
    fn read_bytes(&self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Write bytes to the port. May write fewer bytes than given.
    ///
    /// A device that accepted nothing before the port's timeout reports
    /// [`PortError::Timeout`]; the caller may simply try again.
    fn write_bytes(&self, data: &[u8]) -> Result<usize, PortError>;

    /// Sample the CTS and DSR input lines.
    fn modem_status(&self) -> Result<ModemStatus, PortError>;

    /// Drive the RTS output line.
    fn set_rts(&self, level: bool) -> Result<(), PortError>;

    /// Drive the DTR output line.
    fn set_dtr(&self, level: bool) -> Result<(), PortError>;
}
