//! Port definition strings.
//!
//! A port is described on the command line as `PORT,BAUD,PARITY,DATABITS,STOPBITS`,
//! e.g. `COM5,19200,N,8,1` or `/dev/ttyUSB0,115200,e,7,2`.

use super::error::PortError;
use super::traits::{DataBits, Parity, StopBits};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// The name stops at the first comma, so an overlong baud cannot spill into it.
static DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^,]+),(\d{3,7}),([neomsNEOMS]),([5678]),(1|1\.5|2)$")
        .expect("port definition pattern is valid")
});

/// Parsed serial link parameters for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    /// System path or name of the device (`COM5`, `/dev/ttyUSB0`).
    pub port: String,
    pub baud_rate: u32,
    pub parity: Parity,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
}

impl FromStr for LinkSettings {
    type Err = PortError;

    fn from_str(definition: &str) -> Result<Self, Self::Err> {
        let invalid = || PortError::invalid_definition(definition);
        let caps = DEFINITION.captures(definition).ok_or_else(invalid)?;

        let baud_rate = caps[2].parse::<u32>().map_err(|_| invalid())?;

        let parity = match caps[3].to_ascii_lowercase().as_str() {
            "n" => Parity::None,
            "o" => Parity::Odd,
            "e" => Parity::Even,
            "m" => Parity::Mark,
            "s" => Parity::Space,
            _ => return Err(invalid()),
        };

        let data_bits = caps[4]
            .parse::<u8>()
            .ok()
            .and_then(DataBits::from_count)
            .ok_or_else(invalid)?;

        let stop_bits = match &caps[5] {
            "1" => StopBits::One,
            "1.5" => StopBits::OnePointFive,
            "2" => StopBits::Two,
            _ => return Err(invalid()),
        };

        Ok(Self {
            port: caps[1].to_string(),
            baud_rate,
            parity,
            data_bits,
            stop_bits,
        })
    }
}

impl fmt::Display for LinkSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.port,
            self.baud_rate,
            self.parity.code(),
            self.data_bits.count(),
            self.stop_bits
        )
    }
}
