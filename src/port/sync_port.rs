//! Serial port implementation backed by the `serialport` crate.
//!
//! The device is opened once and cloned into three OS handles so that the
//! reader thread, the writers and the modem-line calls never wait on each
//! other. Each clone sits behind its own mutex only because the `serialport`
//! methods take `&mut self`.

use super::error::PortError;
use super::settings::LinkSettings;
use super::traits::{ModemStatus, PortHandle};
use parking_lot::Mutex;
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;

/// An opened hardware serial port.
pub struct SyncSerialPort {
    reader: Mutex<Box<dyn SerialPort>>,
    writer: Mutex<Box<dyn SerialPort>>,
    control: Mutex<Box<dyn SerialPort>>,
    /// The port name/path for identification.
    name: String,
    /// The backend applies its single timeout to writes as well.
    timeout: Duration,
}

impl SyncSerialPort {
    /// Open a serial port with the given link settings.
    ///
    /// `read_timeout` bounds every blocking read; a read that times out is
    /// reported as zero bytes. Writes share the same bound and report
    /// [`PortError::Timeout`] when the device accepted nothing in time.
    ///
    /// # Example
    /// ```no_run
    /// use serial_tap::port::{LinkSettings, SyncSerialPort};
    /// use std::time::Duration;
    ///
    /// let settings: LinkSettings = "/dev/ttyUSB0,19200,N,8,1".parse()?;
    /// let port = SyncSerialPort::open(&settings, Duration::from_millis(100))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(settings: &LinkSettings, read_timeout: Duration) -> Result<Self, PortError> {
        let port_name = settings.port.as_str();
        let port = serialport::new(port_name, settings.baud_rate)
            .data_bits(settings.data_bits.into())
            .flow_control(serialport::FlowControl::None)
            .parity(settings.parity.try_into()?)
            .stop_bits(settings.stop_bits.try_into()?)
            .timeout(read_timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(port_name),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        let writer = port.try_clone()?;
        let control = port.try_clone()?;

        Ok(Self {
            reader: Mutex::new(port),
            writer: Mutex::new(writer),
            control: Mutex::new(control),
            name: port_name.to_string(),
            timeout: read_timeout,
        })
    }
}

impl PortHandle for SyncSerialPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self, buffer: &mut [u8]) -> Result<usize, PortError> {
        match self.reader.lock().read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(PortError::Io(e)),
        }
    }

    fn write_bytes(&self, data: &[u8]) -> Result<usize, PortError> {
        match self.writer.lock().write(data) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(PortError::timeout(self.timeout)),
            Err(e) => Err(PortError::Io(e)),
        }
    }

    fn modem_status(&self) -> Result<ModemStatus, PortError> {
        let mut control = self.control.lock();
        Ok(ModemStatus {
            cts: control.read_clear_to_send()?,
            dsr: control.read_data_set_ready()?,
        })
    }

    fn set_rts(&self, level: bool) -> Result<(), PortError> {
        self.control
            .lock()
            .write_request_to_send(level)
            .map_err(PortError::Serial)
    }

    fn set_dtr(&self, level: bool) -> Result<(), PortError> {
        self.control
            .lock()
            .write_data_terminal_ready(level)
            .map_err(PortError::Serial)
    }
}

impl std::fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_error() {
        let settings: LinkSettings = "/dev/nonexistent_port_12345,19200,N,8,1".parse().unwrap();
        let result = SyncSerialPort::open(&settings, Duration::from_millis(100));

        match result {
            Err(PortError::NotFound(name)) => assert!(name.contains("nonexistent")),
            Err(PortError::Serial(_)) | Err(PortError::Io(_)) => {}
            other => panic!("Expected open failure, got: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_parity_rejected_before_open() {
        let settings: LinkSettings = "/dev/nonexistent_port_12345,19200,M,8,1".parse().unwrap();
        let result = SyncSerialPort::open(&settings, Duration::from_millis(100));
        assert!(matches!(result, Err(PortError::Config(_))));
    }
}
