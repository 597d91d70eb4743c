//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that simulates serial port behavior without
//! requiring actual hardware. Reads are scripted as a queue of chunks and
//! failures, writes and control-line changes are recorded, and the modem
//! input lines can be flipped while a bridge is running.

use super::error::PortError;
use super::traits::{ModemStatus, PortHandle};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One scripted outcome of a read call.
#[derive(Debug)]
enum ReadStep {
    Data(Vec<u8>),
    Fail(String),
}

/// Inner state of the mock port, protected by a mutex for interior mutability.
#[derive(Debug, Default)]
struct MockPortState {
    /// Scripted read results, consumed front to back.
    read_queue: VecDeque<ReadStep>,
    /// Log of every successful write call.
    write_log: Vec<Vec<u8>>,
    /// Number of write calls started, including ones still sleeping.
    write_attempts: usize,
    /// Largest number of bytes accepted per write call.
    max_write_chunk: Option<usize>,
    /// Artificial latency applied to each write call.
    write_delay: Duration,
    /// Number of upcoming write calls that time out without accepting data.
    write_timeouts: usize,
    write_error: Option<String>,
    modem: ModemStatus,
    modem_error: Option<String>,
    rts_history: Vec<bool>,
    dtr_history: Vec<bool>,
    control_error: Option<String>,
    /// How long an empty read blocks before reporting a timeout.
    read_timeout: Duration,
}

/// Mock serial port implementation for testing.
///
/// Clones share state, so a test keeps one clone for scripting and
/// inspection while the bridge owns another.
///
/// # Example
/// ```
/// use serial_tap::port::{MockSerialPort, PortHandle};
///
/// let port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"Hello");
///
/// let mut buffer = [0u8; 16];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"Hello");
///
/// port.write_bytes(b"Response").unwrap();
/// assert_eq!(port.written_bytes(), b"Response");
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                read_timeout: Duration::from_millis(5),
                ..Default::default()
            })),
        }
    }

    /// Queue one chunk to be returned by a later read call.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state
            .lock()
            .read_queue
            .push_back(ReadStep::Data(data.to_vec()));
    }

    /// Queue a read failure behind any chunks already queued.
    pub fn enqueue_read_error(&self, message: impl Into<String>) {
        self.state
            .lock()
            .read_queue
            .push_back(ReadStep::Fail(message.into()));
    }

    /// Set how long an empty read blocks before returning zero bytes.
    pub fn set_read_timeout(&self, timeout: Duration) {
        self.state.lock().read_timeout = timeout;
    }

    /// Accept at most `limit` bytes per write call.
    pub fn set_max_write_chunk(&self, limit: usize) {
        self.state.lock().max_write_chunk = Some(limit);
    }

    /// Sleep this long inside every write call.
    pub fn set_write_delay(&self, delay: Duration) {
        self.state.lock().write_delay = delay;
    }

    /// Make the next `count` write calls time out without accepting data.
    /// Each one blocks for the read timeout first, like a real device.
    pub fn enqueue_write_timeouts(&self, count: usize) {
        let mut state = self.state.lock();
        state.write_timeouts = state.write_timeouts.saturating_add(count);
    }

    /// Make every subsequent write call fail.
    pub fn fail_writes(&self, message: impl Into<String>) {
        self.state.lock().write_error = Some(message.into());
    }

    /// Make every subsequent RTS/DTR change fail.
    pub fn fail_control(&self, message: impl Into<String>) {
        self.state.lock().control_error = Some(message.into());
    }

    /// Make every subsequent modem status sample fail.
    pub fn fail_modem_status(&self, message: impl Into<String>) {
        self.state.lock().modem_error = Some(message.into());
    }

    /// Change the CTS/DSR levels seen by the next sample.
    pub fn set_modem_status(&self, cts: bool, dsr: bool) {
        self.state.lock().modem = ModemStatus { cts, dsr };
    }

    /// Every successful write call, in completion order.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// All written bytes concatenated in completion order.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.state.lock().write_log.concat()
    }

    pub fn write_attempts(&self) -> usize {
        self.state.lock().write_attempts
    }

    /// Every RTS level applied, oldest first.
    pub fn rts_history(&self) -> Vec<bool> {
        self.state.lock().rts_history.clone()
    }

    /// Every DTR level applied, oldest first.
    pub fn dtr_history(&self) -> Vec<bool> {
        self.state.lock().dtr_history.clone()
    }

    /// Number of scripted read steps not yet consumed.
    pub fn pending_reads(&self) -> usize {
        self.state.lock().read_queue.len()
    }
}

impl PortHandle for MockSerialPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let idle = {
            let mut state = self.state.lock();
            match state.read_queue.pop_front() {
                Some(ReadStep::Data(mut chunk)) => {
                    let n = chunk.len().min(buffer.len());
                    buffer[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        state.read_queue.push_front(ReadStep::Data(chunk.split_off(n)));
                    }
                    return Ok(n);
                }
                Some(ReadStep::Fail(message)) => {
                    return Err(PortError::Io(std::io::Error::other(message)));
                }
                None => state.read_timeout,
            }
        };

        // Nothing queued: behave like a read that ran into its timeout.
        std::thread::sleep(idle);
        Ok(0)
    }

    fn write_bytes(&self, data: &[u8]) -> Result<usize, PortError> {
        let delay = {
            let mut state = self.state.lock();
            state.write_attempts += 1;
            state.write_delay
        };

        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock();
        if let Some(message) = &state.write_error {
            return Err(PortError::Io(std::io::Error::other(message.clone())));
        }
        if state.write_timeouts > 0 {
            state.write_timeouts -= 1;
            let timeout = state.read_timeout;
            drop(state);
            std::thread::sleep(timeout);
            return Err(PortError::timeout(timeout));
        }

        let n = state
            .max_write_chunk
            .map_or(data.len(), |limit| limit.min(data.len()));
        state.write_log.push(data[..n].to_vec());
        Ok(n)
    }

    fn modem_status(&self) -> Result<ModemStatus, PortError> {
        let state = self.state.lock();
        match &state.modem_error {
            Some(message) => Err(PortError::Io(std::io::Error::other(message.clone()))),
            None => Ok(state.modem),
        }
    }

    fn set_rts(&self, level: bool) -> Result<(), PortError> {
        let mut state = self.state.lock();
        if let Some(message) = &state.control_error {
            return Err(PortError::config(message.clone()));
        }
        state.rts_history.push(level);
        Ok(())
    }

    fn set_dtr(&self, level: bool) -> Result<(), PortError> {
        let mut state = self.state.lock();
        if let Some(message) = &state.control_error {
            return Err(PortError::config(message.clone()));
        }
        state.dtr_history.push(level);
        Ok(())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("pending_reads", &self.pending_reads())
            .finish()
    }
}
