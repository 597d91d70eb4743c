//! Data reader: forwards bytes as soon as a read returns them.

use super::endpoint::Endpoint;
use super::event::PortEvent;
use super::shutdown::{CancelSignal, ShutdownReporter};
use crate::error::BridgeError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Default size of the per-reader buffer.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Read from `endpoint` until cancelled. Blocking; run it on the blocking pool.
///
/// Each non-empty read becomes one [`PortEvent::Data`] holding a copy of the
/// bytes, since the buffer is reused. Timeouts (zero-byte reads) just loop;
/// any other failure is reported and ends the reader.
pub fn run(
    endpoint: Arc<Endpoint>,
    buffer_size: usize,
    events: mpsc::Sender<PortEvent>,
    cancel: CancelSignal,
    reporter: ShutdownReporter,
) {
    let mut buffer = vec![0u8; buffer_size];

    while !cancel.is_cancelled() {
        let n = match endpoint.port().read_bytes(&mut buffer) {
            Ok(n) => n,
            Err(source) => {
                reporter.report(BridgeError::Read {
                    label: endpoint.label().to_string(),
                    source,
                });
                return;
            }
        };

        if n == 0 {
            continue;
        }

        if events
            .blocking_send(PortEvent::Data(buffer[..n].to_vec()))
            .is_err()
        {
            debug!(label = endpoint.label(), "router gone, stopping reader");
            return;
        }
    }

    debug!(label = endpoint.label(), "reader cancelled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::shutdown::{ShutdownCause, ShutdownCoordinator};
    use crate::port::MockSerialPort;

    fn endpoint(port: &MockSerialPort) -> Arc<Endpoint> {
        let (_, right) = Endpoint::pair(
            Arc::new(MockSerialPort::new("unused")),
            "Left Port",
            Arc::new(port.clone()),
            "Right Port",
        );
        Arc::new(right)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_chunks_are_copied_in_order() {
        let port = MockSerialPort::new("MOCK0");
        port.enqueue_read(&[0x41, 0x42]);
        port.enqueue_read(&[0x43]);
        let coordinator = ShutdownCoordinator::new();
        let (tx, mut rx) = mpsc::channel(1);

        let cancel = coordinator.cancel_signal();
        let reporter = coordinator.reporter();
        let ep = endpoint(&port);
        let task = tokio::task::spawn_blocking(move || run(ep, 16, tx, cancel, reporter));

        assert_eq!(rx.recv().await, Some(PortEvent::Data(vec![0x41, 0x42])));
        assert_eq!(rx.recv().await, Some(PortEvent::Data(vec![0x43])));

        coordinator.cancel();
        task.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_small_buffer_splits_chunks() {
        let port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"abcde");
        let coordinator = ShutdownCoordinator::new();
        let (tx, mut rx) = mpsc::channel(1);

        let cancel = coordinator.cancel_signal();
        let reporter = coordinator.reporter();
        let ep = endpoint(&port);
        let task = tokio::task::spawn_blocking(move || run(ep, 2, tx, cancel, reporter));

        let mut received = Vec::new();
        while received.len() < 5 {
            match rx.recv().await {
                Some(PortEvent::Data(chunk)) => {
                    assert!(chunk.len() <= 2);
                    received.extend(chunk);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(received, b"abcde");

        coordinator.cancel();
        task.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_read_failure_is_reported_with_source_label() {
        let port = MockSerialPort::new("MOCK0");
        port.enqueue_read_error("framing error");
        let mut coordinator = ShutdownCoordinator::new();
        let (tx, _rx) = mpsc::channel(1);

        let cancel = coordinator.cancel_signal();
        let reporter = coordinator.reporter();
        let ep = endpoint(&port);
        tokio::task::spawn_blocking(move || run(ep, 16, tx, cancel, reporter))
            .await
            .unwrap();

        match coordinator.next_cause().await {
            ShutdownCause::Fatal(BridgeError::Read { label, .. }) => {
                assert_eq!(label, "Right Port")
            }
            other => panic!("unexpected cause: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_reader_reports_nothing() {
        let port = MockSerialPort::new("MOCK0");
        let mut coordinator = ShutdownCoordinator::new();
        let (tx, _rx) = mpsc::channel(1);

        let cancel = coordinator.cancel_signal();
        let reporter = coordinator.reporter();
        let ep = endpoint(&port);
        let task = tokio::task::spawn_blocking(move || run(ep, 16, tx, cancel, reporter));

        coordinator.cancel();
        task.await.unwrap();
        assert_eq!(coordinator.discard_late_causes(), 0);
    }
}
