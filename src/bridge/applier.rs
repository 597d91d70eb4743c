//! Applies one event to its destination endpoint.

use super::endpoint::Endpoint;
use super::event::{OutputLine, PortEvent};
use super::shutdown::{CancelSignal, ShutdownReporter};
use crate::error::BridgeError;
use crate::logging;
use crate::port::{PortError, PortHandle};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;

/// Write all of `data`, resuming after short writes.
///
/// A timed-out attempt means the device is still draining its output buffer
/// and is retried from the same offset, until `cancel` fires. A call that
/// returns zero bytes without timing out is a failure: it would otherwise spin.
pub fn write_all(
    port: &dyn PortHandle,
    data: &[u8],
    cancel: &CancelSignal,
) -> Result<(), PortError> {
    let mut written = 0;
    while written < data.len() {
        match port.write_bytes(&data[written..]) {
            Ok(0) => {
                return Err(PortError::Io(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "port accepted no bytes",
                )))
            }
            Ok(n) => written += n,
            Err(PortError::Timeout(after)) if cancel.is_cancelled() => {
                return Err(PortError::Timeout(after));
            }
            Err(PortError::Timeout(after)) => {
                trace!(port = port.name(), ?after, written, "write stalled, retrying");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Apply `event` to `destination`. Blocking.
///
/// Control changes are logged before the line is driven, data after it has
/// been written, so a failed write never shows up as forwarded traffic.
pub fn apply(
    destination: &Endpoint,
    event: PortEvent,
    log_control_flow: bool,
    cancel: &CancelSignal,
) -> Result<(), BridgeError> {
    match event {
        PortEvent::Control { line, asserted } => {
            logging::log_control_flow(log_control_flow, destination.direction(), line, asserted);

            let output = line.mirrored();
            let port = destination.port();
            let result = match output {
                OutputLine::Rts => port.set_rts(asserted),
                OutputLine::Dtr => port.set_dtr(asserted),
            };
            result.map_err(|source| BridgeError::SetLine {
                label: destination.label().to_string(),
                line: output,
                level: asserted,
                source,
            })
        }
        PortEvent::Data(data) => {
            write_all(destination.port(), &data, cancel).map_err(|source| BridgeError::Write {
                label: destination.label().to_string(),
                source,
            })?;
            logging::log_data(destination.direction(), &data);
            Ok(())
        }
    }
}

/// Apply `event` and report a failure as the shutdown cause.
pub fn apply_or_report(
    destination: &Endpoint,
    event: PortEvent,
    log_control_flow: bool,
    cancel: &CancelSignal,
    reporter: &ShutdownReporter,
) {
    if let Err(err) = apply(destination, event, log_control_flow, cancel) {
        reporter.report(err);
    }
}

/// Drain one destination's ordered lane, applying events strictly in turn.
///
/// Ends when the lane closes or after the first failure.
pub async fn run_lane(
    destination: Arc<Endpoint>,
    mut lane: mpsc::Receiver<PortEvent>,
    log_control_flow: bool,
    cancel: CancelSignal,
    reporter: ShutdownReporter,
) {
    while let Some(event) = lane.recv().await {
        let endpoint = Arc::clone(&destination);
        let cancel = cancel.clone();
        let applied = tokio::task::spawn_blocking(move || {
            apply(&endpoint, event, log_control_flow, &cancel)
        })
        .await;

        match applied {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                reporter.report(err);
                return;
            }
            Err(join_err) => {
                reporter.report(BridgeError::TaskFailed(join_err.to_string()));
                return;
            }
        }
    }
}
