//! Control-line monitor: samples CTS and DSR and surfaces every transition.

use super::endpoint::Endpoint;
use super::event::{ControlLine, PortEvent};
use super::shutdown::{CancelSignal, ShutdownReporter};
use crate::error::BridgeError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Default interval between two samples of the input lines.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Record `now` as the line's state, returning it if it differs from the last
/// known one. An unknown (`None`) previous state always counts as a change.
fn transition(last: &mut Option<bool>, now: bool) -> Option<bool> {
    if *last == Some(now) {
        return None;
    }
    *last = Some(now);
    Some(now)
}

/// Poll `endpoint`'s input lines until cancelled.
///
/// CTS is checked before DSR on every poll, so when both changed the CTS
/// event is sent first. A sampling failure is reported and ends the monitor.
pub async fn run(
    endpoint: Arc<Endpoint>,
    poll_interval: Duration,
    events: mpsc::Sender<PortEvent>,
    mut cancel: CancelSignal,
    reporter: ShutdownReporter,
) {
    let mut cts = None;
    let mut dsr = None;

    loop {
        let status = match endpoint.port().modem_status() {
            Ok(status) => status,
            Err(source) => {
                reporter.report(BridgeError::ModemStatus {
                    label: endpoint.label().to_string(),
                    source,
                });
                return;
            }
        };

        let changes = [
            (ControlLine::Cts, transition(&mut cts, status.cts)),
            (ControlLine::Dsr, transition(&mut dsr, status.dsr)),
        ];
        for (line, change) in changes {
            let Some(asserted) = change else { continue };
            trace!(label = endpoint.label(), %line, asserted, "input line changed");
            if events.send(PortEvent::control(line, asserted)).await.is_err() {
                debug!(label = endpoint.label(), "router gone, stopping control monitor");
                return;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(poll_interval) => {}
            _ = cancel.cancelled() => {
                debug!(label = endpoint.label(), "control monitor cancelled");
                return;
            }
        }
    }
}
