//! Event router: the single loop that reads both endpoints' event streams and
//! hands every event to the opposite endpoint.

use super::applier;
use super::endpoint::{Endpoint, Side};
use super::event::PortEvent;
use super::shutdown::{CancelSignal, ShutdownCause, ShutdownCoordinator, ShutdownReporter};
use super::DispatchMode;
use crate::error::BridgeError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::trace;

/// How events reach one destination.
enum Lane {
    /// A fresh applier task per event.
    Concurrent,
    /// A single worker drains this queue in order.
    Ordered(mpsc::Sender<PortEvent>),
}

struct Route {
    endpoint: Arc<Endpoint>,
    lane: Lane,
}

/// Spawns appliers for routed events.
pub(crate) struct Dispatcher {
    to_left: Route,
    to_right: Route,
    log_control_flow: bool,
    cancel: CancelSignal,
    reporter: ShutdownReporter,
}

impl Dispatcher {
    /// Set up both destinations. In ordered mode the lane workers are spawned
    /// into `appliers` right away.
    pub(crate) fn new(
        left: Arc<Endpoint>,
        right: Arc<Endpoint>,
        mode: DispatchMode,
        log_control_flow: bool,
        cancel: CancelSignal,
        reporter: ShutdownReporter,
        appliers: &mut JoinSet<()>,
    ) -> Self {
        let mut make_route = |endpoint: Arc<Endpoint>| {
            let lane = match mode {
                DispatchMode::Concurrent => Lane::Concurrent,
                DispatchMode::Ordered => {
                    let (tx, rx) = mpsc::channel(1);
                    appliers.spawn(applier::run_lane(
                        Arc::clone(&endpoint),
                        rx,
                        log_control_flow,
                        cancel.clone(),
                        reporter.clone(),
                    ));
                    Lane::Ordered(tx)
                }
            };
            Route { endpoint, lane }
        };

        let to_left = make_route(left);
        let to_right = make_route(right);
        Self {
            to_left,
            to_right,
            log_control_flow,
            cancel,
            reporter,
        }
    }

    /// Hand `event` to the applier for `destination`.
    async fn dispatch(&self, destination: Side, event: PortEvent, appliers: &mut JoinSet<()>) {
        let route = match destination {
            Side::Left => &self.to_left,
            Side::Right => &self.to_right,
        };
        trace!(%destination, ?event, "dispatching");

        match &route.lane {
            Lane::Concurrent => {
                let endpoint = Arc::clone(&route.endpoint);
                let reporter = self.reporter.clone();
                let cancel = self.cancel.clone();
                let log_control_flow = self.log_control_flow;
                appliers.spawn_blocking(move || {
                    applier::apply_or_report(
                        &endpoint,
                        event,
                        log_control_flow,
                        &cancel,
                        &reporter,
                    )
                });
            }
            Lane::Ordered(queue) => {
                // A closed lane means its worker already reported a failure.
                let _ = queue.send(event).await;
            }
        }
    }
}

/// Route events until the first shutdown cause arrives, and return it.
///
/// The receivers are consumed: once this returns they are dropped, which
/// releases any reader or monitor blocked on a send.
pub(crate) async fn route(
    mut left_events: mpsc::Receiver<PortEvent>,
    mut right_events: mpsc::Receiver<PortEvent>,
    dispatcher: Dispatcher,
    coordinator: &mut ShutdownCoordinator,
    appliers: &mut JoinSet<()>,
) -> ShutdownCause {
    loop {
        tokio::select! {
            Some(event) = left_events.recv() => {
                dispatcher.dispatch(Side::Right, event, appliers).await;
            }
            Some(event) = right_events.recv() => {
                dispatcher.dispatch(Side::Left, event, appliers).await;
            }
            Some(joined) = appliers.join_next(), if !appliers.is_empty() => {
                if let Err(err) = joined {
                    return ShutdownCause::Fatal(BridgeError::TaskFailed(err.to_string()));
                }
            }
            cause = coordinator.next_cause() => {
                return cause;
            }
        }
    }
}
