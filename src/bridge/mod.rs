//! The bidirectional proxy engine.
//!
//! ```text
//! left  monitor ─┐                         ┌─> applier ─> right port
//! left  reader  ─┼─> router (select!) ─────┤
//! right monitor ─┤        ^                └─> applier ─> left port
//! right reader  ─┘        │
//!                 shutdown causes
//! ```
//!
//! Every event observed on one endpoint is applied to the other. The first
//! shutdown cause stops routing, cancels the monitors and readers, and the run
//! returns only after every launched task has finished.

pub mod applier;
pub mod endpoint;
pub mod event;
pub mod monitor;
pub mod reader;
mod router;
pub mod shutdown;

pub use endpoint::{Endpoint, Side};
pub use event::{ControlLine, OutputLine, PortEvent};
pub use shutdown::{
    spawn_ctrl_c_listener, spawn_keypress_listener, CancelSignal, ShutdownCause,
    ShutdownCoordinator, ShutdownReporter,
};

use crate::port::PortHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// How routed events are handed to appliers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One task per event; writes to the same port may complete out of order.
    #[default]
    Concurrent,
    /// One worker per destination; events are applied in routing order.
    Ordered,
}

/// Lifecycle of a bridge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::ShuttingDown => "shutting down",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Immutable per-run settings, built once at startup.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub left_label: String,
    pub right_label: String,
    pub read_buffer_size: usize,
    pub poll_interval: Duration,
    pub log_control_flow: bool,
    pub dispatch: DispatchMode,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            left_label: "Left Port".to_string(),
            right_label: "Right Port".to_string(),
            read_buffer_size: reader::DEFAULT_READ_BUFFER_SIZE,
            poll_interval: monitor::DEFAULT_POLL_INTERVAL,
            log_control_flow: false,
            dispatch: DispatchMode::Concurrent,
        }
    }
}

/// Two opened endpoints, ready to be bridged.
pub struct Bridge {
    left: Arc<Endpoint>,
    right: Arc<Endpoint>,
    settings: BridgeSettings,
    state: watch::Sender<BridgeState>,
}

impl Bridge {
    pub fn new(
        left: Arc<dyn PortHandle>,
        right: Arc<dyn PortHandle>,
        settings: BridgeSettings,
    ) -> Self {
        let (left, right) =
            Endpoint::pair(left, &settings.left_label, right, &settings.right_label);
        let (state, _) = watch::channel(BridgeState::Starting);
        Self {
            left: Arc::new(left),
            right: Arc::new(right),
            settings,
            state,
        }
    }

    /// Observe the run's state transitions.
    pub fn state(&self) -> watch::Receiver<BridgeState> {
        self.state.subscribe()
    }

    fn transition(&self, next: BridgeState) {
        let previous = self.state.send_replace(next);
        debug!(from = %previous, to = %next, "bridge state changed");
    }

    /// Forward traffic until the first shutdown cause, then shut down and
    /// return that cause.
    ///
    /// Causes reported through `coordinator` (user breaks included) end the
    /// run. By the time this returns every monitor, reader and applier has
    /// finished, so writes accepted before the cause have completed.
    pub async fn run(self, mut coordinator: ShutdownCoordinator) -> ShutdownCause {
        let settings = &self.settings;
        let reporter = coordinator.reporter();
        let mut workers = JoinSet::new();
        let mut appliers = JoinSet::new();

        let (left_tx, left_rx) = mpsc::channel(1);
        let (right_tx, right_rx) = mpsc::channel(1);

        for (endpoint, events) in [(&self.left, left_tx), (&self.right, right_tx)] {
            workers.spawn(monitor::run(
                Arc::clone(endpoint),
                settings.poll_interval,
                events.clone(),
                coordinator.cancel_signal(),
                reporter.clone(),
            ));

            let endpoint = Arc::clone(endpoint);
            let buffer_size = settings.read_buffer_size;
            let cancel = coordinator.cancel_signal();
            let reporter = reporter.clone();
            workers.spawn_blocking(move || {
                reader::run(endpoint, buffer_size, events, cancel, reporter)
            });
        }

        let dispatcher = router::Dispatcher::new(
            Arc::clone(&self.left),
            Arc::clone(&self.right),
            settings.dispatch,
            settings.log_control_flow,
            coordinator.cancel_signal(),
            reporter,
            &mut appliers,
        );

        self.transition(BridgeState::Running);
        info!(
            left = self.left.label(),
            right = self.right.label(),
            mode = ?settings.dispatch,
            "bridge running"
        );

        let cause = router::route(
            left_rx,
            right_rx,
            dispatcher,
            &mut coordinator,
            &mut appliers,
        )
        .await;

        self.transition(BridgeState::ShuttingDown);
        info!(%cause, "shutting down bridge");
        coordinator.cancel();

        for tasks in [&mut workers, &mut appliers] {
            while let Some(joined) = tasks.join_next().await {
                if let Err(err) = joined {
                    warn!(error = %err, "bridge task failed during shutdown");
                }
            }
        }

        coordinator.discard_late_causes();
        self.transition(BridgeState::Stopped);
        cause
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
