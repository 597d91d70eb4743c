//! Shared test utilities for serial-tap integration tests.
//!
//! This module provides common test infrastructure including:
//! - A bridge harness running over two mock ports
//! - Polling helpers for asynchronous assertions

#![allow(dead_code)]

use serial_tap::{
    Bridge, BridgeSettings, BridgeState, DispatchMode, MockSerialPort, ShutdownCause,
    ShutdownCoordinator, ShutdownReporter,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Upper bound for anything a test waits on.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Bridge settings with a fast control-line poll.
pub fn fast_settings(dispatch: DispatchMode) -> BridgeSettings {
    BridgeSettings {
        poll_interval: Duration::from_millis(1),
        dispatch,
        ..BridgeSettings::default()
    }
}

/// A running bridge plus handles to both mock ports.
pub struct TestHarness {
    pub left: MockSerialPort,
    pub right: MockSerialPort,
    pub reporter: ShutdownReporter,
    pub state: watch::Receiver<BridgeState>,
    pub handle: JoinHandle<ShutdownCause>,
}

impl TestHarness {
    /// Start a bridge between two fresh mock ports.
    pub fn start(settings: BridgeSettings) -> Self {
        Self::start_with(
            MockSerialPort::new("MOCK-L"),
            MockSerialPort::new("MOCK-R"),
            settings,
            ShutdownCoordinator::new(),
        )
    }

    /// Start a bridge over prepared ports and coordinator.
    pub fn start_with(
        left: MockSerialPort,
        right: MockSerialPort,
        settings: BridgeSettings,
        coordinator: ShutdownCoordinator,
    ) -> Self {
        let bridge = Bridge::new(Arc::new(left.clone()), Arc::new(right.clone()), settings);
        let state = bridge.state();
        let reporter = coordinator.reporter();
        let handle = tokio::spawn(bridge.run(coordinator));

        Self {
            left,
            right,
            reporter,
            state,
            handle,
        }
    }

    /// Wait for the run to end on its own.
    pub async fn finished(self) -> ShutdownCause {
        tokio::time::timeout(TEST_TIMEOUT, self.handle)
            .await
            .expect("bridge did not stop in time")
            .expect("bridge task panicked")
    }

    /// Report a user break and wait for the run to end.
    pub async fn stop(self) -> ShutdownCause {
        self.reporter.report(ShutdownCause::UserBreak);
        self.finished().await
    }
}

/// Poll `condition` until it holds or `TEST_TIMEOUT` elapses.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + TEST_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    condition()
}
