//! Single-cause termination.
//!
//! Any task may report a [`ShutdownCause`]; the bridge acts on the first one
//! only. Cancellation is a `watch` broadcast observed by every monitor and
//! reader at its loop boundary.

use crate::error::BridgeError;
use std::fmt;
use std::io::Read;
use std::process::ExitCode;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// Why a bridge run ended.
#[derive(Debug)]
pub enum ShutdownCause {
    /// The operator asked to stop (keypress or Ctrl-C).
    UserBreak,
    /// An I/O failure on one of the endpoints.
    Fatal(BridgeError),
}

impl ShutdownCause {
    pub fn is_user_break(&self) -> bool {
        matches!(self, Self::UserBreak)
    }

    /// Process exit status: success only for an operator-requested stop.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::UserBreak => ExitCode::SUCCESS,
            Self::Fatal(_) => ExitCode::FAILURE,
        }
    }
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserBreak => f.write_str("break by user"),
            Self::Fatal(err) => write!(f, "{err}"),
        }
    }
}

impl From<BridgeError> for ShutdownCause {
    fn from(err: BridgeError) -> Self {
        Self::Fatal(err)
    }
}

/// Cloneable handle used to report a shutdown cause.
#[derive(Debug, Clone)]
pub struct ShutdownReporter {
    tx: mpsc::UnboundedSender<ShutdownCause>,
}

impl ShutdownReporter {
    pub fn report(&self, cause: impl Into<ShutdownCause>) {
        // A closed channel means a shutdown is already underway.
        let _ = self.tx.send(cause.into());
    }
}

/// Receiving side of the cancellation broadcast.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation has been broadcast.
    pub async fn cancelled(&mut self) {
        // A dropped coordinator counts as cancellation too.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Collects shutdown causes and owns the cancellation broadcast.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    causes_tx: mpsc::UnboundedSender<ShutdownCause>,
    causes_rx: mpsc::UnboundedReceiver<ShutdownCause>,
    cancel_tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (causes_tx, causes_rx) = mpsc::unbounded_channel();
        let (cancel_tx, _) = watch::channel(false);
        Self {
            causes_tx,
            causes_rx,
            cancel_tx,
        }
    }

    pub fn reporter(&self) -> ShutdownReporter {
        ShutdownReporter {
            tx: self.causes_tx.clone(),
        }
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.cancel_tx.subscribe(),
        }
    }

    /// Wait for the first reported cause.
    pub async fn next_cause(&mut self) -> ShutdownCause {
        match self.causes_rx.recv().await {
            Some(cause) => cause,
            // Unreachable while `causes_tx` is held.
            None => ShutdownCause::Fatal(BridgeError::TaskFailed(
                "shutdown channel closed".to_string(),
            )),
        }
    }

    /// Broadcast cancellation to every monitor and reader.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Drop causes that arrived after the first one, returning how many.
    pub fn discard_late_causes(&mut self) -> usize {
        let mut discarded = 0;
        while let Ok(cause) = self.causes_rx.try_recv() {
            debug!(%cause, "ignoring shutdown cause reported after the first");
            discarded += 1;
        }
        discarded
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Report a user break on the first byte (or EOF) read from stdin.
///
/// Runs on a plain OS thread: a pending console read must not keep the
/// runtime alive once the bridge has stopped for another reason.
pub fn spawn_keypress_listener(reporter: ShutdownReporter) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("keypress-listener".to_string())
        .spawn(move || {
            let mut byte = [0u8; 1];
            if let Err(e) = std::io::stdin().read(&mut byte) {
                warn!(error = %e, "console read failed, treating as user break");
            }
            reporter.report(ShutdownCause::UserBreak);
        })?;
    Ok(())
}

/// Report a user break on Ctrl-C.
pub fn spawn_ctrl_c_listener(reporter: ShutdownReporter) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => reporter.report(ShutdownCause::UserBreak),
            Err(e) => warn!(error = %e, "failed to install Ctrl+C handler"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortError;

    #[tokio::test]
    async fn test_first_cause_wins() {
        let mut coordinator = ShutdownCoordinator::new();
        let reporter = coordinator.reporter();

        reporter.report(ShutdownCause::UserBreak);
        reporter.report(BridgeError::Write {
            label: "Right Port".to_string(),
            source: PortError::config("late"),
        });

        let cause = coordinator.next_cause().await;
        assert!(cause.is_user_break());
        assert_eq!(coordinator.discard_late_causes(), 1);
    }

    #[tokio::test]
    async fn test_cancel_is_broadcast() {
        let coordinator = ShutdownCoordinator::new();
        let mut first = coordinator.cancel_signal();
        let second = coordinator.cancel_signal();
        assert!(!first.is_cancelled());

        coordinator.cancel();

        first.cancelled().await;
        assert!(second.is_cancelled());
        assert!(coordinator.is_cancelled());
    }

    #[test]
    fn test_cause_display() {
        assert_eq!(ShutdownCause::UserBreak.to_string(), "break by user");
        let fatal = ShutdownCause::Fatal(BridgeError::TaskFailed("boom".to_string()));
        assert!(!fatal.is_user_break());
        assert_eq!(fatal.to_string(), "bridge task failed: boom");
    }
}
