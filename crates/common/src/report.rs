//! The single error-reporting channel every per-event task writes to.

use {tokio::sync::mpsc, tracing::warn};

use crate::Error;

/// Receiving half, owned by the supervisor.
pub type ErrorReceiver = mpsc::UnboundedReceiver<Error>;

/// Cloneable sending half handed to the router, transports and commands.
#[derive(Debug, Clone)]
pub struct ErrorSender {
    tx: mpsc::UnboundedSender<Error>,
}

/// Create a connected sender/receiver pair.
pub fn error_channel() -> (ErrorSender, ErrorReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ErrorSender { tx }, rx)
}

impl ErrorSender {
    /// Report a non-fatal error. Never blocks.
    ///
    /// If the supervisor is gone the error is logged instead of lost.
    pub fn report(&self, error: impl Into<Error>) {
        if let Err(mpsc::error::SendError(error)) = self.tx.send(error.into()) {
            warn!(error = %error, "error channel closed, dropping report");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
