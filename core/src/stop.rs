//! Stop notification handed to a runner by its caller.

use tokio_util::sync::CancellationToken;

/// Cloneable, level-triggered stop notification.
///
/// Once triggered it stays triggered. The runner only polls it between
/// launches; it never interrupts work already in flight. Where the trigger
/// comes from (Ctrl-C, a shutdown RPC, a test) is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    token: CancellationToken,
}

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Non-blocking check.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`trigger`](Self::trigger) has been called on any clone.
    pub async fn triggered(&self) {
        self.token.cancelled().await;
    }

    /// A signal that fires when this one does, but can also be triggered on its own.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}

impl From<CancellationToken> for StopSignal {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}
