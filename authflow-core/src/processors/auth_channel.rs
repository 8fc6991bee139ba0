//! AuthEventChannel.
//!
//! Turns the provider's "register once, called many times" subscription
//! into a FIFO that a single consumer pulls from. The provider callback is
//! the only producer and never blocks; there is no upper bound on what it
//! may buffer.
//!
//! The channel is never closed from this side. It only ends if the
//! provider drops the registered callback.

use crate::events::AuthSnapshot;
use crate::provider::AuthStateSource;
use tokio::sync::mpsc;
use tracing::debug;

pub struct AuthEventChannel {
    snapshot_rx: mpsc::UnboundedReceiver<AuthSnapshot>,
}

impl AuthEventChannel {
    /// Register with `source`. Every callback invocation from then on
    /// appends one snapshot to the buffer.
    pub fn open<S: AuthStateSource + ?Sized>(source: &S) -> Self {
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();

        source.on_auth_change(Box::new(move |identity| {
            if snapshot_tx.send(AuthSnapshot { identity }).is_err() {
                debug!("AuthEventChannel consumer gone, snapshot dropped");
            }
        }));

        Self { snapshot_rx }
    }

    /// Remove and return the oldest snapshot, waiting for one if the
    /// buffer is empty.
    ///
    /// Returns `None` only once the provider has dropped the callback and
    /// every buffered snapshot has been taken.
    pub async fn take(&mut self) -> Option<AuthSnapshot> {
        self.snapshot_rx.recv().await
    }

    #[cfg(test)]
    fn buffered(&self) -> usize {
        self.snapshot_rx.len()
    }
}
