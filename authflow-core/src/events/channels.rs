//! Event channel factories and handles.
//!
//! Sign-up requests and emitted events travel over bounded mpsc channels.
//! Auth snapshots use an unbounded channel owned by
//! [`AuthEventChannel`](crate::processors::AuthEventChannel) since the
//! provider callback must never block.

use super::types::{EmittedEvent, SignUpRequest};
use compact_str::CompactString;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Default buffer size for event channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for SignUpRequest values.
pub type SignUpRequestSender = mpsc::Sender<SignUpRequest>;
/// Receiver handle for SignUpRequest values.
pub type SignUpRequestReceiver = mpsc::Receiver<SignUpRequest>;

/// Sender handle for EmittedEvent values.
pub type EmittedEventSender = mpsc::Sender<EmittedEvent>;
/// Receiver handle for EmittedEvent values.
pub type EmittedEventReceiver = mpsc::Receiver<EmittedEvent>;

/// Create a new SignUpRequest channel.
pub fn sign_up_request_channel() -> (SignUpRequestSender, SignUpRequestReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new EmittedEvent channel.
///
/// The receiver belongs to the store; the sender is wrapped in an
/// [`EventSink`] and shared by every processor.
pub fn emitted_event_channel() -> (EmittedEventSender, EmittedEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Returned when the receiving side of an [`EventSink`] is gone.
#[derive(Debug, Error)]
#[error("event sink closed, {0:?} was not delivered")]
pub struct SinkClosed(pub EmittedEvent);

/// Shared emission handle.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: EmittedEventSender,
}

impl EventSink {
    pub fn new(tx: EmittedEventSender) -> Self {
        Self { tx }
    }

    /// Hand an event to the store, in program order for the calling task.
    pub async fn emit(&self, event: EmittedEvent) -> Result<(), SinkClosed> {
        self.tx.send(event).await.map_err(|e| SinkClosed(e.0))
    }
}

/// Caller-facing handle for submitting sign-up requests.
#[derive(Debug, Clone)]
pub struct SignUpHandle {
    tx: SignUpRequestSender,
}

impl SignUpHandle {
    pub fn new(tx: SignUpRequestSender) -> Self {
        Self { tx }
    }

    /// Enqueue a sign-up request.
    ///
    /// Returns `false` once the processor has reached its hard limit; the
    /// request is then dropped without any emission.
    pub async fn submit(
        &self,
        email: impl Into<CompactString>,
        password: impl Into<String>,
    ) -> bool {
        let request = SignUpRequest::new(email, password);
        match self.tx.send(request).await {
            Ok(()) => true,
            Err(e) => {
                debug!(email = %e.0.email, "Sign-up processor terminated, request discarded");
                false
            }
        }
    }

    /// Whether the processor has stopped accepting requests.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
