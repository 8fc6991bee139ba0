//! Starts the sign-up and auth sync processors side by side.
//!
//! The two tasks share nothing but the event sink. Either may stop without
//! affecting the other; in particular the sign-up side reaching its hard
//! limit leaves auth sync running.

use crate::events::{EventSink, SignUpHandle, sign_up_request_channel};
use crate::processors::{AuthEventChannel, AuthSync, SignUpProcessor};
use crate::provider::AuthProvider;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

pub struct Orchestrator;

/// Join handles for the two processor tasks.
pub struct OrchestratorHandle {
    pub sign_up: JoinHandle<()>,
    pub auth_sync: JoinHandle<()>,
}

impl Orchestrator {
    /// Open the auth channel and spawn both processors.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<P>(provider: Arc<P>, sink: EventSink) -> (SignUpHandle, OrchestratorHandle)
    where
        P: AuthProvider + 'static,
    {
        let (request_tx, request_rx) = sign_up_request_channel();

        let sign_up = SignUpProcessor::new(provider.clone(), request_rx, sink.clone());
        let auth_sync = AuthSync::new(AuthEventChannel::open(provider.as_ref()), sink);

        let handle = OrchestratorHandle {
            sign_up: tokio::spawn(sign_up.run()),
            auth_sync: tokio::spawn(auth_sync.run()),
        };
        info!("Orchestrator started sign-up and auth sync processors");

        (SignUpHandle::new(request_tx), handle)
    }
}

impl OrchestratorHandle {
    /// Abort both tasks. Only meant for process shutdown.
    pub fn shutdown(&self) {
        self.sign_up.abort();
        self.auth_sync.abort();
        info!("Orchestrator tasks aborted");
    }
}
