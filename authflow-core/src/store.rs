//! Auth state store.
//!
//! Consumes the emitted event stream and folds it into [`AuthState`]. The
//! two processor streams arrive interleaved in no particular order, so
//! every transition only looks at the event in hand.

use crate::events::{AuthError, EmittedEvent, EmittedEventReceiver, Identity};
use kanau::processor::Processor;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthState {
    pub user: Option<Identity>,
    pub loading: bool,
    pub error: Option<AuthError>,
}

impl AuthState {
    pub fn is_authorized(&self) -> bool {
        self.user.is_some()
    }

    /// Apply one event. Kinds without a transition leave the state as is.
    pub fn reduce(&mut self, event: &EmittedEvent) {
        match event {
            EmittedEvent::SignUpStart => {
                self.loading = true;
            }
            EmittedEvent::SignInSuccess { identity } => {
                self.loading = false;
                self.user = Some(identity.clone());
                self.error = None;
            }
            EmittedEvent::SignOutSuccess => {
                self.user = None;
            }
            EmittedEvent::SignUpError { error } => {
                self.error = Some(error.clone());
                self.loading = false;
            }
            EmittedEvent::SignUpSuccess { .. }
            | EmittedEvent::SignUpTimeoutLimit
            | EmittedEvent::SignUpHardLimit => {}
        }
    }
}

/// Shared handle to the current [`AuthState`].
#[derive(Clone, Default)]
pub struct AuthStore {
    state: Arc<RwLock<AuthState>>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// Apply events in arrival order until every sender is gone.
    pub async fn run(self, mut event_rx: EmittedEventReceiver) {
        info!("AuthStore started");

        while let Some(event) = event_rx.recv().await {
            let Ok(()) = self.process(event).await;
        }

        info!("EmittedEvent channel closed, AuthStore stopped");
    }
}

impl Processor<EmittedEvent> for AuthStore {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, event: EmittedEvent) -> Result<(), Infallible> {
        debug!(kind = %event.kind(), "Applying event");
        self.state.write().await.reduce(&event);
        Ok(())
    }
}
