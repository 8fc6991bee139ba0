//! AuthSync processor.
//!
//! The AuthSync is responsible for:
//! - Taking `AuthSnapshot` values from the `AuthEventChannel`
//! - Emitting `SIGN_IN_SUCCESS` for a present identity
//! - Emitting `SIGN_OUT_SUCCESS` for an absent one
//!
//! Exactly one emission per snapshot. Repeated snapshots are not collapsed.

use super::auth_channel::AuthEventChannel;
use crate::events::{AuthSnapshot, EmittedEvent, EventSink};
use kanau::processor::Processor;
use std::convert::Infallible;
use tracing::{debug, info, warn};

pub struct AuthSync {
    channel: AuthEventChannel,
    sink: EventSink,
}

impl AuthSync {
    pub fn new(channel: AuthEventChannel, sink: EventSink) -> Self {
        Self { channel, sink }
    }

    /// Run for as long as the provider keeps the subscription alive.
    pub async fn run(mut self) {
        info!("AuthSync started");

        while let Some(snapshot) = self.channel.take().await {
            let Ok(event) = self.process(snapshot).await;
            debug!(kind = %event.kind(), "Emitting auth state event");

            if let Err(e) = self.sink.emit(event).await {
                warn!(error = %e, "AuthSync lost its event sink");
                break;
            }
        }

        info!("AuthSync stopped");
    }
}

impl Processor<AuthSnapshot> for AuthSync {
    type Output = EmittedEvent;
    type Error = Infallible;

    async fn process(&self, snapshot: AuthSnapshot) -> Result<EmittedEvent, Infallible> {
        Ok(match snapshot.identity {
            Some(identity) => EmittedEvent::SignInSuccess { identity },
            None => EmittedEvent::SignOutSuccess,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EmittedEventReceiver, Identity, emitted_event_channel};
    use crate::processors::auth_channel::tests::ManualSource;

    fn start(source: &ManualSource) -> (EmittedEventReceiver, tokio::task::JoinHandle<()>) {
        let (event_tx, event_rx) = emitted_event_channel();
        let sync = AuthSync::new(AuthEventChannel::open(source), EventSink::new(event_tx));
        (event_rx, tokio::spawn(sync.run()))
    }

    #[tokio::test]
    async fn test_present_identity_maps_to_sign_in() {
        let source = ManualSource::default();
        let (mut rx, _task) = start(&source);

        source.push(Some(Identity::new("u1")));

        assert_eq!(
            rx.recv().await,
            Some(EmittedEvent::SignInSuccess {
                identity: Identity::new("u1")
            })
        );
    }

    #[tokio::test]
    async fn test_absent_identity_maps_to_sign_out() {
        let source = ManualSource::default();
        let (mut rx, _task) = start(&source);

        source.push(None);

        assert_eq!(rx.recv().await, Some(EmittedEvent::SignOutSuccess));
    }

    #[tokio::test]
    async fn test_identical_snapshots_are_not_deduplicated() {
        let source = ManualSource::default();
        let (mut rx, task) = start(&source);

        source.push(Some(Identity::new("u1")));
        source.push(Some(Identity::new("u1")));
        source.push(None);
        source.push(None);
        source.disconnect();
        task.await.unwrap();

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        let sign_in = EmittedEvent::SignInSuccess {
            identity: Identity::new("u1"),
        };
        assert_eq!(
            events,
            vec![
                sign_in.clone(),
                sign_in,
                EmittedEvent::SignOutSuccess,
                EmittedEvent::SignOutSuccess
            ]
        );
    }
}
