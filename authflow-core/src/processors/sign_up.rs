//! SignUpProcessor.
//!
//! The SignUpProcessor is responsible for:
//! - Receiving one `SignUpRequest` at a time from the request queue
//! - Calling the provider's sign-up operation exactly once per request
//! - Emitting `SIGN_UP_START` and then `SIGN_UP_SUCCESS` or `SIGN_UP_ERROR`
//! - Counting failures and gating further work on that count
//!
//! The failure count is never reset, successes included. Before each
//! request is taken the count is checked:
//! - exactly 3: emit `SIGN_UP_TIMEOUT_LIMIT`, pause for [`THROTTLE_DELAY`]
//! - 5 or more: emit `SIGN_UP_HARD_LIMIT` and stop for good
//!
//! A count of 4 takes neither branch.

use crate::events::{EmittedEvent, EventSink, SignUpRequestReceiver, SinkClosed};
use crate::provider::SignUpService;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Failure count at which a single throttle pause is inserted.
pub const THROTTLE_AT: u32 = 3;

/// Failure count from which the processor terminates.
pub const HARD_LIMIT: u32 = 5;

/// Fixed pause applied in the throttled state.
pub const THROTTLE_DELAY: Duration = Duration::from_millis(1000);

/// What the processor does before taking the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpPhase {
    Normal,
    Throttled,
    Terminated,
}

/// Failures seen by one processor instance. Only ever grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureCounter(u32);

impl FailureCounter {
    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn phase(&self) -> SignUpPhase {
        match self.0 {
            THROTTLE_AT => SignUpPhase::Throttled,
            c if c >= HARD_LIMIT => SignUpPhase::Terminated,
            _ => SignUpPhase::Normal,
        }
    }
}

/// SignUpProcessor runs sign-up requests against the provider.
pub struct SignUpProcessor {
    service: Arc<dyn SignUpService>,
    request_rx: SignUpRequestReceiver,
    sink: EventSink,
    failures: FailureCounter,
}

impl SignUpProcessor {
    /// Create a new SignUpProcessor.
    ///
    /// # Arguments
    ///
    /// * `service` - Provider sign-up operation
    /// * `request_rx` - Receiver for submitted requests
    /// * `sink` - Shared emission sink
    pub fn new(
        service: Arc<dyn SignUpService>,
        request_rx: SignUpRequestReceiver,
        sink: EventSink,
    ) -> Self {
        Self {
            service,
            request_rx,
            sink,
            failures: FailureCounter::default(),
        }
    }

    /// Run until the hard limit is reached, the request queue closes, or
    /// the sink goes away.
    ///
    /// The request queue is closed the moment the failure count reaches
    /// [`HARD_LIMIT`], so [`SignUpHandle`](crate::events::SignUpHandle)
    /// refuses submissions from then on.
    pub async fn run(mut self) {
        info!("SignUpProcessor started");

        if let Err(e) = self.process_requests().await {
            warn!(error = %e, "SignUpProcessor lost its event sink");
        }

        info!(failures = self.failures.get(), "SignUpProcessor stopped");
    }

    async fn process_requests(&mut self) -> Result<(), SinkClosed> {
        loop {
            match self.failures.phase() {
                SignUpPhase::Normal => {}
                SignUpPhase::Throttled => {
                    warn!(
                        failures = self.failures.get(),
                        delay_ms = THROTTLE_DELAY.as_millis() as u64,
                        "Sign-up throttled"
                    );
                    self.sink.emit(EmittedEvent::SignUpTimeoutLimit).await?;
                    tokio::time::sleep(THROTTLE_DELAY).await;
                }
                SignUpPhase::Terminated => {
                    self.request_rx.close();
                    warn!(
                        failures = self.failures.get(),
                        "Sign-up hard limit reached, no further requests will be processed"
                    );
                    self.sink.emit(EmittedEvent::SignUpHardLimit).await?;
                    return Ok(());
                }
            }

            let Some(request) = self.request_rx.recv().await else {
                info!("SignUpRequest channel closed");
                return Ok(());
            };
            debug!(request = ?request, "Received SignUpRequest");

            self.sink.emit(EmittedEvent::SignUpStart).await?;

            match self.service.sign_up(&request.email, &request.password).await {
                Ok(identity) => {
                    info!(uid = %identity.uid, "Sign-up succeeded");
                    self.sink
                        .emit(EmittedEvent::SignUpSuccess { identity })
                        .await?;
                }
                Err(error) => {
                    self.failures.increment();
                    if self.failures.phase() == SignUpPhase::Terminated {
                        // Refuse submissions before anything about this
                        // failure becomes observable.
                        self.request_rx.close();
                    }
                    warn!(
                        error = %error,
                        failures = self.failures.get(),
                        "Sign-up failed"
                    );
                    self.sink.emit(EmittedEvent::SignUpError { error }).await?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{
        AuthError, EmittedEventReceiver, EventKind, Identity, SignUpHandle, emitted_event_channel,
        sign_up_request_channel,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Sign-up service answering from a fixed script, failing once empty.
    #[derive(Default)]
    struct ScriptedSignUp {
        outcomes: Mutex<VecDeque<Result<Identity, AuthError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSignUp {
        fn new(outcomes: impl IntoIterator<Item = Result<Identity, AuthError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SignUpService for ScriptedSignUp {
        async fn sign_up(&self, email: &str, _password: &str) -> Result<Identity, AuthError> {
            self.calls.lock().unwrap().push(email.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(failure()))
        }
    }

    fn failure() -> AuthError {
        AuthError::new("auth/internal-error", "scripted failure")
    }

    fn ok(uid: &str) -> Result<Identity, AuthError> {
        Ok(Identity::new(uid))
    }

    fn start(
        service: Arc<ScriptedSignUp>,
    ) -> (SignUpHandle, EmittedEventReceiver, tokio::task::JoinHandle<()>) {
        let (request_tx, request_rx) = sign_up_request_channel();
        let (event_tx, event_rx) = emitted_event_channel();
        let processor = SignUpProcessor::new(service, request_rx, EventSink::new(event_tx));
        let task = tokio::spawn(processor.run());
        (SignUpHandle::new(request_tx), event_rx, task)
    }

    async fn submit_n(handle: &SignUpHandle, n: usize) {
        for i in 0..n {
            assert!(handle.submit(format!("user{i}@example.com"), "secret1").await);
        }
    }

    async fn next_kinds(rx: &mut EmittedEventReceiver, n: usize) -> Vec<EventKind> {
        let mut kinds = Vec::with_capacity(n);
        for _ in 0..n {
            kinds.push(rx.recv().await.unwrap().kind());
        }
        kinds
    }

    use EventKind::{
        SignUpError as Error, SignUpHardLimit as HardLimit, SignUpStart as Start,
        SignUpSuccess as Success, SignUpTimeoutLimit as TimeoutLimit,
    };

    #[test]
    fn test_phase_by_failure_count() {
        let mut counter = FailureCounter::default();
        let mut phases = vec![counter.phase()];
        for _ in 0..6 {
            counter.increment();
            phases.push(counter.phase());
        }
        assert_eq!(
            phases,
            vec![
                SignUpPhase::Normal,
                SignUpPhase::Normal,
                SignUpPhase::Normal,
                SignUpPhase::Throttled,
                SignUpPhase::Normal,
                SignUpPhase::Terminated,
                SignUpPhase::Terminated,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_two_failures_only_start_and_error() {
        let service = Arc::new(ScriptedSignUp::new([Err(failure()), Err(failure())]));
        let (handle, mut rx, _task) = start(service);

        submit_n(&handle, 2).await;
        assert_eq!(next_kinds(&mut rx, 4).await, vec![Start, Error, Start, Error]);

        // Nothing else until another request arrives.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_failure_throttles_before_next_request() {
        let service = Arc::new(ScriptedSignUp::new([
            Err(failure()),
            Err(failure()),
            Err(failure()),
            ok("u1"),
        ]));
        let (handle, mut rx, _task) = start(service.clone());

        submit_n(&handle, 4).await;
        assert_eq!(
            next_kinds(&mut rx, 7).await,
            vec![Start, Error, Start, Error, Start, Error, TimeoutLimit]
        );
        let throttled_at = Instant::now();

        assert_eq!(rx.recv().await.unwrap().kind(), Start);
        assert!(throttled_at.elapsed() >= THROTTLE_DELAY);
        assert_eq!(rx.recv().await.unwrap().kind(), Success);
        assert_eq!(service.calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fourth_failure_neither_throttles_nor_terminates() {
        let service = Arc::new(ScriptedSignUp::new([
            Err(failure()),
            Err(failure()),
            Err(failure()),
            Err(failure()),
            ok("u1"),
        ]));
        let (handle, mut rx, _task) = start(service);

        submit_n(&handle, 5).await;
        let kinds = next_kinds(&mut rx, 11).await;
        assert_eq!(
            kinds,
            vec![
                Start, Error, Start, Error, Start, Error, TimeoutLimit, Start, Error, Start,
                Success,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fifth_failure_hits_hard_limit_once() {
        let service = Arc::new(ScriptedSignUp::default());
        let (handle, mut rx, task) = start(service.clone());

        submit_n(&handle, 6).await;
        task.await.unwrap();

        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            kinds.push(event.kind());
        }
        assert_eq!(
            kinds,
            vec![
                Start, Error, Start, Error, Start, Error, TimeoutLimit, Start, Error, Start, Error,
                HardLimit,
            ]
        );
        // The sixth request was queued but never reached the provider.
        assert_eq!(service.calls().len(), 5);
        assert!(!handle.submit("late@example.com", "secret1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_refused_once_fifth_error_is_visible() {
        let service = Arc::new(ScriptedSignUp::default());
        let (request_tx, request_rx) = sign_up_request_channel();
        // Capacity 1 keeps the processor at most one event ahead of us.
        let (event_tx, mut rx) = tokio::sync::mpsc::channel(1);
        let processor = SignUpProcessor::new(service, request_rx, EventSink::new(event_tx));
        let _task = tokio::spawn(processor.run());
        let handle = SignUpHandle::new(request_tx);

        submit_n(&handle, 5).await;
        let mut errors = 0;
        while errors < 5 {
            if rx.recv().await.unwrap().kind() == Error {
                errors += 1;
            }
        }

        assert!(handle.is_closed());
        assert!(!handle.submit("late@example.com", "secret1").await);
        assert_eq!(rx.recv().await.unwrap().kind(), HardLimit);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_does_not_reset_failures() {
        let service = Arc::new(ScriptedSignUp::new([
            Err(failure()),
            Err(failure()),
            ok("u1"),
            Err(failure()),
            ok("u2"),
        ]));
        let (handle, mut rx, _task) = start(service);

        submit_n(&handle, 5).await;
        assert_eq!(
            next_kinds(&mut rx, 9).await,
            vec![Start, Error, Start, Error, Start, Success, Start, Error, TimeoutLimit]
        );
        assert_eq!(next_kinds(&mut rx, 2).await, vec![Start, Success]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_repeats_while_count_stays_at_three() {
        let service = Arc::new(ScriptedSignUp::new([
            Err(failure()),
            Err(failure()),
            Err(failure()),
            ok("u1"),
            ok("u2"),
        ]));
        let (handle, mut rx, _task) = start(service);

        submit_n(&handle, 5).await;
        let _ = next_kinds(&mut rx, 7).await;
        assert_eq!(
            next_kinds(&mut rx, 5).await,
            vec![Start, Success, TimeoutLimit, Start, Success]
        );
    }

    #[tokio::test]
    async fn test_stops_when_request_channel_closes() {
        let service = Arc::new(ScriptedSignUp::new([ok("u1")]));
        let (handle, mut rx, task) = start(service);

        submit_n(&handle, 1).await;
        drop(handle);
        task.await.unwrap();

        assert_eq!(next_kinds(&mut rx, 2).await, vec![Start, Success]);
        assert!(rx.recv().await.is_none());
    }
}
