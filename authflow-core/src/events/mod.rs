//! Event system for the sign-up and auth sync pipeline.
//!
//! # Event Flow
//!
//! 1. Caller -> `SignUpHandle::submit` -> `SignUpProcessor`
//! 2. Provider callback -> `AuthEventChannel` -> `AuthSync`
//! 3. Both processors emit `EmittedEvent` into one shared `EventSink`
//! 4. The store consumes the sink's receiver
//!
//! Ordering holds within one processor only; the two streams interleave
//! arbitrarily in the sink.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, EmittedEventReceiver, EmittedEventSender, EventSink, SignUpHandle,
    SignUpRequestReceiver, SignUpRequestSender, SinkClosed, emitted_event_channel,
    sign_up_request_channel,
};

pub use types::{AuthError, AuthSnapshot, EmittedEvent, EventKind, Identity, SignUpRequest};
