//! Event processors for the sign-up and auth sync pipeline.
//!
//! - `SignUpProcessor`: Receives `SignUpRequest`, emits `SIGN_UP_*` events
//! - `AuthEventChannel`: Buffers provider callbacks as `AuthSnapshot`s
//! - `AuthSync`: Takes `AuthSnapshot`, emits `SIGN_IN_SUCCESS` / `SIGN_OUT_SUCCESS`

pub mod auth_channel;
pub mod auth_sync;
pub mod sign_up;

pub use auth_channel::AuthEventChannel;
pub use auth_sync::AuthSync;
pub use sign_up::{
    FailureCounter, HARD_LIMIT, SignUpPhase, SignUpProcessor, THROTTLE_AT, THROTTLE_DELAY,
};
