//! Event type definitions for the sign-up and auth sync pipeline.
//!
//! Inbound values (`SignUpRequest`, `AuthSnapshot`) are ephemeral and
//! consumed exactly once. Outbound values (`EmittedEvent`) are the only
//! thing the surrounding store ever sees from the processors.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An authenticated principal as reported by the auth provider.
///
/// Opaque to the processors beyond its presence or absence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub uid: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<CompactString>,
}

impl Identity {
    pub fn new(uid: impl Into<CompactString>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<CompactString>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Opaque error returned by the auth provider.
///
/// `code` follows the provider's `auth/<reason>` convention.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct AuthError {
    pub code: CompactString,
    pub message: String,
}

impl AuthError {
    pub fn new(code: impl Into<CompactString>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A single sign-up attempt submitted by a caller.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SignUpRequest {
    pub email: CompactString,
    pub password: String,
}

impl SignUpRequest {
    pub fn new(email: impl Into<CompactString>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Point-in-time authentication state pushed by the provider.
///
/// Repeats of the same identity are delivered as separate snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub identity: Option<Identity>,
}

impl AuthSnapshot {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn signed_out() -> Self {
        Self { identity: None }
    }
}

/// Kind of an [`EmittedEvent`], named the way the store matches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    SignUpStart,
    SignUpSuccess,
    SignUpError,
    SignUpTimeoutLimit,
    SignUpHardLimit,
    SignInSuccess,
    SignOutSuccess,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SignUpStart => "SIGN_UP_START",
            EventKind::SignUpSuccess => "SIGN_UP_SUCCESS",
            EventKind::SignUpError => "SIGN_UP_ERROR",
            EventKind::SignUpTimeoutLimit => "SIGN_UP_TIMEOUT_LIMIT",
            EventKind::SignUpHardLimit => "SIGN_UP_HARD_LIMIT",
            EventKind::SignInSuccess => "SIGN_IN_SUCCESS",
            EventKind::SignOutSuccess => "SIGN_OUT_SUCCESS",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit handed to the surrounding store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmittedEvent {
    /// A request was accepted, the provider call has not happened yet.
    SignUpStart,
    SignUpSuccess { identity: Identity },
    SignUpError { error: AuthError },
    /// The failure counter sits exactly at the throttle mark.
    SignUpTimeoutLimit,
    /// Terminal. No further sign-up requests are processed.
    SignUpHardLimit,
    SignInSuccess { identity: Identity },
    SignOutSuccess,
}

impl EmittedEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EmittedEvent::SignUpStart => EventKind::SignUpStart,
            EmittedEvent::SignUpSuccess { .. } => EventKind::SignUpSuccess,
            EmittedEvent::SignUpError { .. } => EventKind::SignUpError,
            EmittedEvent::SignUpTimeoutLimit => EventKind::SignUpTimeoutLimit,
            EmittedEvent::SignUpHardLimit => EventKind::SignUpHardLimit,
            EmittedEvent::SignInSuccess { .. } => EventKind::SignInSuccess,
            EmittedEvent::SignOutSuccess => EventKind::SignOutSuccess,
        }
    }

    /// Identity carried by the event, if any.
    pub fn payload(&self) -> Option<&Identity> {
        match self {
            EmittedEvent::SignUpSuccess { identity } | EmittedEvent::SignInSuccess { identity } => {
                Some(identity)
            }
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AuthError> {
        match self {
            EmittedEvent::SignUpError { error } => Some(error),
            _ => None,
        }
    }
}
