//! Boundary to the external authentication provider.
//!
//! The provider is two things to the processors: a request/response
//! sign-up call and a push subscription for auth state changes.

mod memory;

pub use memory::{DEFAULT_MIN_PASSWORD_LENGTH, MemoryAuthProvider};

use crate::events::{AuthError, Identity};
use async_trait::async_trait;

/// Callback invoked by the provider on every auth state change.
pub type AuthCallback = Box<dyn Fn(Option<Identity>) + Send + Sync + 'static>;

/// The provider's account-creation call.
#[async_trait]
pub trait SignUpService: Send + Sync {
    /// Create an account and return the resulting identity.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
}

/// The provider's auth state subscription.
pub trait AuthStateSource: Send + Sync {
    /// Register `callback`. It fires on every provider-side change, repeats
    /// included, for as long as the provider lives.
    fn on_auth_change(&self, callback: AuthCallback);
}

/// A provider that offers both seams.
pub trait AuthProvider: SignUpService + AuthStateSource {}

impl<T: SignUpService + AuthStateSource> AuthProvider for T {}
