//! In-process auth provider.
//!
//! Mirrors the behavior of a hosted email/password auth service closely
//! enough to drive the processors end to end: accounts, a current
//! identity, and listeners that hear about every change.

use super::{AuthCallback, AuthStateSource, SignUpService};
use crate::events::{AuthError, Identity};
use async_trait::async_trait;
use compact_str::CompactString;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// Minimum password length accepted when none is configured.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

struct Account {
    identity: Identity,
    password: String,
}

#[derive(Default)]
struct ProviderState {
    accounts: HashMap<CompactString, Account>,
    current: Option<Identity>,
    listeners: Vec<AuthCallback>,
}

impl ProviderState {
    /// Listeners run under the provider lock so that two concurrent changes
    /// can never reach a listener out of order.
    fn set_current(&mut self, identity: Option<Identity>) {
        self.current = identity;
        for listener in &self.listeners {
            listener(self.current.clone());
        }
    }
}

pub struct MemoryAuthProvider {
    min_password_length: usize,
    state: Mutex<ProviderState>,
}

impl MemoryAuthProvider {
    pub fn new(min_password_length: usize) -> Self {
        Self {
            min_password_length,
            state: Mutex::new(ProviderState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn current(&self) -> Option<Identity> {
        self.lock().current.clone()
    }

    #[cfg(test)]
    fn account_count(&self) -> usize {
        self.lock().accounts.len()
    }

    /// Sign in to an existing account and make it current.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let mut state = self.lock();
        let Some(account) = state.accounts.get(email) else {
            return Err(AuthError::new(
                "auth/user-not-found",
                "There is no user record corresponding to this identifier.",
            ));
        };
        if account.password != password {
            return Err(AuthError::new(
                "auth/wrong-password",
                "The password is invalid.",
            ));
        }
        let identity = account.identity.clone();
        info!(uid = %identity.uid, "User signed in");
        state.set_current(Some(identity.clone()));
        Ok(identity)
    }

    /// Sign out. Listeners are notified even if nobody was signed in.
    pub fn sign_out(&self) {
        let mut state = self.lock();
        if let Some(identity) = &state.current {
            info!(uid = %identity.uid, "User signed out");
        }
        state.set_current(None);
    }

    fn validate(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'));
        if !valid_email {
            return Err(AuthError::new(
                "auth/invalid-email",
                "The email address is badly formatted.",
            ));
        }
        if password.chars().count() < self.min_password_length {
            return Err(AuthError::new(
                "auth/weak-password",
                format!(
                    "Password should be at least {} characters.",
                    self.min_password_length
                ),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

#[async_trait]
impl SignUpService for MemoryAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.validate(email, password)?;

        let mut state = self.lock();
        if state.accounts.contains_key(email) {
            return Err(AuthError::new(
                "auth/email-already-in-use",
                "The email address is already in use by another account.",
            ));
        }

        let identity = Identity::new(Uuid::new_v4().simple().to_string()).with_email(email);
        state.accounts.insert(
            CompactString::from(email),
            Account {
                identity: identity.clone(),
                password: password.to_string(),
            },
        );
        info!(uid = %identity.uid, "Account created");

        // A fresh account is signed in right away.
        state.set_current(Some(identity.clone()));
        Ok(identity)
    }
}

impl AuthStateSource for MemoryAuthProvider {
    fn on_auth_change(&self, callback: AuthCallback) {
        let mut state = self.lock();
        callback(state.current.clone());
        state.listeners.push(callback);
        debug!(listeners = state.listeners.len(), "Auth listener registered");
    }
}
