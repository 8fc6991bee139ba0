//! Application state shared across all request handlers.

use authflow_core::events::SignUpHandle;
use authflow_core::provider::MemoryAuthProvider;
use authflow_core::store::AuthStore;
use std::sync::Arc;

/// Cheap to clone; everything is behind a channel or an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Submits requests to the sign-up processor.
    pub sign_up: SignUpHandle,
    /// Current auth state folded from emitted events.
    pub store: AuthStore,
    pub provider: Arc<MemoryAuthProvider>,
}

impl AppState {
    pub fn new(sign_up: SignUpHandle, store: AuthStore, provider: Arc<MemoryAuthProvider>) -> Self {
        Self {
            sign_up,
            store,
            provider,
        }
    }
}
