//! Injected application-state plumbing. The host owns lifecycle
//! observation; this handle is how it shares the current state with the
//! pipeline.

use std::sync::{Arc, Mutex};

use beacon_core::{AppState, AppStateProvider};

use crate::lock;

/// Shared tri-state holder. The host pushes transitions with `set` (and
/// forwards them to `TrackingAgent::notify_app_state`); the agent reads the
/// initial state through `AppStateProvider` at construction.
#[derive(Clone)]
pub struct SharedAppState {
    state: Arc<Mutex<AppState>>,
}

impl SharedAppState {
    pub fn new(initial: AppState) -> Self {
        Self {
            state: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn set(&self, state: AppState) {
        *lock(&self.state) = state;
    }
}

impl Default for SharedAppState {
    fn default() -> Self {
        Self::new(AppState::Active)
    }
}

impl AppStateProvider for SharedAppState {
    fn current(&self) -> AppState {
        *lock(&self.state)
    }
}
