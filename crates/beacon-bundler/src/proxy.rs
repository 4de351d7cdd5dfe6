//! Bundler proxies — lifecycle gating in front of the bundler.

use std::sync::{Arc, Mutex};

use beacon_core::{AppState, TrackingCommand};

use crate::bundler::CommandBundler;
use crate::lock;

/// Forwards, queues, or replays commands on their way into the bundler.
pub trait BundlerProxy: Send + Sync {
    fn add_command(&self, command: TrackingCommand);
}

/// Forwards unconditionally. The retry path uses this: restored commands
/// already survived a lifecycle transition once.
pub struct ThroughBundlerProxy {
    bundler: Arc<CommandBundler>,
}

impl ThroughBundlerProxy {
    pub fn new(bundler: Arc<CommandBundler>) -> Self {
        Self { bundler }
    }
}

impl BundlerProxy for ThroughBundlerProxy {
    fn add_command(&self, command: TrackingCommand) {
        self.bundler.add_command(command);
    }
}

struct ProxyState {
    app_state: AppState,
    pending: Vec<TrackingCommand>,
}

/// Applies application-lifecycle backpressure without losing commands.
///
/// Active and Inactive forward immediately; Inactive is a brief transient
/// state and stays flush-eligible. Background forwards commands that are
/// ready on background and queues the rest; any transition out of
/// Background replays the queue in FIFO order. No command is ever dropped.
///
/// State reads and `add_command` are linearizable: both go through one
/// mutex, so a concurrent transition never interleaves with a partial add.
pub struct StateBundlerProxy {
    bundler: Arc<CommandBundler>,
    state: Mutex<ProxyState>,
}

impl StateBundlerProxy {
    pub fn new(bundler: Arc<CommandBundler>, initial: AppState) -> Self {
        Self {
            bundler,
            state: Mutex::new(ProxyState {
                app_state: initial,
                pending: Vec::new(),
            }),
        }
    }

    /// Record a lifecycle transition. Leaving Background replays queued
    /// commands, in order, ahead of any concurrently added command.
    pub fn on_state_change(&self, next: AppState) {
        let mut state = lock(&self.state);
        state.app_state = next;
        if next == AppState::Background {
            return;
        }
        if !state.pending.is_empty() {
            tracing::debug!(count = state.pending.len(), "proxy: replaying queued commands");
        }
        for command in state.pending.drain(..).collect::<Vec<_>>() {
            self.bundler.add_command(command);
        }
    }

    pub fn current_state(&self) -> AppState {
        lock(&self.state).app_state
    }

    /// Commands currently held back waiting for the foreground.
    pub fn queued_len(&self) -> usize {
        lock(&self.state).pending.len()
    }
}

impl BundlerProxy for StateBundlerProxy {
    fn add_command(&self, command: TrackingCommand) {
        let mut state = lock(&self.state);
        if state.app_state == AppState::Background && !command.is_ready_on_background {
            state.pending.push(command);
            return;
        }
        self.bundler.add_command(command);
    }
}
