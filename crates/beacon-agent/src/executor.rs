//! Command executors — the glue between a bundler and the dispatcher. The
//! default path persists retryable commands ahead of bundling; the replay
//! path re-submits commands that already failed once or that a previous
//! process instance left behind.

use std::sync::{Arc, Mutex, Weak};

use beacon_bundler::{BundleSink, BundlerProxy};
use beacon_client::{TrackClient, TrackRequest};
use beacon_core::{CommandBundle, CommandStore, TrackingCommand};

use crate::lock;

/// Receives per-command outcomes from an executor.
pub(crate) trait ExecutorDelegate: Send + Sync {
    fn did_complete_command(&self, command: &TrackingCommand);
    fn did_fail_command(&self, command: TrackingCommand);
}

/// Turns completed bundles into track requests and reconciles the
/// repository with their outcome: delivered commands are unregistered,
/// failed ones stay persisted for a later replay.
pub(crate) struct CommandExecutor {
    proxy: Arc<dyn BundlerProxy>,
    store: Arc<dyn CommandStore>,
    client: Arc<TrackClient>,
    app_key: String,
    delegate: Arc<Mutex<Option<Weak<dyn ExecutorDelegate>>>>,
}

impl CommandExecutor {
    pub fn new(
        proxy: Arc<dyn BundlerProxy>,
        store: Arc<dyn CommandStore>,
        client: Arc<TrackClient>,
        app_key: String,
    ) -> Arc<Self> {
        Arc::new(Self {
            proxy,
            store,
            client,
            app_key,
            delegate: Arc::new(Mutex::new(None)),
        })
    }

    pub fn set_delegate(&self, delegate: Weak<dyn ExecutorDelegate>) {
        *lock(&self.delegate) = Some(delegate);
    }

    /// Default path: write-ahead persist, then bundle.
    pub fn add_command(&self, command: TrackingCommand) {
        if self.store.is_registered(&command) {
            tracing::info!(command_id = %command.id, "executor: command already registered");
        }
        self.store.register(&command);
        self.proxy.add_command(command);
    }

    /// Replay path: mark as a retry and bundle. The row, if any, already
    /// exists; registration is skipped.
    pub fn add_retry_command(&self, mut command: TrackingCommand) {
        command.is_retry = true;
        self.proxy.add_command(command);
    }
}

impl BundleSink for CommandExecutor {
    fn did_finish_bundle(&self, bundle: CommandBundle) {
        let Some(request) = TrackRequest::from_bundle(&self.app_key, &bundle) else {
            return;
        };
        let commands = bundle.into_commands();
        let store = Arc::clone(&self.store);
        let delegate_slot = Arc::clone(&self.delegate);

        self.client.enqueue(
            request,
            Box::new(move |result| {
                let delegate = lock(&delegate_slot).clone().and_then(|weak| weak.upgrade());
                match result {
                    Ok(_) => {
                        for command in &commands {
                            store.unregister(command);
                        }
                        if let Some(delegate) = &delegate {
                            for command in &commands {
                                delegate.did_complete_command(command);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "executor: track request failed");
                        if let Some(delegate) = delegate {
                            for command in commands {
                                delegate.did_fail_command(command);
                            }
                        }
                    }
                }
            }),
        );
    }
}
