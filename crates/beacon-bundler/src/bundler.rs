//! CommandBundler — partitions a stream of commands into bundles and
//! notifies a sink exactly once per completed bundle.

use std::sync::{Arc, Mutex, Weak};

use beacon_core::{CommandBundle, TrackingCommand};

use crate::lock;
use crate::rules::{AsyncBundleRule, BundleRule};

/// Receives completed bundles. Called synchronously inside the bundler's
/// serialized region; implementations must not call back into the same
/// bundler from the callback.
pub trait BundleSink: Send + Sync {
    fn did_finish_bundle(&self, bundle: CommandBundle);
}

struct BundlerInner {
    bundle: CommandBundle,
    /// Bumped on every closure. Async-rule timers compare against it to
    /// detect that the bundle they were armed for is gone.
    generation: u64,
}

/// The core accumulator: holds one in-progress bundle, consults the rule
/// families at their defined points, and emits completed bundles in closure
/// order.
///
/// All mutation is serialized through one internal mutex; emission happens
/// inside that serialized region so bundles reach the sink in the order
/// they were closed.
pub struct CommandBundler {
    self_ref: Weak<Self>,
    before_rules: Vec<Box<dyn BundleRule>>,
    after_rules: Vec<Box<dyn BundleRule>>,
    async_rules: Vec<Arc<dyn AsyncBundleRule>>,
    inner: Mutex<BundlerInner>,
    sink: Mutex<Option<Arc<dyn BundleSink>>>,
}

impl CommandBundler {
    pub fn new(
        before_rules: Vec<Box<dyn BundleRule>>,
        after_rules: Vec<Box<dyn BundleRule>>,
        async_rules: Vec<Arc<dyn AsyncBundleRule>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            self_ref: self_ref.clone(),
            before_rules,
            after_rules,
            async_rules,
            inner: Mutex::new(BundlerInner {
                bundle: CommandBundle::new(),
                generation: 0,
            }),
            sink: Mutex::new(None),
        })
    }

    /// Attach the sink receiving completed bundles. A bundler without a
    /// sink drops completed bundles, which is an allowed degenerate
    /// configuration, not an error.
    pub fn set_sink(&self, sink: Arc<dyn BundleSink>) {
        *lock(&self.sink) = Some(sink);
    }

    /// Accept one command. Never blocks on I/O. May synchronously emit the
    /// just-closed prior bundle (a before-add rule fired), or the bundle
    /// containing the command itself (an after-add rule fired).
    pub fn add_command(&self, command: TrackingCommand) {
        let mut inner = lock(&self.inner);

        if !inner.bundle.is_empty()
            && self
                .before_rules
                .iter()
                .any(|rule| rule.evaluate(&inner.bundle, &command))
        {
            let closed = Self::close_current(&mut inner);
            self.emit(closed);
        }

        let command_id = command.id.clone();
        inner.bundle.add_command(command.clone());

        if self
            .after_rules
            .iter()
            .any(|rule| rule.evaluate(&inner.bundle, &command))
        {
            let closed = Self::close_current(&mut inner);
            self.emit(closed);
            return;
        }

        let generation = inner.generation;
        drop(inner);
        self.schedule_async_rules(generation, command_id);
    }

    /// Close and emit the current bundle regardless of rules. No-op when
    /// the bundle is empty. Used for explicit flushes at teardown.
    pub fn flush(&self) {
        let mut inner = lock(&self.inner);
        if inner.bundle.is_empty() {
            return;
        }
        let closed = Self::close_current(&mut inner);
        self.emit(closed);
    }

    /// Number of commands accumulated in the open bundle.
    pub fn pending_len(&self) -> usize {
        lock(&self.inner).bundle.len()
    }

    fn close_current(inner: &mut BundlerInner) -> CommandBundle {
        let mut closed = std::mem::take(&mut inner.bundle);
        closed.freeze();
        inner.generation += 1;
        closed
    }

    fn emit(&self, bundle: CommandBundle) {
        if bundle.is_empty() {
            return;
        }
        tracing::debug!(commands = bundle.len(), "bundler: bundle closed");
        let sink = lock(&self.sink).clone();
        match sink {
            Some(sink) => sink.did_finish_bundle(bundle),
            None => tracing::debug!("bundler: no sink attached, bundle dropped"),
        }
    }

    /// Arm one timer per async rule for the command that was just added.
    /// A timer is abandoned once its bundle closes or a newer command takes
    /// over as the bundle's tail.
    fn schedule_async_rules(&self, generation: u64, command_id: String) {
        if self.async_rules.is_empty() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("bundler: no tokio runtime, async bundle rules are inactive");
            return;
        };
        for rule in &self.async_rules {
            let rule = Arc::clone(rule);
            let bundler = self.self_ref.clone();
            let command_id = command_id.clone();
            runtime.spawn(async move {
                loop {
                    tokio::time::sleep(rule.interval()).await;
                    let Some(bundler) = bundler.upgrade() else {
                        return;
                    };
                    if !bundler.async_rule_fired(rule.as_ref(), generation, &command_id) {
                        return;
                    }
                    // Window elapsed while flushing was suppressed; keep it open.
                }
            });
        }
    }

    /// Returns true when the timer should re-arm for another interval.
    fn async_rule_fired(
        &self,
        rule: &dyn AsyncBundleRule,
        generation: u64,
        command_id: &str,
    ) -> bool {
        let mut inner = lock(&self.inner);
        if inner.generation != generation {
            return false; // bundle already closed
        }
        if inner.bundle.last().map(|c| c.id.as_str()) != Some(command_id) {
            return false; // a newer add owns the window now
        }
        if !rule.is_immediately_bundlable() {
            return true;
        }
        let closed = Self::close_current(&mut inner);
        self.emit(closed);
        false
    }
}
