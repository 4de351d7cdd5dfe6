//! TrackingAgent — construction and wiring of the full pipeline: state
//! proxy → bundler → repository → dispatcher, plus the replay path for
//! failed and inherited commands.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use beacon_bundler::{
    CommandBundler, CommandCountBundleRule, SceneBundleRule, StateBundlerProxy,
    ThroughBundlerProxy, TimeWindowBundleRule, UserBundleRule,
};
use beacon_client::{
    HttpTransport, ReachabilityWatcher, TrackClient, TrackClientObserver, TrackClientState,
    TrackTransport,
};
use beacon_core::errors::BeaconResult;
use beacon_core::{
    AppState, AppStateProvider, BeaconConfig, CommandStore, Event, SceneRef, TrackingCommand,
};
use beacon_storage::SqliteCommandStore;

use crate::backoff::ExponentialBackoff;
use crate::circuit_breaker::CircuitBreaker;
use crate::executor::{CommandExecutor, ExecutorDelegate};
use crate::lock;
use crate::task::TaskRegistry;

const RETRY_INTERVAL: Duration = Duration::from_millis(500);
const RETRY_MULTIPLIER: u32 = 4;
const RETRY_MAX_COUNT: u32 = 6;
const REACHABILITY_PROBE_INTERVAL: Duration = Duration::from_secs(15);

/// Ties the time-window rules to the dispatcher state: flushing is
/// immediate only while the client is idle, so bundles grow while a send
/// is outstanding.
struct BundlableFlagObserver {
    rules: Vec<Arc<TimeWindowBundleRule>>,
}

impl TrackClientObserver for BundlableFlagObserver {
    fn did_change_state(&self, state: TrackClientState) {
        let bundlable = state == TrackClientState::Waiting;
        for rule in &self.rules {
            rule.set_immediately_bundlable(bundlable);
        }
    }
}

struct AgentShared {
    store: Arc<dyn CommandStore>,
    client: Arc<TrackClient>,
    bundler: Arc<CommandBundler>,
    retry_bundler: Arc<CommandBundler>,
    default_executor: Arc<CommandExecutor>,
    retry_executor: Arc<CommandExecutor>,
    state_proxy: Arc<StateBundlerProxy>,
    breaker: CircuitBreaker,
    tasks: TaskRegistry,
    backoffs: Mutex<HashMap<String, ExponentialBackoff>>,
    runtime: tokio::runtime::Handle,
}

impl ExecutorDelegate for AgentShared {
    fn did_complete_command(&self, command: &TrackingCommand) {
        self.tasks.complete(&command.id, true);
        lock(&self.backoffs).remove(&command.id);
        self.breaker.reset();
    }

    fn did_fail_command(&self, command: TrackingCommand) {
        self.breaker.count_failure();
        self.tasks.complete(&command.id, false);

        if !command.is_retryable || !self.breaker.can_request() {
            return;
        }
        let delay = {
            let mut backoffs = lock(&self.backoffs);
            backoffs
                .entry(command.id.clone())
                .or_insert_with(|| {
                    ExponentialBackoff::new(RETRY_INTERVAL, RETRY_MULTIPLIER, RETRY_MAX_COUNT)
                })
                .next_delay()
        };
        match delay {
            Ok(delay) => {
                let retry = Arc::clone(&self.retry_executor);
                self.runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    retry.add_retry_command(command);
                });
            }
            Err(_) => {
                lock(&self.backoffs).remove(&command.id);
                tracing::warn!(command_id = %command.id, "agent: retry budget exhausted");
            }
        }
    }
}

/// The assembled pipeline. One long-lived instance per SDK setup; producers
/// hold a reference and call `submit`.
pub struct TrackingAgent {
    shared: Arc<AgentShared>,
    /// Keeps the production reachability poller alive; stops when the
    /// agent is dropped.
    reachability: Option<ReachabilityWatcher>,
}

impl TrackingAgent {
    /// Build the production pipeline from configuration alone: a SQLite
    /// store at the configured path (in-memory when none is set), a
    /// reqwest transport, and a reachability poller probing the collector.
    pub fn bootstrap(
        config: &BeaconConfig,
        app_state: &dyn AppStateProvider,
    ) -> BeaconResult<Self> {
        let store = match &config.database_path {
            Some(path) => SqliteCommandStore::open(path)?,
            None => SqliteCommandStore::open_in_memory()?,
        }
        .with_retention_days(config.command_retention_days);
        let transport = HttpTransport::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let mut agent = Self::new(config, Arc::new(store), Arc::new(transport), app_state);
        agent.reachability = Some(ReachabilityWatcher::spawn(
            Arc::clone(agent.client()),
            config.base_url.clone(),
            REACHABILITY_PROBE_INTERVAL,
        )?);
        Ok(agent)
    }

    /// Assemble the pipeline. Must be called inside a tokio runtime; the
    /// bundling timers and network sends live on that runtime. Commands
    /// left behind by a previous process instance are scheduled for replay
    /// immediately.
    pub fn new(
        config: &BeaconConfig,
        store: Arc<dyn CommandStore>,
        transport: Arc<dyn TrackTransport>,
        app_state: &dyn AppStateProvider,
    ) -> Self {
        let runtime = tokio::runtime::Handle::current();
        let client = TrackClient::new(transport, config.max_in_flight);

        let flush_rule = TimeWindowBundleRule::new(Duration::from_millis(config.flush_interval_ms));
        let bundler = CommandBundler::new(
            vec![Box::new(UserBundleRule), Box::new(SceneBundleRule)],
            vec![Box::new(CommandCountBundleRule::new(
                config.command_count_threshold,
            ))],
            vec![flush_rule.clone()],
        );
        let state_proxy = Arc::new(StateBundlerProxy::new(bundler.clone(), app_state.current()));
        let default_executor = CommandExecutor::new(
            state_proxy.clone(),
            Arc::clone(&store),
            Arc::clone(&client),
            config.app_key.clone(),
        );
        bundler.set_sink(default_executor.clone());

        let retry_rule =
            TimeWindowBundleRule::new(Duration::from_millis(config.retry_flush_interval_ms));
        let retry_bundler = CommandBundler::new(
            vec![Box::new(UserBundleRule), Box::new(SceneBundleRule)],
            vec![Box::new(CommandCountBundleRule::new(
                config.command_count_threshold,
            ))],
            vec![retry_rule.clone()],
        );
        let retry_executor = CommandExecutor::new(
            Arc::new(ThroughBundlerProxy::new(retry_bundler.clone())),
            Arc::clone(&store),
            Arc::clone(&client),
            config.app_key.clone(),
        );
        retry_bundler.set_sink(retry_executor.clone());

        client.add_observer(Arc::new(BundlableFlagObserver {
            rules: vec![flush_rule, retry_rule],
        }));

        let shared = Arc::new(AgentShared {
            store,
            client,
            bundler,
            retry_bundler,
            default_executor,
            retry_executor,
            state_proxy,
            breaker: CircuitBreaker::default(),
            tasks: TaskRegistry::default(),
            backoffs: Mutex::new(HashMap::new()),
            runtime,
        });
        let delegate: Weak<AgentShared> = Arc::downgrade(&shared);
        shared.default_executor.set_delegate(delegate.clone());
        shared.retry_executor.set_delegate(delegate);

        let agent = Self {
            shared,
            reachability: None,
        };
        agent.restore_retryable_commands();
        agent
    }

    /// Create and schedule a command for the event. Synchronous and
    /// non-blocking for the producer; persistence and bundling happen on
    /// the runtime.
    pub fn submit(
        &self,
        event: Event,
        visitor_id: impl Into<String>,
        scene: SceneRef,
    ) -> TrackingCommand {
        let command = TrackingCommand::new(event, visitor_id, scene);
        self.schedule(command.clone());
        command
    }

    /// Like `submit`, with a completion invoked on the first definitive
    /// outcome: `true` on delivery, `false` on the first failed send.
    pub fn submit_with_completion(
        &self,
        event: Event,
        visitor_id: impl Into<String>,
        scene: SceneRef,
        completion: impl FnOnce(bool) + Send + 'static,
    ) -> TrackingCommand {
        let command = TrackingCommand::new(event, visitor_id, scene);
        self.shared
            .tasks
            .insert(command.id.clone(), Box::new(completion));
        self.schedule(command.clone());
        command
    }

    /// Stop the production reachability poller, if one is running. The
    /// host drives `set_reachable` itself afterwards.
    pub fn stop_reachability(&mut self) {
        if let Some(watcher) = self.reachability.take() {
            watcher.stop();
        }
    }

    /// Push a lifecycle transition into the state proxy.
    pub fn notify_app_state(&self, state: AppState) {
        self.shared.state_proxy.on_state_change(state);
    }

    /// Push a reachability transition into the dispatcher.
    pub fn set_reachable(&self, reachable: bool) {
        self.shared.client.set_reachable(reachable);
    }

    /// The dispatcher, for introspection and notification hookup.
    pub fn client(&self) -> &Arc<TrackClient> {
        &self.shared.client
    }

    /// Register a callback for the dispatcher's "no pending commands"
    /// notification, fired exactly on the running→waiting transition.
    pub fn on_no_pending_commands(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.shared.client.on_no_pending_commands(listener);
    }

    /// Force-close any open bundles on both paths.
    pub fn flush(&self) {
        let bundler = Arc::clone(&self.shared.bundler);
        let retry_bundler = Arc::clone(&self.shared.retry_bundler);
        self.shared.runtime.spawn(async move {
            bundler.flush();
            retry_bundler.flush();
        });
    }

    /// Clear persisted state and drop pending dispatcher work.
    pub fn teardown(&self) {
        self.shared.store.unregister_all();
        self.shared.client.teardown();
    }

    fn schedule(&self, command: TrackingCommand) {
        tracing::debug!(
            command_id = %command.id,
            event_name = %command.event.event_name,
            "agent: scheduling command"
        );
        let executor = Arc::clone(&self.shared.default_executor);
        self.shared.runtime.spawn(async move {
            executor.add_command(command);
        });
    }

    fn restore_retryable_commands(&self) {
        let survivors = self.shared.store.retryable_commands();
        if survivors.is_empty() {
            return;
        }
        tracing::info!(count = survivors.len(), "agent: restoring commands from a previous instance");
        for command in survivors {
            let retry = Arc::clone(&self.shared.retry_executor);
            self.shared.runtime.spawn(async move {
                retry.add_retry_command(command);
            });
        }
    }
}
