use crate::command::TrackingCommand;

/// Durable storage for retryable tracking commands. Rows survive process
/// termination between a command being accepted and its bundle being
/// acknowledged by the collector.
///
/// Implementations are best-effort: storage failures are logged and surface
/// as "not persisted", never as errors to the producer.
pub trait CommandStore: Send + Sync {
    /// Identifier of the process instance that owns this store handle.
    fn process_id(&self) -> &str;

    /// Persist a command. No-op for non-retryable commands; idempotent for
    /// a command id that is already registered.
    fn register(&self, command: &TrackingCommand);

    /// Remove the persisted row for a command. No-op if absent.
    fn unregister(&self, command: &TrackingCommand);

    /// Existence check by command identity.
    fn is_registered(&self, command: &TrackingCommand) -> bool;

    /// Commands persisted by this process instance, in insertion order.
    fn commands(&self) -> Vec<TrackingCommand>;

    /// Commands left behind by other process instances: crash and kill
    /// survivors eligible for replay on this launch. Never includes this
    /// instance's own unflushed commands.
    fn retryable_commands(&self) -> Vec<TrackingCommand>;

    /// Number of rows within the retention window, any owner.
    fn unprocessed_count(&self) -> u64;

    /// Remove every record. Used at teardown.
    fn unregister_all(&self);
}
