//! CommandBundle — an ordered group of commands sent in one request.

use crate::command::TrackingCommand;

/// An ordered group of commands produced by one bundling decision.
/// Append-only until frozen; frozen exactly once, at emission.
#[derive(Debug, Clone, Default)]
pub struct CommandBundle {
    commands: Vec<TrackingCommand>,
    frozen: bool,
}

impl CommandBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn first(&self) -> Option<&TrackingCommand> {
        self.commands.first()
    }

    pub fn last(&self) -> Option<&TrackingCommand> {
        self.commands.last()
    }

    pub fn commands(&self) -> &[TrackingCommand] {
        &self.commands
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Append a command. Appending to a frozen bundle is a programmer error.
    pub fn add_command(&mut self, command: TrackingCommand) {
        debug_assert!(!self.frozen, "cannot append to a frozen bundle");
        self.commands.push(command);
    }

    /// Close the bundle. Events do not always line up in occurrence order,
    /// so sort by date before freezing; the sort is stable, so same-date
    /// commands keep their insertion order.
    pub fn freeze(&mut self) {
        self.commands.sort_by(|a, b| a.date.cmp(&b.date));
        self.frozen = true;
    }

    pub fn into_commands(self) -> Vec<TrackingCommand> {
        self.commands
    }
}
