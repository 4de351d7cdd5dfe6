use beacon_core::{CommandBundle, TrackingCommand};

use super::BundleRule;

/// Closes the bundle once it reaches a fixed command count.
#[derive(Debug)]
pub struct CommandCountBundleRule {
    count: usize,
}

impl CommandCountBundleRule {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl BundleRule for CommandCountBundleRule {
    fn evaluate(&self, bundle: &CommandBundle, _command: &TrackingCommand) -> bool {
        bundle.len() >= self.count
    }
}
