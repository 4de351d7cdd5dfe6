use beacon_core::{CommandBundle, TrackingCommand};

use super::BundleRule;

/// Closes the bundle when the page view or scene changes, so a request's
/// routing keys describe every event in it.
#[derive(Debug, Default)]
pub struct SceneBundleRule;

impl BundleRule for SceneBundleRule {
    fn evaluate(&self, bundle: &CommandBundle, command: &TrackingCommand) -> bool {
        bundle.first().is_some_and(|first| {
            first.scene.pv_id != command.scene.pv_id
                || first.scene.scene_id != command.scene.scene_id
        })
    }
}
