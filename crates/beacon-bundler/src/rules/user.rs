use beacon_core::{CommandBundle, TrackingCommand};

use super::BundleRule;

/// Closes the bundle when the visitor changes: events of two users never
/// share a request.
#[derive(Debug, Default)]
pub struct UserBundleRule;

impl BundleRule for UserBundleRule {
    fn evaluate(&self, bundle: &CommandBundle, command: &TrackingCommand) -> bool {
        bundle
            .first()
            .is_some_and(|first| first.visitor_id != command.visitor_id)
    }
}
