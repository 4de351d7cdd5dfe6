//! Bundling rule families.
//!
//! Before-add rules can force a flush of the in-progress bundle before a
//! new command is accepted; after-add rules can force one immediately after
//! accepting; async rules run on their own timer and can close the current
//! bundle without any add. Rules are evaluated in registration order and
//! must be pure.

mod count;
mod scene;
mod time_window;
mod user;

pub use count::CommandCountBundleRule;
pub use scene::SceneBundleRule;
pub use time_window::TimeWindowBundleRule;
pub use user::UserBundleRule;

use std::time::Duration;

use beacon_core::{CommandBundle, TrackingCommand};

/// A policy consulted at a fixed point of `add_command`. `true` means the
/// current bundle must close.
pub trait BundleRule: Send + Sync {
    fn evaluate(&self, bundle: &CommandBundle, command: &TrackingCommand) -> bool;
}

/// Time-driven rule family, consulted on an independent schedule rather
/// than at add time.
pub trait AsyncBundleRule: Send + Sync {
    /// Interval between evaluations of the current bundle.
    fn interval(&self) -> Duration;

    /// Whether an elapsed window may close the bundle now. While `false`,
    /// commands keep accumulating across ticks into one larger bundle.
    fn is_immediately_bundlable(&self) -> bool;
}
