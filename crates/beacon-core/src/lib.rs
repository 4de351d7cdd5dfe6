//! # beacon-core
//!
//! Foundation crate for the beacon telemetry pipeline.
//! Defines events, tracking commands, bundles, config, errors, and the
//! storage trait. Every other crate in the workspace depends on this.

pub mod bundle;
pub mod command;
pub mod config;
pub mod constants;
pub mod errors;
pub mod event;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use bundle::CommandBundle;
pub use command::{SceneRef, TrackingCommand};
pub use config::BeaconConfig;
pub use errors::{BeaconError, BeaconResult};
pub use event::{Event, EventName};
pub use traits::{AppState, AppStateProvider, CommandStore};
