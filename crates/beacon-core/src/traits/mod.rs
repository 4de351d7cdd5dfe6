//! Traits at the seams of the pipeline: durable command storage and the
//! injected application-state source.

mod app_state;
mod store;

pub use app_state::{AppState, AppStateProvider};
pub use store::CommandStore;
