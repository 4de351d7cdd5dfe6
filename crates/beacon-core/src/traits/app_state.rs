/// Application lifecycle state as observed by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    Inactive,
    Background,
}

/// Injected source of application state. The pipeline never observes the OS
/// itself; the host reads its lifecycle however it likes and pushes
/// transitions into the agent, which consults this only for the initial
/// state.
pub trait AppStateProvider: Send + Sync {
    fn current(&self) -> AppState;
}
