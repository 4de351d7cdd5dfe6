//! Error taxonomy for the pipeline. Boundary errors (storage, transport) are
//! caught where they occur and converted into local retry-eligible state;
//! nothing propagates past the dispatcher into producer code.

mod storage_error;
mod transport_error;

pub use storage_error::StorageError;
pub use transport_error::TransportError;

/// Workspace-wide error aggregate.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Workspace-wide result alias.
pub type BeaconResult<T> = Result<T, BeaconError>;
