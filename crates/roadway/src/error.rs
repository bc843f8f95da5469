//! Error types for the roadway simulation.
//!
//! None of these are fatal: callers log them and continue with the affected
//! feature absent.

use thiserror::Error;

/// Result type for roadway operations.
pub type Result<T> = std::result::Result<T, RoadwayError>;

/// Errors that can occur while populating the scene.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoadwayError {
    /// An asset failed to load.
    #[error("failed to load {path}: {reason}")]
    AssetLoad {
        /// The asset path that failed.
        path: String,
        /// Loader error message.
        reason: String,
    },
    /// A load resolved after the simulation was torn down.
    #[error("simulation is no longer mounted")]
    Unmounted,
    /// A load resolved for a slot the roster does not know about.
    #[error("unknown actor slot {0}")]
    UnknownSlot(usize),
    /// A load resolved twice for the same slot.
    #[error("actor slot {0} was already resolved")]
    AlreadyResolved(usize),
}
