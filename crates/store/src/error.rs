//! Store error model.

use thiserror::Error;

/// Result type used across the store layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// Fatal store-level failures.
///
/// Schema drift never surfaces here: the guard resolves it by destructive
/// rebuild and reports it as a flag, not an error. Malformed cell input never
/// surfaces here either; it is coerced at the domain boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not serve the call (lock, corruption,
    /// failed statement). Aborts the current load or save; no retry.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// Filesystem failure while rebuilding the store file.
    #[error("store file i/o failed: {0}")]
    Io(#[from] std::io::Error),
}
