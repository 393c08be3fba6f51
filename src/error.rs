//! Error types for the unified cache.
//!
//! Normal cache traffic never fails: a missing key is `None`, an empty
//! predicate match is an empty `Vec`. Errors are reserved for bad
//! configuration, values the size estimator cannot cost, and snapshots that
//! cannot be serialized.
//!
//! # Example
//!
//! ```
//! use unified_cache::{CacheError, UnifiedCache};
//!
//! let err = UnifiedCache::<String, String>::new(0, 1024).unwrap_err();
//! assert!(matches!(err, CacheError::InvalidConfiguration(_)));
//! assert!(err.to_string().contains("capacity"));
//! ```

use thiserror::Error;

/// Errors returned by fallible cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A capacity, memory limit or hit-reset window was zero, or a strategy
    /// name was not recognised.
    #[error("invalid cache configuration: {0}")]
    InvalidConfiguration(String),

    /// The size estimator could not produce a byte count for a value.
    ///
    /// Returned from `set` before any state is touched.
    #[error("value size cannot be estimated: {0}")]
    UnestimableValue(String),

    /// The debug snapshot could not be rendered as JSON.
    #[error("failed to render cache dump: {0}")]
    Dump(#[from] serde_json::Error),
}

impl CacheError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub(crate) fn unestimable(msg: impl Into<String>) -> Self {
        Self::UnestimableValue(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = CacheError> = core::result::Result<T, E>;
