//! Error types for structure learning and classification.

use thiserror::Error;

/// Errors raised by dataset construction, network mutation, scoring and search.
///
/// Every error is detected at the offending call and leaves the receiver
/// unchanged. This enum is marked `#[non_exhaustive]` so new variants can be
/// added without breaking downstream matches.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BayesError {
    /// A caller-supplied argument is invalid (unknown vertex or attribute,
    /// rejected edge, malformed dataset, bad smoothing constant, bad config).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A probability or score left the finite range.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Internal invariant violation (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}

impl BayesError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BayesError::InvalidArgument(msg.into())
    }

    /// Returns true for [`BayesError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, BayesError::InvalidArgument(_))
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BayesError>;
