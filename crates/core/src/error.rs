//! Errors raised while validating a search
//!
//! Every variant is produced before a single worker starts. Search outcomes
//! (found, not found, cancelled) are not errors, see [`crate::Solution`].

use thiserror::Error;

/// Invalid solver input or configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// Hash prefix is empty, not hexadecimal or wider than 16 bits
    #[error("invalid hash prefix {0:?}: expected 1 to 4 hexadecimal digits")]
    InvalidHashPrefix(String),

    /// Previous solution hash is not 64 hexadecimal characters
    #[error("invalid last solution hash: {0}")]
    InvalidLastSolutionHash(String),

    /// Challenge name or numeric type not known to this solver
    #[error("unknown challenge type {0:?}")]
    UnknownChallengeKind(String),

    /// Challenge parameters out of the supported bounds
    #[error("invalid challenge parameters: {0}")]
    InvalidParameters(String),

    /// Worker count of zero or above [`crate::MAX_WORKERS`]
    #[error("worker count must be in 1..={}", crate::params::MAX_WORKERS)]
    InvalidWorkerCount,

    /// Empty nonce range or one that leaves the 32-bit nonce space
    #[error("invalid nonce range {start}..{end}")]
    InvalidNonceRange {
        /// First nonce
        start: u64,
        /// One past the last nonce
        end: u64,
    },

    /// Worker threads could not be spawned
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Result alias for solver operations
pub type SolverResult<T> = Result<T, SolverError>;
