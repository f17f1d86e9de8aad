//! Custom error types for mateflow operations.

use thiserror::Error;

pub use mateflow_spill::SpillError;

/// Result type alias for mateflow operations
pub type Result<T> = std::result::Result<T, MateflowError>;

/// Error type for mateflow operations
#[derive(Error, Debug)]
pub enum MateflowError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// A required input file or directory is missing
    #[error("{description} does not exist: {path}")]
    MissingPath {
        /// What the path was supposed to be
        description: String,
        /// The path as given
        path: String,
    },

    /// Two consecutive records are out of query-name order
    #[error(
        "Input is not queryname sorted: record '{previous}' is followed by '{next}', which sorts before it"
    )]
    OrderingViolation {
        /// Query name of the record consumed first
        previous: String,
        /// Query name of the record that followed it
        next: String,
    },

    /// Paired and unpaired alignments share a query name
    #[error("Got a mix of paired and unpaired alignments for read '{name}'")]
    MixedPairing {
        /// The query name
        name: String,
    },

    /// A paired record is marked as neither first nor second of pair
    #[error("Read '{name}' is marked as paired but is neither first nor second of pair")]
    UnclassifiableRecord {
        /// The query name
        name: String,
    },

    /// Failure in the spillover map
    #[error(transparent)]
    Spill(#[from] SpillError),
}
