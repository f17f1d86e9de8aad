//! Error types for the spillover map.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for spillover map operations.
pub type Result<T> = std::result::Result<T, SpillError>;

/// The file operation that failed on a partition's backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpillOperation {
    /// Opening (or creating) a partition file for appending or reading.
    Open,
    /// Encoding an entry into a partition file.
    Encode,
    /// Flushing buffered entries to a partition file.
    Flush,
    /// Decoding an entry from a partition file.
    Decode,
    /// Deleting a partition file after it was loaded.
    Delete,
}

impl fmt::Display for SpillOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Encode => "encode",
            Self::Flush => "flush",
            Self::Decode => "decode",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Error type for spillover map operations.
#[derive(Error, Debug)]
pub enum SpillError {
    /// An I/O failure on a partition's backing file. Never retried.
    #[error("Failed to {operation} spill partition {partition} at '{}'", path.display())]
    CodecIo {
        /// What was being done to the file
        operation: SpillOperation,
        /// The partition index the file belongs to
        partition: usize,
        /// Path of the backing file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The scratch directory could not be created.
    #[error("Failed to create spill scratch directory under '{}'", parent.display())]
    ScratchDir {
        /// The directory the scratch directory was to be created in
        parent: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Invalid configuration value.
    #[error("Invalid spill configuration '{parameter}': {reason}")]
    InvalidConfig {
        /// The configuration field
        parameter: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

impl SpillError {
    /// The partition index involved in the failure, if any.
    #[must_use]
    pub fn partition(&self) -> Option<usize> {
        match self {
            Self::CodecIo { partition, .. } => Some(*partition),
            _ => None,
        }
    }

    /// The failed file operation, if this is a partition I/O failure.
    #[must_use]
    pub fn operation(&self) -> Option<SpillOperation> {
        match self {
            Self::CodecIo { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
