//! Configuration for [`SpilloverMap`](crate::SpilloverMap).

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpillError};

/// Default bound on simultaneously open partition writers.
pub const DEFAULT_MAX_OPEN_FILES: usize = 512;

/// Settings for a spillover map.
///
/// ```
/// use mateflow_spill::SpillConfig;
///
/// let config = SpillConfig::new().max_open_files(64).temp_dir("/scratch".into());
/// assert_eq!(config.get_max_open_files(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct SpillConfig {
    /// Maximum number of partition files held open for appending at once.
    max_open_files: usize,
    /// Parent directory for the scratch directory (system temp dir when `None`).
    temp_dir: Option<PathBuf>,
}

impl Default for SpillConfig {
    fn default() -> Self {
        Self { max_open_files: DEFAULT_MAX_OPEN_FILES, temp_dir: None }
    }
}

impl SpillConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of simultaneously open partition writers.
    #[must_use]
    pub fn max_open_files(mut self, max_open_files: usize) -> Self {
        self.max_open_files = max_open_files;
        self
    }

    /// Set the directory in which the scratch directory is created.
    #[must_use]
    pub fn temp_dir(mut self, path: PathBuf) -> Self {
        self.temp_dir = Some(path);
        self
    }

    /// The configured writer bound.
    #[must_use]
    pub fn get_max_open_files(&self) -> usize {
        self.max_open_files
    }

    /// The configured parent directory, if any.
    #[must_use]
    pub fn get_temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    /// The writer bound as a non-zero value.
    pub(crate) fn validated_max_open_files(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.max_open_files).ok_or_else(|| SpillError::InvalidConfig {
            parameter: "max_open_files",
            reason: "must be at least 1".to_string(),
        })
    }
}
