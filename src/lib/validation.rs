//! Checks on command-line inputs, run before any work starts.

use std::fmt::Display;
use std::path::Path;

use crate::errors::{MateflowError, Result};

/// Fails when `path` does not exist.
///
/// ```
/// use mateflow_lib::validation::validate_file_exists;
///
/// assert!(validate_file_exists("/nonexistent/input.bam", "Input BAM").is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        Ok(())
    } else {
        Err(MateflowError::MissingPath {
            description: description.to_string(),
            path: path.display().to_string(),
        })
    }
}

/// Fails when `path` is not an existing directory.
pub fn validate_directory_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        Ok(())
    } else {
        Err(MateflowError::MissingPath {
            description: description.to_string(),
            path: path.display().to_string(),
        })
    }
}

/// Fails when `value` is not greater than zero.
pub fn validate_positive<T: PartialOrd + Default + Display>(value: T, name: &str) -> Result<()> {
    if value > T::default() {
        Ok(())
    } else {
        Err(MateflowError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("must be greater than 0, got {value}"),
        })
    }
}

/// Fails when an output would overwrite the input.
pub fn validate_distinct_paths(input: &Path, output: &Path) -> Result<()> {
    if input == output {
        return Err(MateflowError::InvalidParameter {
            parameter: "output".to_string(),
            reason: format!("must differ from the input {}", input.display()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_exists() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(validate_file_exists(file.path(), "Input").is_ok());
        let err = validate_file_exists("/definitely/not/here.bam", "Input BAM").unwrap_err();
        assert!(err.to_string().contains("Input BAM does not exist"));
    }

    #[test]
    fn test_directory_exists() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_directory_exists(dir.path(), "Temp dir").is_ok());
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(validate_directory_exists(file.path(), "Temp dir").is_err());
    }

    #[test]
    fn test_positive() {
        assert!(validate_positive(3_usize, "max-open-files").is_ok());
        let err = validate_positive(0_usize, "max-open-files").unwrap_err();
        assert!(matches!(err, MateflowError::InvalidParameter { ref parameter, .. } if parameter == "max-open-files"));
    }

    #[test]
    fn test_distinct_paths() {
        assert!(validate_distinct_paths(Path::new("a.bam"), Path::new("b.bam")).is_ok());
        assert!(validate_distinct_paths(Path::new("a.bam"), Path::new("a.bam")).is_err());
    }
}
