//! Writing metrics rows as tab-separated files.

use std::path::Path;

use anyhow::{Context, Result};
use fgoxide::io::DelimFile;
use serde::Serialize;

use super::Metric;

/// Writes `rows` with a header line to a TSV file.
///
/// # Errors
///
/// Returns an error naming `description` and the path if the file cannot be written.
pub fn write_metrics<P: AsRef<Path>, T: Serialize>(
    path: P,
    rows: &[T],
    description: &str,
) -> Result<()> {
    let path = path.as_ref();
    DelimFile::default()
        .write_tsv(&path, rows)
        .with_context(|| format!("Failed to write {description} metrics: {}", path.display()))
}

/// Like [`write_metrics`], naming the rows by their [`Metric::metric_name`].
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_metrics_auto<P: AsRef<Path>, T: Metric>(path: P, rows: &[T]) -> Result<()> {
    write_metrics(path, rows, T::metric_name())
}
