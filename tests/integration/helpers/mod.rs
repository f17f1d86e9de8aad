//! Helper utilities for integration tests.

pub mod bam_files;

pub use bam_files::*;
