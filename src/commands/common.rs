//! Option groups shared across commands via `#[command(flatten)]`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use mateflow_lib::mateflow_spill::{DEFAULT_MAX_OPEN_FILES, SpillConfig};
use mateflow_lib::validation::{
    validate_directory_exists, validate_distinct_paths, validate_file_exists, validate_positive,
};
use noodles::sam::Header;

/// Input and output BAM paths plus BGZF threads.
#[derive(Debug, Clone, Args)]
pub struct BamIoOptions {
    /// Input BAM file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output BAM file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Threads for BGZF compression and decompression
    #[arg(short = 't', long = "threads", default_value = "1")]
    pub threads: usize,
}

impl BamIoOptions {
    /// Checks that the input exists, differs from the output, and threads is positive.
    pub fn validate(&self) -> Result<()> {
        validate_file_exists(&self.input, "Input BAM")?;
        validate_distinct_paths(&self.input, &self.output)?;
        validate_positive(self.threads, "threads")?;
        Ok(())
    }
}

/// Where and how pending mates spill to disk.
#[derive(Debug, Clone, Args)]
pub struct SpillOptions {
    /// Maximum number of spill files held open at once
    #[arg(long = "max-open-files", default_value_t = DEFAULT_MAX_OPEN_FILES)]
    pub max_open_files: usize,

    /// Directory for spill files (defaults to the system temporary directory)
    #[arg(long = "tmp-dir")]
    pub tmp_dir: Option<PathBuf>,

    /// Keep all pending mates in memory instead of spilling
    #[arg(long = "in-memory", default_value = "false")]
    pub in_memory: bool,
}

impl SpillOptions {
    pub fn validate(&self) -> Result<()> {
        validate_positive(self.max_open_files, "max-open-files")?;
        if let Some(dir) = &self.tmp_dir {
            validate_directory_exists(dir, "Temporary directory")?;
        }
        Ok(())
    }

    /// The spill configuration these options describe.
    pub fn to_config(&self) -> SpillConfig {
        let config = SpillConfig::new().max_open_files(self.max_open_files);
        match &self.tmp_dir {
            Some(dir) => config.temp_dir(dir.clone()),
            None => config,
        }
    }
}

/// Adds this program's `@PG` record to `header`.
pub fn add_pg_record(header: Header, command_line: &str) -> Result<Header> {
    mateflow_lib::header::add_pg_record(header, crate::version::VERSION, command_line)
}
