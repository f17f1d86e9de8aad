//! Pairs the two ends of each template in a coordinate-sorted BAM.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mateflow_lib::bam_io::{create_bam_reader, record_bufs};
use mateflow_lib::logging::{OperationTimer, log_pairing_summary};
use mateflow_lib::mates::{
    DiskPendingMates, InMemoryPendingMates, MatePairer, MatePairingMetrics, MatedPairRow,
    PendingMates,
};
use mateflow_lib::metrics::write_metrics_auto;
use mateflow_lib::progress::ProgressTracker;
use mateflow_lib::sam::{COORDINATE, check_sort};
use mateflow_lib::validation::{validate_file_exists, validate_positive};
use noodles::sam::Header;
use noodles::sam::alignment::record_buf::RecordBuf;

use crate::commands::command::Command;
use crate::commands::common::SpillOptions;

/// Pairs mates over a coordinate-sorted BAM.
#[derive(Debug, Parser)]
#[command(
    name = "pair-mates",
    about = "Match mates in a coordinate-sorted BAM and report pairing metrics",
    long_about = r#"
Walks a coordinate-sorted BAM once and matches each primary, mapped, paired read with its mate.

A read whose mate has not been seen yet waits in a map partitioned by the mate's reference.
Only the partition for the reference being read stays in memory; the rest are spilled to
files in a temporary directory and loaded back when their reference is reached. Use
--in-memory to keep everything in memory instead.

Secondary, supplementary, unpaired and unmapped reads are counted and skipped, as are reads
whose mate is unmapped.

Example usage:
  mateflow pair-mates -i aligned.bam -m pairing.tsv
  mateflow pair-mates -i aligned.bam -m pairing.tsv --pairs pairs.tsv --tmp-dir /scratch
"#
)]
pub struct PairMates {
    /// Input BAM file, sorted by coordinate
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output TSV file for pairing metrics
    #[arg(short = 'm', long = "metrics")]
    pub metrics: PathBuf,

    /// Optional output TSV file with one row per mated pair
    #[arg(short = 'p', long = "pairs")]
    pub pairs: Option<PathBuf>,

    /// Threads for BGZF decompression
    #[arg(short = 't', long = "threads", default_value = "1")]
    pub threads: usize,

    /// Spill options for reads waiting on their mate
    #[command(flatten)]
    pub spill: SpillOptions,
}

impl Command for PairMates {
    fn execute(&self, _command_line: &str) -> Result<()> {
        validate_file_exists(&self.input, "Input BAM")?;
        validate_positive(self.threads, "threads")?;
        self.spill.validate()?;

        let timer = OperationTimer::new("Pairing mates");
        info!("Input: {}", self.input.display());
        info!("Metrics: {}", self.metrics.display());

        let (mut reader, header) = create_bam_reader(&self.input, self.threads)?;
        check_sort(&header, &self.input, COORDINATE);
        let records = record_bufs(&mut reader, &header, &self.input);

        let (metrics, pairs) = if self.spill.in_memory {
            info!("Keeping pending mates in memory");
            pair_all(InMemoryPendingMates::new(), &header, records, self.pairs.is_some())?
        } else {
            let pending = DiskPendingMates::new(self.spill.to_config())
                .context("Failed to set up spill storage for pending mates")?;
            pair_all(pending, &header, records, self.pairs.is_some())?
        };

        log_pairing_summary(&metrics);
        write_metrics_auto(&self.metrics, std::slice::from_ref(&metrics))?;
        if let Some(path) = &self.pairs {
            write_pairs(path, &pairs)?;
        }
        timer.log_completion(metrics.records_read);
        Ok(())
    }
}

/// Runs every record through a pairer, collecting pair rows when `keep_pairs` is set.
fn pair_all<P, I>(
    pending: P,
    header: &Header,
    records: I,
    keep_pairs: bool,
) -> Result<(MatePairingMetrics, Vec<MatedPairRow>)>
where
    P: PendingMates,
    I: Iterator<Item = Result<RecordBuf>>,
{
    let mut pairer = MatePairer::new(pending, header);
    let mut pairs = Vec::new();
    let mut progress = ProgressTracker::new("Read records");

    for record in records {
        let record = record?;
        if let Some(pair) = pairer.process(&record)? {
            if keep_pairs {
                pairs.push(MatedPairRow::from(&pair));
            }
        }
        progress.add(1);
    }
    progress.finish();

    Ok((pairer.finish(), pairs))
}

fn write_pairs(path: &Path, pairs: &[MatedPairRow]) -> Result<()> {
    write_metrics_auto(path, pairs)?;
    info!("Wrote {} mated pairs to {}", pairs.len(), path.display());
    Ok(())
}
