//! Groups the records of a queryname-sorted BAM by template and resolves primary alignments.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mateflow_lib::bam_io::{create_bam_reader, create_bam_writer, finish_bam_writer, record_bufs};
use mateflow_lib::hits::{
    InputOrderStrategy, MultiHitGroupIterator, QuerynameOrder, UnalignedFilter,
};
use mateflow_lib::logging::{OperationTimer, log_grouping_summary};
use mateflow_lib::metrics::write_metrics_auto;
use mateflow_lib::progress::ProgressTracker;
use mateflow_lib::sam::{QUERY_NAME, check_sort};
use noodles::sam::alignment::io::Write as AlignmentWrite;

use crate::commands::command::Command;
use crate::commands::common::{BamIoOptions, add_pg_record};

/// Groups multi-hit alignments by template.
#[derive(Debug, Parser)]
#[command(
    name = "group-hits",
    about = "Group queryname-sorted alignments by template and pick one primary per end",
    long_about = r#"
Groups the alignments of a queryname-sorted BAM into one set of hits per template.

Unmapped records and records whose CIGAR aligns no bases are dropped. Terminal hard clips
are restored as soft clips padded with N at quality 2. When an end has several candidate
alignments, the first one in input order becomes primary, the rest are marked secondary, and
every candidate receives an HI tag with its 0-based index.

Records are written grouped by template: first-of-pair candidates, first-of-pair
supplementals, then the same for the second of pair.

The input must be sorted by query name in the chosen order; an out-of-order record stops the
run with an error.

Example usage:
  mateflow group-hits -i aligned.qsorted.bam -o grouped.bam
  mateflow group-hits -i aligned.bam -o grouped.bam --order natural --metrics grouping.tsv
"#
)]
pub struct GroupHits {
    /// Input/output BAM options
    #[command(flatten)]
    pub io: BamIoOptions,

    /// Query-name order the input is sorted in (lexicographic or natural)
    #[arg(long = "order", default_value_t = QuerynameOrder::Lexicographic)]
    pub order: QuerynameOrder,

    /// Optional TSV file for grouping counts
    #[arg(short = 'm', long = "metrics")]
    pub metrics: Option<PathBuf>,
}

impl Command for GroupHits {
    fn execute(&self, command_line: &str) -> Result<()> {
        self.io.validate()?;

        let timer = OperationTimer::new("Grouping hits");
        info!("Input: {}", self.io.input.display());
        info!("Output: {}", self.io.output.display());
        info!("Queryname order: {}", self.order);

        let (mut reader, header) = create_bam_reader(&self.io.input, self.io.threads)?;
        check_sort(&header, &self.io.input, QUERY_NAME);

        let out_header = add_pg_record(header.clone(), command_line)?;
        let mut writer = create_bam_writer(&self.io.output, &out_header, self.io.threads)?;

        let records = record_bufs(&mut reader, &header, &self.io.input);
        let mut groups = MultiHitGroupIterator::with_options(
            records,
            InputOrderStrategy,
            self.order,
            UnalignedFilter,
        );

        let mut progress = ProgressTracker::new("Wrote records");
        for group in groups.by_ref() {
            let group = group.with_context(|| {
                format!("Failed to group records from: {}", self.io.input.display())
            })?;
            let count = group.len() as u64;
            for record in group.into_records() {
                writer
                    .write_alignment_record(&out_header, &record)
                    .with_context(|| format!("Failed to write: {}", self.io.output.display()))?;
            }
            progress.add(count);
        }
        progress.finish();

        let stats = groups.stats();
        groups.close();
        finish_bam_writer(writer, &self.io.output)?;

        log_grouping_summary(&stats);
        if let Some(path) = &self.metrics {
            write_metrics_auto(path, &[stats])?;
            info!("Wrote grouping metrics to {}", path.display());
        }
        timer.log_completion(progress.count());
        Ok(())
    }
}
