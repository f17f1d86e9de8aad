//! Writing and reading small BAM files for tests.

use std::fs::File;
use std::path::Path;
use std::process::{Command, Output};

use mateflow_lib::sam::builder::{RecordBuilder, SegmentEnd};
use noodles::bam;
use noodles::core::Position;
use noodles::sam::Header;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use noodles::sam::alignment::record_buf::RecordBuf;

/// A header with two 10 kb references, one read group, and the given sort order.
pub fn header_with_sort_order(sort_order: &str) -> Header {
    format!(
        "@HD\tVN:1.6\tSO:{sort_order}\n\
         @SQ\tSN:chr1\tLN:10000\n\
         @SQ\tSN:chr2\tLN:10000\n\
         @RG\tID:rg1\tSM:sample\tLB:lib1\n\
         @PG\tID:aligner\tPN:aligner\n"
    )
    .parse()
    .expect("valid SAM header")
}

/// Writes `records` to a BAM file at `path`.
pub fn write_bam(path: &Path, header: &Header, records: &[RecordBuf]) {
    let mut writer = bam::io::Writer::new(File::create(path).expect("Failed to create BAM file"));
    writer.write_header(header).expect("Failed to write header");
    for record in records {
        writer.write_alignment_record(header, record).expect("Failed to write record");
    }
    writer.finish(header).expect("Failed to finish BAM");
}

/// Reads the header and all records of a BAM file.
pub fn read_bam(path: &Path) -> (Header, Vec<RecordBuf>) {
    let mut reader = bam::io::reader::Builder.build_from_path(path).expect("Failed to open BAM");
    let header = reader.read_header().expect("Failed to read header");
    let records =
        reader.record_bufs(&header).map(|r| r.expect("Failed to read record")).collect();
    (header, records)
}

/// A mapped, unpaired 10M alignment.
pub fn fragment(name: &str, reference: usize, pos: usize) -> RecordBuf {
    RecordBuilder::new().name(name).start(reference, pos).cigar("10M").tag("RG", "rg1").build()
}

/// One end of a mapped pair with its mate's coordinates filled in.
pub fn mate(
    name: &str,
    end: SegmentEnd,
    at: (usize, usize),
    mate_at: (usize, usize),
) -> RecordBuf {
    let mut record = RecordBuilder::new()
        .name(name)
        .segment(end)
        .start(at.0, at.1)
        .cigar("10M")
        .tag("RG", "rg1")
        .build();
    *record.mate_reference_sequence_id_mut() = Some(mate_at.0);
    *record.mate_alignment_start_mut() = Position::new(mate_at.1);
    record
}

/// Runs the mateflow binary with `args`.
pub fn run_mateflow(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mateflow"))
        .args(args)
        .output()
        .expect("Failed to run mateflow")
}

/// The path as a `&str` for command-line arguments.
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("UTF-8 path")
}
