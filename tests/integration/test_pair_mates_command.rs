//! Integration tests for the pair-mates command.

use std::collections::HashMap;
use std::path::Path;

use mateflow_lib::sam::builder::{RecordBuilder, SegmentEnd};
use noodles::sam::alignment::record_buf::RecordBuf;
use rstest::rstest;
use tempfile::TempDir;

use crate::helpers::{arg, fragment, header_with_sort_order, mate, run_mateflow, write_bam};

/// Reads a single-row TSV into column name -> value.
fn read_row(path: &Path) -> HashMap<String, String> {
    let tsv = std::fs::read_to_string(path).unwrap();
    let mut lines = tsv.lines();
    let columns = lines.next().unwrap().split('\t');
    let values = lines.next().unwrap().split('\t');
    columns.zip(values).map(|(c, v)| (c.to_string(), v.to_string())).collect()
}

fn coordinate_sorted_input() -> Vec<RecordBuf> {
    let mut records = vec![
        // Same-reference pair.
        mate("p1", SegmentEnd::First, (0, 100), (0, 400)),
        mate("p1", SegmentEnd::Second, (0, 400), (0, 100)),
        // Cross-reference pair: the second end waits on chr2.
        mate("p2", SegmentEnd::First, (0, 200), (1, 50)),
        mate("p2", SegmentEnd::Second, (1, 50), (0, 200)),
        // Mate never appears.
        mate("p3", SegmentEnd::First, (0, 300), (1, 9000)),
        // Skipped records.
        fragment("f1", 0, 150),
        RecordBuilder::new()
            .name("s1")
            .segment(SegmentEnd::First)
            .secondary(true)
            .start(0, 250)
            .cigar("10M")
            .build(),
        RecordBuilder::new()
            .name("m1")
            .segment(SegmentEnd::First)
            .mate_unmapped(true)
            .start(1, 10)
            .cigar("10M")
            .build(),
    ];
    records.sort_by_key(|r| (r.reference_sequence_id(), r.alignment_start()));
    records
}

#[rstest]
#[case::spilling(&["--max-open-files", "1"])]
#[case::in_memory(&["--in-memory"])]
fn test_pair_mates_metrics(#[case] extra: &[&str]) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bam");
    let metrics = dir.path().join("pairing.tsv");
    let pairs = dir.path().join("pairs.tsv");
    write_bam(&input, &header_with_sort_order("coordinate"), &coordinate_sorted_input());

    let mut args =
        vec!["pair-mates", "-i", arg(&input), "-m", arg(&metrics), "--pairs", arg(&pairs)];
    args.extend_from_slice(extra);
    args.extend_from_slice(&["--tmp-dir", arg(dir.path())]);
    let result = run_mateflow(&args);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let row = read_row(&metrics);
    assert_eq!(row["records_read"], "8");
    assert_eq!(row["pairs_mated"], "2");
    assert_eq!(row["cross_reference_pairs"], "1");
    assert_eq!(row["orphans"], "1");
    assert_eq!(row["secondary_or_supplementary"], "1");
    assert_eq!(row["unpaired"], "1");
    assert_eq!(row["mate_unmapped"], "1");

    let pair_rows = std::fs::read_to_string(&pairs).unwrap();
    let names: Vec<&str> =
        pair_rows.lines().skip(1).map(|l| l.split('\t').next().unwrap()).collect();
    assert_eq!(names, ["p1", "p2"]);

    // Only the input files and outputs remain once spill storage is dropped.
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 3);
}

#[test]
fn test_pair_mates_rejects_zero_open_files() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bam");
    let metrics = dir.path().join("pairing.tsv");
    write_bam(&input, &header_with_sort_order("coordinate"), &coordinate_sorted_input());

    let result = run_mateflow(&[
        "pair-mates",
        "-i",
        arg(&input),
        "-m",
        arg(&metrics),
        "--max-open-files",
        "0",
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("max-open-files"));
    assert!(!metrics.exists());
}
