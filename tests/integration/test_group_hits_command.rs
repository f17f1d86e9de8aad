//! Integration tests for the group-hits command.

use mateflow_lib::sam::builder::{RecordBuilder, SegmentEnd};
use mateflow_lib::sam::record_utils::HIT_INDEX_TAG;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::header::record::value::map::program::tag as pg_tag;
use tempfile::TempDir;

use crate::helpers::{arg, fragment, header_with_sort_order, mate, read_bam, run_mateflow, write_bam};

fn name(record: &RecordBuf) -> String {
    record.name().map(|n| n.to_string()).unwrap_or_default()
}

fn hit_index(record: &RecordBuf) -> Option<i64> {
    record.data().get(&HIT_INDEX_TAG).and_then(|v| v.as_int())
}

fn multi_hit_input() -> Vec<RecordBuf> {
    let mut alternate = mate("a", SegmentEnd::First, (1, 500), (0, 300));
    alternate.flags_mut().insert(noodles::sam::alignment::record::Flags::SECONDARY);
    vec![
        mate("a", SegmentEnd::First, (0, 100), (0, 300)),
        alternate,
        mate("a", SegmentEnd::Second, (0, 300), (0, 100)),
        RecordBuilder::new().name("b").start(0, 200).cigar("5H10M").tag("RG", "rg1").build(),
        RecordBuilder::new().name("c").sequence("ACGTACGT").unmapped(true).build(),
    ]
}

#[test]
fn test_group_hits_writes_grouped_records() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bam");
    let output = dir.path().join("output.bam");
    let metrics = dir.path().join("grouping.tsv");
    write_bam(&input, &header_with_sort_order("queryname"), &multi_hit_input());

    let result = run_mateflow(&[
        "group-hits",
        "-i",
        arg(&input),
        "-o",
        arg(&output),
        "--metrics",
        arg(&metrics),
    ]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let (header, records) = read_bam(&output);
    let names: Vec<String> = records.iter().map(name).collect();
    assert_eq!(names, ["a", "a", "a", "b"]);

    // First end: two candidates in input order, the first primary.
    assert_eq!(hit_index(&records[0]), Some(0));
    assert!(!records[0].flags().is_secondary());
    assert_eq!(hit_index(&records[1]), Some(1));
    assert!(records[1].flags().is_secondary());
    // Second end: its only candidate is hit 0 and primary.
    assert!(records[2].flags().is_last_segment());
    assert_eq!(hit_index(&records[2]), Some(0));
    assert!(!records[2].flags().is_secondary());

    // The fragment's hard clip is restored.
    assert_eq!(records[3].sequence().len(), 15);
    assert_eq!(&records[3].sequence().as_ref()[..5], b"NNNNN");
    assert_eq!(hit_index(&records[3]), None);

    let pg = header.programs().as_ref().get(b"mateflow".as_slice()).cloned().unwrap();
    assert_eq!(
        pg.other_fields().get(&pg_tag::PREVIOUS_PROGRAM_ID).map(|v| v.to_string()),
        Some("aligner".to_string())
    );

    let tsv = std::fs::read_to_string(&metrics).unwrap();
    let mut lines = tsv.lines();
    let columns: Vec<&str> = lines.next().unwrap().split('\t').collect();
    let values: Vec<&str> = lines.next().unwrap().split('\t').collect();
    let get = |key: &str| values[columns.iter().position(|c| *c == key).unwrap()];
    assert_eq!(get("records_read"), "5");
    assert_eq!(get("records_filtered"), "1");
    assert_eq!(get("groups_emitted"), "2");
    assert_eq!(get("groups_ambiguous"), "1");
}

#[test]
fn test_group_hits_rejects_unsorted_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bam");
    let output = dir.path().join("output.bam");
    let records = vec![fragment("b", 0, 100), fragment("a", 0, 200)];
    write_bam(&input, &header_with_sort_order("queryname"), &records);

    let result = run_mateflow(&["group-hits", "-i", arg(&input), "-o", arg(&output)]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("not queryname sorted"), "stderr: {stderr}");
}

#[test]
fn test_group_hits_natural_order() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bam");
    let output = dir.path().join("output.bam");
    let records = vec![fragment("read2", 0, 100), fragment("read10", 0, 200)];
    write_bam(&input, &header_with_sort_order("queryname"), &records);

    let lexicographic = run_mateflow(&["group-hits", "-i", arg(&input), "-o", arg(&output)]);
    assert!(!lexicographic.status.success());

    let natural = run_mateflow(&[
        "group-hits",
        "-i",
        arg(&input),
        "-o",
        arg(&output),
        "--order",
        "natural",
    ]);
    assert!(natural.status.success(), "stderr: {}", String::from_utf8_lossy(&natural.stderr));
    let (_, written) = read_bam(&output);
    assert_eq!(written.iter().map(name).collect::<Vec<_>>(), ["read2", "read10"]);
}

#[test]
fn test_group_hits_missing_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.bam");
    let output = dir.path().join("output.bam");
    let result = run_mateflow(&["group-hits", "-i", arg(&input), "-o", arg(&output)]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Input BAM does not exist"));
    assert!(!output.exists());
}
