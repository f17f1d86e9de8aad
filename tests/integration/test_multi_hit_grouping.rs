//! Grouping records read from a BAM file through the library API.

use mateflow_lib::bam_io::{create_bam_reader, record_bufs};
use mateflow_lib::errors::MateflowError;
use mateflow_lib::hits::{
    HitsForInsert, InputOrderStrategy, MultiHitGroupIterator, NaturalQueryname, UnalignedFilter,
};
use mateflow_lib::sam::builder::{RecordBuilder, SegmentEnd};
use noodles::sam::alignment::record_buf::RecordBuf;
use rstest::rstest;
use tempfile::TempDir;

use crate::helpers::{fragment, header_with_sort_order, mate, write_bam};

fn group_file(records: &[RecordBuf], threads: usize) -> anyhow::Result<Vec<HitsForInsert>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("input.bam");
    write_bam(&path, &header_with_sort_order("queryname"), records);

    let (mut reader, header) = create_bam_reader(&path, threads)?;
    MultiHitGroupIterator::new(record_bufs(&mut reader, &header, &path), InputOrderStrategy)
        .collect()
}

#[rstest]
#[case::single_threaded(1)]
#[case::multi_threaded(3)]
fn test_groups_from_bam(#[case] threads: usize) {
    let records = vec![
        mate("q1", SegmentEnd::First, (0, 10), (0, 90)),
        mate("q1", SegmentEnd::Second, (0, 90), (0, 10)),
        fragment("q2", 1, 50),
        fragment("q2", 1, 900),
        fragment("q3", 0, 5),
    ];
    let groups = group_file(&records, threads).unwrap();

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].read_name(), Some(b"q1".as_slice()));
    assert_eq!(groups[0].num_hits(), 1);
    assert!(groups[0].has_second_of_pair());
    assert_eq!(groups[1].num_hits(), 2);
    assert!(!groups[1].has_second_of_pair());
    assert_eq!(groups[2].num_hits(), 1);
}

#[test]
fn test_supplementals_travel_with_their_group() {
    let records = vec![
        mate("q1", SegmentEnd::First, (0, 10), (0, 90)),
        RecordBuilder::new()
            .name("q1")
            .segment(SegmentEnd::First)
            .supplementary(true)
            .start(1, 400)
            .cigar("20H10M")
            .build(),
        mate("q1", SegmentEnd::Second, (0, 90), (0, 10)),
    ];
    let groups = group_file(&records, 1).unwrap();
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.num_hits(), 1);
    assert_eq!(group.num_supplementals(), 1);
    assert_eq!(group.supplemental_first_of_pair()[0].sequence().len(), 30);
    assert_eq!(group.iter().count(), 3);
}

#[test]
fn test_ordering_error_downcasts() {
    let err = group_file(&[fragment("z", 0, 1), fragment("y", 0, 1)], 1).unwrap_err();
    match err.downcast_ref::<MateflowError>() {
        Some(MateflowError::OrderingViolation { previous, next }) => {
            assert_eq!(previous, "z");
            assert_eq!(next, "y");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_custom_strategy_and_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.bam");
    let records = vec![
        fragment("r9", 0, 1),
        fragment("r9", 0, 500),
        fragment("r10", 0, 1),
        fragment("r10", 1, 1),
    ];
    write_bam(&path, &header_with_sort_order("queryname"), &records);

    // Keep the last candidate as primary instead of the first.
    let last_wins = |hits: &mut HitsForInsert| {
        let (firsts, _) = hits.candidates_mut();
        let last = firsts.len() - 1;
        for (i, record) in firsts.iter_mut().enumerate() {
            mateflow_lib::hits::mark_hit(record, i, i == last);
        }
    };

    let (mut reader, header) = create_bam_reader(&path, 1).unwrap();
    let mut groups = MultiHitGroupIterator::with_options(
        record_bufs(&mut reader, &header, &path),
        last_wins,
        NaturalQueryname,
        UnalignedFilter,
    );
    let mut primaries = Vec::new();
    for group in groups.by_ref() {
        let group = group.unwrap();
        let primary = group
            .first_of_pair_candidates()
            .iter()
            .position(|r| !r.flags().is_secondary())
            .unwrap();
        primaries.push(primary);
    }
    assert_eq!(primaries, [1, 1]);
    assert_eq!(groups.stats().groups_ambiguous, 2);
    assert!(!groups.has_next());
}
