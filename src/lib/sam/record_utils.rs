//! Per-record helpers shared by the grouping and mate-tracking code.

use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;

/// The hit index tag (`HI`), numbering alternative alignments of one read.
pub const HIT_INDEX_TAG: Tag = Tag::new(b'H', b'I');

/// The query name of a record, or an empty slice when it has none.
#[must_use]
pub fn query_name(record: &RecordBuf) -> &[u8] {
    record.name().map(AsRef::<[u8]>::as_ref).unwrap_or_default()
}

/// The query name as a printable string, for log and error messages.
#[must_use]
pub fn query_name_lossy(record: &RecordBuf) -> String {
    String::from_utf8_lossy(query_name(record)).into_owned()
}

/// True when no CIGAR operation consumes both read and reference bases.
///
/// An empty CIGAR maps nothing and therefore returns true.
#[must_use]
pub fn cigar_maps_no_bases_to_ref(record: &RecordBuf) -> bool {
    !record
        .cigar()
        .as_ref()
        .iter()
        .any(|op| op.kind().consumes_read() && op.kind().consumes_reference())
}

/// Number of reference bases spanned by the alignment.
#[must_use]
pub fn reference_length(record: &RecordBuf) -> usize {
    record
        .cigar()
        .as_ref()
        .iter()
        .filter(|op| op.kind().consumes_reference())
        .map(|op| op.len())
        .sum()
}

/// Total length of the clipping operations at the head of `ops`.
fn clipped_len<'a>(ops: impl Iterator<Item = &'a Op>) -> usize {
    ops.take_while(|op| matches!(op.kind(), Kind::SoftClip | Kind::HardClip))
        .map(|op| op.len())
        .sum()
}

/// The 1-based start of the alignment extended by any leading soft or hard clips.
///
/// Returns `None` for unmapped records or records without a position.
#[must_use]
pub fn unclipped_start(record: &RecordBuf) -> Option<usize> {
    if record.flags().is_unmapped() {
        return None;
    }
    let start = usize::from(record.alignment_start()?);
    Some(start.saturating_sub(clipped_len(record.cigar().as_ref().iter())))
}

/// The 1-based end of the alignment extended by any trailing soft or hard clips.
#[must_use]
pub fn unclipped_end(record: &RecordBuf) -> Option<usize> {
    if record.flags().is_unmapped() {
        return None;
    }
    let start = usize::from(record.alignment_start()?);
    let end = start + reference_length(record).saturating_sub(1);
    Some(end + clipped_len(record.cigar().as_ref().iter().rev()))
}

/// The unclipped coordinate of the sequenced 5' end: the unclipped end for reverse-strand
/// records and the unclipped start otherwise.
#[must_use]
pub fn unclipped_five_prime_position(record: &RecordBuf) -> Option<usize> {
    if record.flags().is_reverse_complemented() {
        unclipped_end(record)
    } else {
        unclipped_start(record)
    }
}

/// Sum of the base qualities that are at least `min_quality`.
#[must_use]
pub fn sum_of_base_qualities(record: &RecordBuf, min_quality: u8) -> u32 {
    record
        .quality_scores()
        .as_ref()
        .iter()
        .filter(|&&q| q >= min_quality)
        .map(|&q| u32::from(q))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sam::builder::RecordBuilder;
    use rstest::rstest;

    #[rstest]
    #[case("10M", false)]
    #[case("5S5M", false)]
    #[case("10S", true)]
    #[case("5H10I5H", true)]
    #[case("3D", true)]
    #[case("2=3X", false)]
    fn test_cigar_maps_no_bases_to_ref(#[case] cigar: &str, #[case] expected: bool) {
        let record = RecordBuilder::new().name("q").start(0, 100).cigar(cigar).build();
        assert_eq!(cigar_maps_no_bases_to_ref(&record), expected);
    }

    #[test]
    fn test_empty_cigar_maps_nothing() {
        let record = RecordBuilder::new().name("q").build();
        assert!(cigar_maps_no_bases_to_ref(&record));
    }

    #[test]
    fn test_unclipped_positions() {
        let forward = RecordBuilder::new().name("q").start(0, 100).cigar("5H3S10M2S").build();
        assert_eq!(unclipped_start(&forward), Some(92));
        assert_eq!(unclipped_end(&forward), Some(111));
        assert_eq!(unclipped_five_prime_position(&forward), Some(92));

        let reverse = RecordBuilder::new()
            .name("q")
            .start(0, 100)
            .cigar("10M4S")
            .reverse_complement(true)
            .build();
        assert_eq!(unclipped_five_prime_position(&reverse), Some(113));
    }

    #[test]
    fn test_unmapped_has_no_unclipped_position() {
        let record = RecordBuilder::new().name("q").sequence("ACGT").unmapped(true).build();
        assert_eq!(unclipped_five_prime_position(&record), None);
    }

    #[test]
    fn test_query_name_and_quality_sum() {
        let record =
            RecordBuilder::new().name("read7").sequence("ACGT").qualities(&[10, 20, 30, 15]).build();
        assert_eq!(query_name(&record), b"read7");
        assert_eq!(query_name_lossy(&record), "read7");
        assert_eq!(sum_of_base_qualities(&record, 15), 65);
    }
}
