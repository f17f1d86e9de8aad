//! Primary alignment selection for groups with more than one candidate hit.

use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;

use super::HitsForInsert;
use crate::sam::record_utils::HIT_INDEX_TAG;

/// Chooses the primary alignment(s) of an ambiguous hit group.
///
/// Implementations mutate the records in place: they set the `HI` tag on alternative hits
/// and leave exactly one primary record per end (or per concordant pair). The grouping
/// iterator does not check the result.
pub trait PrimaryAlignmentSelectionStrategy {
    /// Resolves the primary designation of `hits`.
    fn select_primary(&self, hits: &mut HitsForInsert);
}

impl<F> PrimaryAlignmentSelectionStrategy for F
where
    F: Fn(&mut HitsForInsert),
{
    fn select_primary(&self, hits: &mut HitsForInsert) {
        self(hits);
    }
}

/// Makes a record the sole primary hit: removes `HI` and clears the secondary flag.
pub fn make_sole_primary(record: &mut RecordBuf) {
    record.data_mut().remove(&HIT_INDEX_TAG);
    record.flags_mut().remove(Flags::SECONDARY);
}

/// Marks a record as hit `index` of several, primary only when `primary` is set.
pub fn mark_hit(record: &mut RecordBuf, index: usize, primary: bool) {
    let index = i32::try_from(index).unwrap_or(i32::MAX);
    record.data_mut().insert(HIT_INDEX_TAG, Value::from(index));
    record.flags_mut().set(Flags::SECONDARY, !primary);
}

/// Keeps the first candidate of each end as primary and marks the rest secondary, numbering
/// every candidate with its 0-based position in `HI`.
///
/// Candidate `i` of the first end and candidate `i` of the second end share a hit index, so
/// mates reported together stay linked.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputOrderStrategy;

impl PrimaryAlignmentSelectionStrategy for InputOrderStrategy {
    fn select_primary(&self, hits: &mut HitsForInsert) {
        let (firsts, seconds) = hits.candidates_mut();
        for candidates in [firsts, seconds] {
            for (i, record) in candidates.iter_mut().enumerate() {
                mark_hit(record, i, i == 0);
            }
        }
    }
}
