//! Record filters applied before grouping.

use noodles::sam::alignment::record_buf::RecordBuf;

use crate::sam::record_utils::cigar_maps_no_bases_to_ref;

/// Decides which records are dropped before they reach a hit group.
pub trait RecordFilter {
    /// True when `record` should be dropped.
    fn filter_out(&self, record: &RecordBuf) -> bool;

    /// True when a mate pair should be dropped together. By default a pair is dropped only
    /// when both records qualify on their own.
    fn filter_out_pair(&self, first: &RecordBuf, second: &RecordBuf) -> bool {
        self.filter_out(first) && self.filter_out(second)
    }
}

impl<F> RecordFilter for F
where
    F: Fn(&RecordBuf) -> bool,
{
    fn filter_out(&self, record: &RecordBuf) -> bool {
        self(record)
    }
}

/// Drops records that are unmapped or whose CIGAR places no read base on the reference.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnalignedFilter;

impl RecordFilter for UnalignedFilter {
    fn filter_out(&self, record: &RecordBuf) -> bool {
        record.flags().is_unmapped() || cigar_maps_no_bases_to_ref(record)
    }
}
