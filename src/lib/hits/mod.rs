//! Multi-hit alignment grouping.
//!
//! Aligners that report several alignments per read emit them as adjacent records sharing a
//! query name. This module turns such a query-name sorted stream into one
//! [`HitsForInsert`] per template:
//!
//! - [`filter`] - records dropped before grouping
//! - [`order`] - query-name orders used to validate the input
//! - [`clip_repair`] - terminal hard clips restored as soft clips
//! - [`hits_for_insert`] - the four-bucket group and record classification
//! - [`primary`] - primary alignment selection for ambiguous groups
//! - [`iterator`] - the grouping iterator itself

pub mod clip_repair;
pub mod filter;
pub mod hits_for_insert;
pub mod iterator;
pub mod order;
pub mod primary;

pub use clip_repair::{FILLER_BASE, FILLER_QUALITY, replace_hard_with_soft_clips};
pub use filter::{RecordFilter, UnalignedFilter};
pub use hits_for_insert::{HitBucket, HitsForInsert};
pub use iterator::{GroupingStats, MultiHitGroupIterator};
pub use order::{
    LexicographicQueryname, NaturalQueryname, QuerynameOrder, RecordOrder, natural_compare,
};
pub use primary::{
    InputOrderStrategy, PrimaryAlignmentSelectionStrategy, make_sole_primary, mark_hit,
};
