//! SAM/BAM header checks and record helpers.
//!
//! - [`builder`] - fluent record construction for tests
//! - [`record_utils`] - query names, CIGAR inspection, unclipped coordinates

pub mod builder;
pub mod record_utils;

pub use builder::{RecordBuilder, SegmentEnd, parse_cigar};
pub use record_utils::{
    HIT_INDEX_TAG, cigar_maps_no_bases_to_ref, query_name, query_name_lossy,
    unclipped_five_prime_position,
};

use std::path::Path;

use log::warn;
use noodles::sam::Header;

pub use noodles::sam::header::record::value::map::header::sort_order::{COORDINATE, QUERY_NAME};

/// True when the header's `SO` field equals `sort_order`.
///
/// ```rust
/// use mateflow_lib::sam::{QUERY_NAME, is_sorted};
///
/// let header: noodles::sam::Header = "@HD\tVN:1.6\tSO:queryname\n".parse().unwrap();
/// assert!(is_sorted(&header, QUERY_NAME));
/// ```
#[must_use]
pub fn is_sorted(header: &Header, sort_order: &[u8]) -> bool {
    header.header().is_some_and(|hd| {
        hd.other_fields().get(b"SO").is_some_and(|so| AsRef::<[u8]>::as_ref(so) == sort_order)
    })
}

/// Logs a warning when the header does not declare `sort_order`.
///
/// The header is advisory only: grouping validates the actual record order as it reads.
pub fn check_sort(header: &Header, path: &Path, sort_order: &[u8]) {
    if !is_sorted(header, sort_order) {
        warn!(
            "Input file {} does not declare SO:{} in its header; continuing and validating order while reading.",
            path.display(),
            String::from_utf8_lossy(sort_order)
        );
    }
}
