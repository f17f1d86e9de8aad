//! CLI command implementations for mateflow.
//!
//! - [`group_hits`] - Group a queryname-sorted BAM into per-template hit sets and resolve
//!   primaries
//! - [`pair_mates`] - Pair mates over a coordinate-sorted BAM and report pairing metrics

#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::uninlined_format_args
)]

pub mod command;
pub mod common;
pub mod group_hits;
pub mod pair_mates;
