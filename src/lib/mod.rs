#![deny(unsafe_code)]
// Numeric casts between counts and coordinates are intentional throughout.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::items_after_statements,
    clippy::redundant_closure_for_method_calls,
    clippy::uninlined_format_args
)]

//! # mateflow - mate tracking and multi-hit grouping for alignment streams
//!
//! ## Overview
//!
//! ### Core Functionality
//!
//! - **[`hits`]** - Groups a queryname-sorted record stream into one [`hits::HitsForInsert`]
//!   per query, repairs hard clips, and resolves a single primary alignment per end
//! - **[`mates`]** - Pairs the two ends of each template in a single pass over a
//!   coordinate-sorted stream, spilling pending reads to disk per reference
//! - **[`mateflow_spill`]** - The partitioned spill-to-disk map behind [`mates`]
//!
//! ### Utilities
//!
//! - **[`bam_io`]** - BAM readers and writers
//! - **[`header`]** - `@PG` records
//! - **[`sam`]** - Record helpers and a record builder for tests
//! - **[`metrics`]** - TSV metrics output
//! - **[`logging`]**, **[`progress`]** - Formatted log lines and progress reporting
//! - **[`validation`]** - Parameter and path checks
//!
//! ## Quick Start
//!
//! ```no_run
//! use mateflow_lib::bam_io::{create_bam_reader, record_bufs};
//! use mateflow_lib::hits::{InputOrderStrategy, MultiHitGroupIterator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let path = std::path::Path::new("input.bam");
//! let (mut reader, header) = create_bam_reader(path, 1)?;
//! let groups = MultiHitGroupIterator::new(record_bufs(&mut reader, &header, path), InputOrderStrategy);
//! for group in groups {
//!     let group = group?;
//!     println!("{:?} has {} hits", group.read_name(), group.num_hits());
//! }
//! # Ok(())
//! # }
//! ```

pub mod bam_io;
pub mod errors;
pub mod header;
pub mod hits;
pub mod logging;
pub mod mates;
pub mod metrics;
pub mod progress;
pub mod sam;
pub mod validation;

pub use mateflow_spill;
