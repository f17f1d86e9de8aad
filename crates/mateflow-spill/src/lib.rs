#![deny(unsafe_code)]

//! A partitioned key/value map that keeps one partition in memory and spills the rest to disk.
//!
//! The map is designed to be driven by a coordinate-sorted stream of records: a value is stored
//! under the partition (reference sequence index) where it is expected to be consumed, and
//! partitions are drained in non-decreasing order as the stream advances. Only the partition
//! currently being drained lives in RAM; every other partition with entries is an append-only
//! file in a scratch directory owned by the map.
//!
//! # Example
//!
//! ```
//! use mateflow_spill::{SpillConfig, SpilloverMap};
//!
//! # fn main() -> Result<(), mateflow_spill::SpillError> {
//! let mut map: SpilloverMap<String, u64> = SpilloverMap::new(SpillConfig::new())?;
//!
//! map.put(0, "read1".to_string(), 10)?;
//! map.put(2, "read2".to_string(), 20)?; // spilled to disk
//! assert_eq!(map.size(), 2);
//! assert_eq!(map.size_in_ram(), 1);
//!
//! assert_eq!(map.remove(0, "read1")?, Some(10));
//! assert_eq!(map.remove(2, "read2")?, Some(20)); // loads partition 2
//! assert_eq!(map.size(), 0);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod map;
mod store;

pub use codec::{Codec, Spillable, SpillableCodec};
pub use config::{DEFAULT_MAX_OPEN_FILES, SpillConfig};
pub use error::{Result, SpillError, SpillOperation};
pub use map::SpilloverMap;
