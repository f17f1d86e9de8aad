//! Mate tracking over coordinate-sorted input.
//!
//! [`MatePairer`] holds each read until its mate arrives. Waiting reads live in a
//! [`PendingMates`] store, either fully in memory or backed by a spillover map that keeps only
//! the reference currently being processed in RAM.

pub mod pairer;
pub mod pending;
pub mod read_ends;

pub use pairer::{LibraryIndex, MatePairer, MatePairingMetrics, MatedPair, MatedPairRow};
pub use pending::{DiskPendingMates, InMemoryPendingMates, PendingMates};
pub use read_ends::{MIN_SCORING_QUALITY, ReadEnds};
