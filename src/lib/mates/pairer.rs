//! Matching of paired reads in a coordinate-sorted stream.

use ahash::AHashMap;
use noodles::sam::Header;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::header::record::value::map::read_group::tag as rg_tag;
use serde::Serialize;

use super::{PendingMates, ReadEnds};
use crate::errors::Result;
use crate::sam::record_utils::query_name_lossy;

const READ_GROUP_TAG: Tag = Tag::new(b'R', b'G');

/// Library ids keyed by read group ID.
///
/// Libraries are numbered from 1 in name order; records without a known read group get 0.
#[derive(Debug, Default, Clone)]
pub struct LibraryIndex {
    by_read_group: AHashMap<Vec<u8>, u16>,
}

impl LibraryIndex {
    /// Builds the index from the header's `@RG` lines. A read group without `LB` is its own
    /// library.
    #[must_use]
    pub fn from_header(header: &Header) -> Self {
        let named: Vec<(Vec<u8>, String)> = header
            .read_groups()
            .iter()
            .map(|(id, rg)| {
                let library = rg
                    .other_fields()
                    .get(&rg_tag::LIBRARY)
                    .map_or_else(|| id.to_string(), ToString::to_string);
                (id.to_vec(), library)
            })
            .collect();

        let mut libraries: Vec<&str> = named.iter().map(|(_, lib)| lib.as_str()).collect();
        libraries.sort_unstable();
        libraries.dedup();

        let by_read_group = named
            .iter()
            .map(|(id, lib)| {
                let index = libraries.binary_search(&lib.as_str()).unwrap_or(0);
                (id.clone(), u16::try_from(index + 1).unwrap_or(u16::MAX))
            })
            .collect();
        Self { by_read_group }
    }

    /// The library id of a record, from its `RG` tag.
    #[must_use]
    pub fn library_of(&self, record: &RecordBuf) -> u16 {
        match record.data().get(&READ_GROUP_TAG) {
            Some(Value::String(id)) => self.by_read_group.get(id.as_slice()).copied().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Key of a waiting end: the query name, prefixed with the read group when there is one so
/// that read groups reusing a name do not meet.
fn pending_key(name: &str, ends: &ReadEnds) -> String {
    match &ends.read_group {
        Some(read_group) => format!("{read_group}:{name}"),
        None => name.to_string(),
    }
}

/// Two ends of one template, in the order they were encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatedPair {
    /// The shared query name.
    pub name: String,
    /// The end seen first (lower coordinate).
    pub first: ReadEnds,
    /// The end seen second.
    pub second: ReadEnds,
}

/// One row of the pairs output.
#[derive(Debug, Clone, Serialize)]
pub struct MatedPairRow {
    /// Query name.
    pub name: String,
    /// Library id of the template.
    pub library_id: u16,
    /// Reference index of the first end.
    pub reference_index_1: u32,
    /// Unclipped 5' coordinate of the first end.
    pub position_1: u32,
    /// `+` or `-` for the first end.
    pub strand_1: char,
    /// Reference index of the second end.
    pub reference_index_2: u32,
    /// Unclipped 5' coordinate of the second end.
    pub position_2: u32,
    /// `+` or `-` for the second end.
    pub strand_2: char,
    /// Sum of both ends' scores.
    pub score: u32,
}

fn strand(ends: &ReadEnds) -> char {
    if ends.reverse { '-' } else { '+' }
}

impl From<&MatedPair> for MatedPairRow {
    fn from(pair: &MatedPair) -> Self {
        Self {
            name: pair.name.clone(),
            library_id: pair.first.library_id,
            reference_index_1: pair.first.reference_index,
            position_1: pair.first.unclipped_five_prime,
            strand_1: strand(&pair.first),
            reference_index_2: pair.second.reference_index,
            position_2: pair.second.unclipped_five_prime,
            strand_2: strand(&pair.second),
            score: pair.first.score.saturating_add(pair.second.score),
        }
    }
}

/// Counts collected while pairing mates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatePairingMetrics {
    /// Records examined.
    pub records_read: u64,
    /// Secondary and supplementary records skipped.
    pub secondary_or_supplementary: u64,
    /// Unpaired records skipped.
    pub unpaired: u64,
    /// Unmapped or unplaced records skipped.
    pub unmapped: u64,
    /// Mapped records whose mate is unmapped.
    pub mate_unmapped: u64,
    /// Templates whose two ends were matched.
    pub pairs_mated: u64,
    /// Matched templates whose ends lie on different references.
    pub cross_reference_pairs: u64,
    /// Ends still waiting for a mate at the end of input.
    pub orphans: u64,
    /// Largest number of ends waiting at once.
    pub max_pending: u64,
    /// Largest number of waiting ends held in memory at once.
    pub max_pending_in_ram: u64,
}

/// Walks a coordinate-sorted record stream and matches each primary mapped read with its mate.
///
/// A read whose mate has not been seen is stored under the mate's reference index. When the
/// mate arrives it is looked up under its own reference index, which never decreases in
/// coordinate order.
pub struct MatePairer<P> {
    pending: P,
    libraries: LibraryIndex,
    metrics: MatePairingMetrics,
}

impl<P: PendingMates> MatePairer<P> {
    /// Creates a pairer storing waiting ends in `pending`.
    pub fn new(pending: P, header: &Header) -> Self {
        Self {
            pending,
            libraries: LibraryIndex::from_header(header),
            metrics: MatePairingMetrics::default(),
        }
    }

    /// Counts so far (orphans are only filled in by [`MatePairer::finish`]).
    #[must_use]
    pub fn metrics(&self) -> &MatePairingMetrics {
        &self.metrics
    }

    /// Number of ends currently waiting for their mate.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.size()
    }

    /// Processes one record, returning the pair it completes, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the pending-mate store fails.
    pub fn process(&mut self, record: &RecordBuf) -> Result<Option<MatedPair>> {
        self.metrics.records_read += 1;
        let flags = record.flags();
        if flags.is_secondary() || flags.is_supplementary() {
            self.metrics.secondary_or_supplementary += 1;
            return Ok(None);
        }
        if !flags.is_segmented() {
            self.metrics.unpaired += 1;
            return Ok(None);
        }
        if flags.is_unmapped() {
            self.metrics.unmapped += 1;
            return Ok(None);
        }
        let (Some(partition), Some(ends)) = (
            record.reference_sequence_id(),
            ReadEnds::from_record(record, self.libraries.library_of(record)),
        ) else {
            self.metrics.unmapped += 1;
            return Ok(None);
        };
        let Some(mate_partition) =
            record.mate_reference_sequence_id().filter(|_| !flags.is_mate_unmapped())
        else {
            self.metrics.mate_unmapped += 1;
            return Ok(None);
        };

        let name = query_name_lossy(record);
        let key = pending_key(&name, &ends);
        if let Some(first) = self.pending.remove(partition, &key)? {
            self.metrics.pairs_mated += 1;
            if first.reference_index != ends.reference_index {
                self.metrics.cross_reference_pairs += 1;
            }
            return Ok(Some(MatedPair { name, first, second: ends }));
        }

        self.pending.put(mate_partition, key, ends)?;
        self.metrics.max_pending = self.metrics.max_pending.max(self.pending.size() as u64);
        self.metrics.max_pending_in_ram =
            self.metrics.max_pending_in_ram.max(self.pending.size_in_ram() as u64);
        Ok(None)
    }

    /// Ends processing and returns the final counts, including orphans.
    #[must_use]
    pub fn finish(mut self) -> MatePairingMetrics {
        self.metrics.orphans = self.pending.size() as u64;
        self.metrics
    }
}
