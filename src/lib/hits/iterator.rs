//! Grouping of a query-name sorted record stream into [`HitsForInsert`] groups.
//!
//! The iterator keeps one group of lookahead: the next group is assembled on construction and
//! after every emission, so [`MultiHitGroupIterator::has_next`] can answer without consuming.
//! For each group it
//!
//! 1. drops records rejected by the [`RecordFilter`],
//! 2. checks every consumed record against the record after it under the [`RecordOrder`],
//! 3. restores terminal hard clips as soft clips,
//! 4. rejects groups mixing paired and unpaired records,
//! 5. routes records to buckets, and
//! 6. resolves the primary alignment, delegating to the strategy when there are several hits.
//!
//! A group left with supplementals only has no hits and is skipped.
//!
//! Any error ends iteration; the error is yielded once and `None` follows.

use std::cmp::Ordering;
use std::iter::Fuse;

use anyhow::Result;
use log::debug;
use noodles::sam::alignment::record_buf::RecordBuf;
use serde::Serialize;

use super::clip_repair::replace_hard_with_soft_clips;
use super::filter::{RecordFilter, UnalignedFilter};
use super::order::{LexicographicQueryname, RecordOrder};
use super::primary::{PrimaryAlignmentSelectionStrategy, make_sole_primary};
use super::{HitBucket, HitsForInsert};
use crate::errors::MateflowError;
use crate::sam::record_utils::{query_name, query_name_lossy};

/// Counters describing what the iterator has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Records read from the source, including filtered ones.
    pub records_read: u64,
    /// Records dropped by the filter.
    pub records_filtered: u64,
    /// Records whose hard clips were converted.
    pub records_clip_repaired: u64,
    /// Groups assembled and handed out (or pending in the lookahead slot).
    pub groups_emitted: u64,
    /// Groups discarded for having no candidate alignments (supplementals only).
    pub groups_skipped: u64,
    /// Groups passed to the selection strategy.
    pub groups_ambiguous: u64,
}

/// A filtered record source with a single record of lookahead.
struct PeekableRecords<I, F> {
    source: Fuse<I>,
    filter: F,
    peeked: Option<RecordBuf>,
    records_read: u64,
    records_filtered: u64,
}

impl<I, F> PeekableRecords<I, F>
where
    I: Iterator<Item = Result<RecordBuf>>,
    F: RecordFilter,
{
    fn new(source: I, filter: F) -> Self {
        Self { source: source.fuse(), filter, peeked: None, records_read: 0, records_filtered: 0 }
    }

    fn fill(&mut self) -> Result<()> {
        while self.peeked.is_none() {
            let Some(record) = self.source.next() else {
                return Ok(());
            };
            let record = record?;
            self.records_read += 1;
            if self.filter.filter_out(&record) {
                self.records_filtered += 1;
            } else {
                self.peeked = Some(record);
            }
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&RecordBuf>> {
        self.fill()?;
        Ok(self.peeked.as_ref())
    }

    fn next_record(&mut self) -> Result<Option<RecordBuf>> {
        self.fill()?;
        Ok(self.peeked.take())
    }
}

/// Iterator over multi-hit groups of a query-name sorted record stream.
///
/// `S` resolves groups with several candidate hits, `O` validates input order (lexicographic
/// query names by default) and `F` drops records before grouping (unmapped or unaligned by
/// default).
///
/// # Example
///
/// ```rust
/// use mateflow_lib::hits::{InputOrderStrategy, MultiHitGroupIterator};
/// use mateflow_lib::sam::builder::RecordBuilder;
///
/// let records = vec![
///     RecordBuilder::new().name("a").start(0, 10).cigar("10M").build(),
///     RecordBuilder::new().name("a").start(0, 90).cigar("10M").build(),
///     RecordBuilder::new().name("b").start(0, 40).cigar("10M").build(),
/// ];
/// let groups: Vec<_> =
///     MultiHitGroupIterator::new(records.into_iter().map(Ok), InputOrderStrategy)
///         .collect::<anyhow::Result<_>>()
///         .unwrap();
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].num_hits(), 2);
/// ```
pub struct MultiHitGroupIterator<I, S, O = LexicographicQueryname, F = UnalignedFilter> {
    records: PeekableRecords<I, F>,
    strategy: S,
    order: O,
    next_group: Option<Result<HitsForInsert>>,
    stats: GroupingStats,
}

impl<I, S> MultiHitGroupIterator<I, S>
where
    I: Iterator<Item = Result<RecordBuf>>,
    S: PrimaryAlignmentSelectionStrategy,
{
    /// Creates an iterator with the default order and filter and assembles the first group.
    pub fn new(source: I, strategy: S) -> Self {
        Self::with_options(source, strategy, LexicographicQueryname, UnalignedFilter)
    }
}

impl<I, S, O, F> MultiHitGroupIterator<I, S, O, F>
where
    I: Iterator<Item = Result<RecordBuf>>,
    S: PrimaryAlignmentSelectionStrategy,
    O: RecordOrder,
    F: RecordFilter,
{
    /// Creates an iterator with an explicit order and filter and assembles the first group.
    pub fn with_options(source: I, strategy: S, order: O, filter: F) -> Self {
        let mut iter = Self {
            records: PeekableRecords::new(source, filter),
            strategy,
            order,
            next_group: None,
            stats: GroupingStats::default(),
        };
        iter.next_group = iter.advance();
        iter
    }

    /// True when another group (or a pending error) is available.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next_group.is_some()
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> GroupingStats {
        GroupingStats {
            records_read: self.records.records_read,
            records_filtered: self.records.records_filtered,
            ..self.stats
        }
    }

    /// Stops iteration and releases the record source.
    pub fn close(self) {
        debug!("Closing multi-hit iterator: {:?}", self.stats());
    }

    /// Assembles groups until one has at least one hit, the source ends, or an error occurs.
    fn advance(&mut self) -> Option<Result<HitsForInsert>> {
        loop {
            match self.assemble_group() {
                Ok(Some(hits)) if hits.num_hits() == 0 => self.stats.groups_skipped += 1,
                Ok(Some(hits)) => {
                    self.stats.groups_emitted += 1;
                    return Some(Ok(hits));
                }
                Ok(None) => {
                    debug!("Multi-hit grouping exhausted its input: {:?}", self.stats());
                    return None;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Consumes every record of the next query name and resolves its primary alignments.
    fn assemble_group(&mut self) -> Result<Option<HitsForInsert>> {
        let Some(mut record) = self.records.next_record()? else {
            return Ok(None);
        };
        let name = query_name(&record).to_vec();
        let paired = record.flags().is_segmented();
        let mut hits = HitsForInsert::new();

        loop {
            if let Some(next) = self.records.peek()? {
                if self.order.compare(&record, next) == Ordering::Greater {
                    return Err(MateflowError::OrderingViolation {
                        previous: query_name_lossy(&record),
                        next: query_name_lossy(next),
                    }
                    .into());
                }
            }

            if replace_hard_with_soft_clips(&mut record) {
                self.stats.records_clip_repaired += 1;
            }

            if record.flags().is_segmented() != paired {
                return Err(MateflowError::MixedPairing { name: query_name_lossy(&record) }.into());
            }

            let bucket = HitBucket::classify(&record)?;
            hits.push(bucket, record);

            let same_name = self.records.peek()?.is_some_and(|next| query_name(next) == name);
            if !same_name {
                break;
            }
            match self.records.next_record()? {
                Some(next) => record = next,
                None => break,
            }
        }

        self.resolve_primary(&mut hits);
        Ok(Some(hits))
    }

    fn resolve_primary(&mut self, hits: &mut HitsForInsert) {
        if hits.num_hits() <= 1 {
            if let Some(record) = hits.first_of_pair_mut(0) {
                make_sole_primary(record);
            }
            if let Some(record) = hits.second_of_pair_mut(0) {
                make_sole_primary(record);
            }
        } else {
            self.stats.groups_ambiguous += 1;
            self.strategy.select_primary(hits);
        }
    }
}

impl<I, S, O, F> Iterator for MultiHitGroupIterator<I, S, O, F>
where
    I: Iterator<Item = Result<RecordBuf>>,
    S: PrimaryAlignmentSelectionStrategy,
    O: RecordOrder,
    F: RecordFilter,
{
    type Item = Result<HitsForInsert>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_group.take()? {
            Ok(hits) => {
                self.next_group = self.advance();
                Some(Ok(hits))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
