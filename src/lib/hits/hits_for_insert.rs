//! The per-template group of alignment records handed out by the grouping iterator.

use noodles::sam::alignment::record_buf::RecordBuf;

use crate::errors::MateflowError;
use crate::sam::record_utils::{query_name, query_name_lossy};

/// The bucket a record is routed to within a [`HitsForInsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitBucket {
    /// Primary candidate for an unpaired read or the first end of a pair.
    FirstOfPairOrFragment,
    /// Supplementary alignment for an unpaired read or the first end of a pair.
    SupplementalFirstOfPairOrFragment,
    /// Primary candidate for the second end of a pair.
    SecondOfPair,
    /// Supplementary alignment for the second end of a pair.
    SupplementalSecondOfPair,
}

impl HitBucket {
    /// Routes a record by its own flags.
    ///
    /// # Errors
    ///
    /// Returns [`MateflowError::UnclassifiableRecord`] for a paired record flagged as neither
    /// first nor second of pair.
    pub fn classify(record: &RecordBuf) -> Result<Self, MateflowError> {
        let flags = record.flags();
        let supplementary = flags.is_supplementary();
        if !flags.is_segmented() || flags.is_first_segment() {
            Ok(if supplementary {
                Self::SupplementalFirstOfPairOrFragment
            } else {
                Self::FirstOfPairOrFragment
            })
        } else if flags.is_last_segment() {
            Ok(if supplementary { Self::SupplementalSecondOfPair } else { Self::SecondOfPair })
        } else {
            Err(MateflowError::UnclassifiableRecord { name: query_name_lossy(record) })
        }
    }
}

/// All surviving alignments of one query template, split into four ordered buckets.
///
/// Every record shares one query name. Records keep their input order within a bucket, and
/// the `i`-th first-of-pair candidate is conventionally paired with the `i`-th second-of-pair
/// candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitsForInsert {
    first_of_pair_or_fragment: Vec<RecordBuf>,
    supplemental_first_of_pair_or_fragment: Vec<RecordBuf>,
    second_of_pair: Vec<RecordBuf>,
    supplemental_second_of_pair: Vec<RecordBuf>,
}

impl HitsForInsert {
    /// An empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to `bucket`.
    pub fn push(&mut self, bucket: HitBucket, record: RecordBuf) {
        let target = match bucket {
            HitBucket::FirstOfPairOrFragment => &mut self.first_of_pair_or_fragment,
            HitBucket::SupplementalFirstOfPairOrFragment => {
                &mut self.supplemental_first_of_pair_or_fragment
            }
            HitBucket::SecondOfPair => &mut self.second_of_pair,
            HitBucket::SupplementalSecondOfPair => &mut self.supplemental_second_of_pair,
        };
        target.push(record);
    }

    /// Number of alternative hits: the larger of the two ends' candidate counts.
    #[must_use]
    pub fn num_hits(&self) -> usize {
        self.first_of_pair_or_fragment.len().max(self.second_of_pair.len())
    }

    /// Number of supplementary records across both ends.
    #[must_use]
    pub fn num_supplementals(&self) -> usize {
        self.supplemental_first_of_pair_or_fragment.len() + self.supplemental_second_of_pair.len()
    }

    /// Total number of records in all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.first_of_pair_or_fragment.len() + self.second_of_pair.len() + self.num_supplementals()
    }

    /// True when no bucket holds a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the group holds any second-of-pair record, candidate or supplementary.
    #[must_use]
    pub fn has_second_of_pair(&self) -> bool {
        !self.second_of_pair.is_empty() || !self.supplemental_second_of_pair.is_empty()
    }

    /// The shared query name, taken from the first record found.
    #[must_use]
    pub fn read_name(&self) -> Option<&[u8]> {
        self.iter().next().map(query_name)
    }

    /// The `i`-th first-of-pair (or fragment) candidate.
    #[must_use]
    pub fn first_of_pair(&self, i: usize) -> Option<&RecordBuf> {
        self.first_of_pair_or_fragment.get(i)
    }

    /// Mutable access to the `i`-th first-of-pair (or fragment) candidate.
    pub fn first_of_pair_mut(&mut self, i: usize) -> Option<&mut RecordBuf> {
        self.first_of_pair_or_fragment.get_mut(i)
    }

    /// The `i`-th second-of-pair candidate.
    #[must_use]
    pub fn second_of_pair(&self, i: usize) -> Option<&RecordBuf> {
        self.second_of_pair.get(i)
    }

    /// Mutable access to the `i`-th second-of-pair candidate.
    pub fn second_of_pair_mut(&mut self, i: usize) -> Option<&mut RecordBuf> {
        self.second_of_pair.get_mut(i)
    }

    /// First-of-pair (or fragment) candidates in input order.
    #[must_use]
    pub fn first_of_pair_candidates(&self) -> &[RecordBuf] {
        &self.first_of_pair_or_fragment
    }

    /// Second-of-pair candidates in input order.
    #[must_use]
    pub fn second_of_pair_candidates(&self) -> &[RecordBuf] {
        &self.second_of_pair
    }

    /// Both candidate lists, mutably and at once.
    pub fn candidates_mut(&mut self) -> (&mut [RecordBuf], &mut [RecordBuf]) {
        (&mut self.first_of_pair_or_fragment, &mut self.second_of_pair)
    }

    /// Supplementary records of the first end (or fragment).
    #[must_use]
    pub fn supplemental_first_of_pair(&self) -> &[RecordBuf] {
        &self.supplemental_first_of_pair_or_fragment
    }

    /// Supplementary records of the second end.
    #[must_use]
    pub fn supplemental_second_of_pair(&self) -> &[RecordBuf] {
        &self.supplemental_second_of_pair
    }

    /// Every record: first-end candidates, first-end supplementals, then the same for the
    /// second end.
    pub fn iter(&self) -> impl Iterator<Item = &RecordBuf> {
        self.first_of_pair_or_fragment
            .iter()
            .chain(&self.supplemental_first_of_pair_or_fragment)
            .chain(&self.second_of_pair)
            .chain(&self.supplemental_second_of_pair)
    }

    /// Consumes the group, yielding records in the order of [`HitsForInsert::iter`].
    pub fn into_records(self) -> impl Iterator<Item = RecordBuf> {
        self.first_of_pair_or_fragment
            .into_iter()
            .chain(self.supplemental_first_of_pair_or_fragment)
            .chain(self.second_of_pair)
            .chain(self.supplemental_second_of_pair)
    }
}
