//! Fluent construction of alignment records for tests, benchmarks and doc examples.
//!
//! ```rust
//! use mateflow_lib::sam::builder::{RecordBuilder, SegmentEnd};
//!
//! let record = RecordBuilder::new()
//!     .name("q1")
//!     .segment(SegmentEnd::First)
//!     .start(0, 100)
//!     .cigar("5H10M5H")
//!     .build();
//! assert_eq!(record.sequence().len(), 10);
//! ```

use noodles::core::Position;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::MappingQuality;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::{QualityScores, RecordBuf, Sequence};

/// Quality assigned to generated bases when no qualities are given.
pub const DEFAULT_BASE_QUALITY: u8 = 30;

/// Which segment of a template a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEnd {
    /// Paired, first of pair (R1).
    First,
    /// Paired, second of pair (R2).
    Second,
    /// Paired but flagged as neither first nor second.
    Neither,
}

/// Builder for a single [`RecordBuf`].
///
/// When only a CIGAR is set, a sequence of matching read length is generated. When only a
/// sequence is set on a placed record, the CIGAR defaults to `{len}M`.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    name: Option<Vec<u8>>,
    flags: Flags,
    reference_sequence_id: Option<usize>,
    alignment_start: Option<usize>,
    mapping_quality: Option<u8>,
    cigar: Option<String>,
    sequence: Vec<u8>,
    qualities: Vec<u8>,
    tags: Vec<(Tag, Value)>,
}

impl RecordBuilder {
    /// An empty, unpaired, mapped-flagged record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.as_bytes().to_vec());
        self
    }

    /// Sets the bases.
    #[must_use]
    pub fn sequence(mut self, bases: &str) -> Self {
        self.sequence = bases.as_bytes().to_vec();
        self
    }

    /// Sets the base qualities (raw Phred values).
    #[must_use]
    pub fn qualities(mut self, quals: &[u8]) -> Self {
        self.qualities = quals.to_vec();
        self
    }

    /// Replaces all flags.
    #[must_use]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Marks the record as a paired segment of the given end.
    #[must_use]
    pub fn segment(mut self, end: SegmentEnd) -> Self {
        self.flags.insert(Flags::SEGMENTED);
        self.flags.remove(Flags::FIRST_SEGMENT | Flags::LAST_SEGMENT);
        match end {
            SegmentEnd::First => self.flags.insert(Flags::FIRST_SEGMENT),
            SegmentEnd::Second => self.flags.insert(Flags::LAST_SEGMENT),
            SegmentEnd::Neither => {}
        }
        self
    }

    fn set_flag(mut self, flag: Flags, on: bool) -> Self {
        self.flags.set(flag, on);
        self
    }

    /// Sets or clears the unmapped flag.
    #[must_use]
    pub fn unmapped(self, unmapped: bool) -> Self {
        self.set_flag(Flags::UNMAPPED, unmapped)
    }

    /// Sets or clears the reverse-strand flag.
    #[must_use]
    pub fn reverse_complement(self, reverse: bool) -> Self {
        self.set_flag(Flags::REVERSE_COMPLEMENTED, reverse)
    }

    /// Sets or clears the mate-unmapped flag.
    #[must_use]
    pub fn mate_unmapped(self, unmapped: bool) -> Self {
        self.set_flag(Flags::MATE_UNMAPPED, unmapped)
    }

    /// Sets or clears the secondary (not primary) flag.
    #[must_use]
    pub fn secondary(self, secondary: bool) -> Self {
        self.set_flag(Flags::SECONDARY, secondary)
    }

    /// Sets or clears the supplementary flag.
    #[must_use]
    pub fn supplementary(self, supplementary: bool) -> Self {
        self.set_flag(Flags::SUPPLEMENTARY, supplementary)
    }

    /// Places the record on a reference at a 1-based position.
    #[must_use]
    pub fn start(mut self, reference_sequence_id: usize, position: usize) -> Self {
        self.reference_sequence_id = Some(reference_sequence_id);
        self.alignment_start = Some(position);
        self
    }

    /// Sets the mapping quality.
    #[must_use]
    pub fn mapping_quality(mut self, mapq: u8) -> Self {
        self.mapping_quality = Some(mapq);
        self
    }

    /// Sets the CIGAR from its text form, e.g. `5H10M5H`.
    #[must_use]
    pub fn cigar(mut self, cigar: &str) -> Self {
        self.cigar = Some(cigar.to_string());
        self
    }

    /// Adds an auxiliary field. Tags that are not two characters long are ignored.
    #[must_use]
    pub fn tag<V: Into<Value>>(mut self, tag: &str, value: V) -> Self {
        if let [a, b] = tag.as_bytes() {
            self.tags.push((Tag::new(*a, *b), value.into()));
        }
        self
    }

    /// Builds the record.
    ///
    /// # Panics
    ///
    /// Panics on an unparsable CIGAR, a zero position or a mapping quality of 255.
    #[must_use]
    pub fn build(self) -> RecordBuf {
        let mut record = RecordBuf::default();
        *record.name_mut() = self.name.map(Into::into);
        *record.flags_mut() = self.flags;
        *record.reference_sequence_id_mut() = self.reference_sequence_id;
        *record.alignment_start_mut() = self
            .alignment_start
            .map(|pos| Position::try_from(pos).expect("alignment start must be >= 1"));
        *record.mapping_quality_mut() = self
            .mapping_quality
            .or(self.alignment_start.map(|_| 60))
            .map(|mapq| MappingQuality::try_from(mapq).expect("mapping quality must be < 255"));

        let ops = self.cigar.as_deref().map(parse_cigar).unwrap_or_default();
        let sequence = if self.sequence.is_empty() && !ops.is_empty() {
            let read_len: usize =
                ops.iter().filter(|op| op.kind().consumes_read()).map(|op| op.len()).sum();
            b"ACGT".iter().copied().cycle().take(read_len).collect()
        } else {
            self.sequence
        };
        let ops = if ops.is_empty() && !sequence.is_empty() && self.alignment_start.is_some() {
            vec![Op::new(Kind::Match, sequence.len())]
        } else {
            ops
        };

        let qualities = if self.qualities.is_empty() {
            vec![DEFAULT_BASE_QUALITY; sequence.len()]
        } else {
            self.qualities
        };

        *record.cigar_mut() = ops.into_iter().collect();
        *record.sequence_mut() = Sequence::from(sequence);
        *record.quality_scores_mut() = QualityScores::from(qualities);
        for (tag, value) in self.tags {
            record.data_mut().insert(tag, value);
        }
        record
    }
}

/// Parses a CIGAR string such as `5S90M5H` into operations.
///
/// # Panics
///
/// Panics on a missing length or an unknown operation character.
#[must_use]
pub fn parse_cigar(cigar: &str) -> Vec<Op> {
    let mut ops = Vec::new();
    let mut len = 0_usize;
    let mut saw_digit = false;
    for c in cigar.chars() {
        if let Some(d) = c.to_digit(10) {
            len = len * 10 + d as usize;
            saw_digit = true;
            continue;
        }
        assert!(saw_digit, "CIGAR operation '{c}' has no length in '{cigar}'");
        let kind = match c {
            'M' => Kind::Match,
            'I' => Kind::Insertion,
            'D' => Kind::Deletion,
            'N' => Kind::Skip,
            'S' => Kind::SoftClip,
            'H' => Kind::HardClip,
            'P' => Kind::Pad,
            '=' => Kind::SequenceMatch,
            'X' => Kind::SequenceMismatch,
            _ => panic!("Unknown CIGAR operation '{c}' in '{cigar}'"),
        };
        ops.push(Op::new(kind, len));
        len = 0;
        saw_digit = false;
    }
    ops
}
