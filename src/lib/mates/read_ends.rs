//! The per-read state kept while a record waits for its mate.

use std::io::{self, Read, Write};

use mateflow_spill::Spillable;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;

use crate::sam::record_utils::{sum_of_base_qualities, unclipped_five_prime_position};

/// Base qualities below this do not count towards [`ReadEnds::score`].
pub const MIN_SCORING_QUALITY: u8 = 15;

const READ_GROUP_TAG: Tag = Tag::new(b'R', b'G');

/// Position and quality summary of one end of a pair.
///
/// Encoded for spilling as: library id (`u16`), reference index (`u32`), unclipped 5'
/// coordinate (`u32`), reverse strand (`u8`), score (`u32`), then the read group as an optional
/// length-prefixed string. All integers are little-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEnds {
    /// Index of the record's library among the header's read groups.
    pub library_id: u16,
    /// Reference sequence index of the record.
    pub reference_index: u32,
    /// 1-based unclipped coordinate of the 5' end.
    pub unclipped_five_prime: u32,
    /// True when the record aligns to the reverse strand.
    pub reverse: bool,
    /// Sum of base qualities of at least [`MIN_SCORING_QUALITY`].
    pub score: u32,
    /// Read group ID from the `RG` tag.
    pub read_group: Option<String>,
}

impl ReadEnds {
    /// Summarizes a mapped record. Returns `None` when it has no reference or position.
    #[must_use]
    pub fn from_record(record: &RecordBuf, library_id: u16) -> Option<Self> {
        let reference_index = u32::try_from(record.reference_sequence_id()?).ok()?;
        let unclipped_five_prime = u32::try_from(unclipped_five_prime_position(record)?).ok()?;
        let read_group = match record.data().get(&READ_GROUP_TAG) {
            Some(Value::String(id)) => Some(String::from_utf8_lossy(id).into_owned()),
            _ => None,
        };
        Some(Self {
            library_id,
            reference_index,
            unclipped_five_prime,
            reverse: record.flags().is_reverse_complemented(),
            score: sum_of_base_qualities(record, MIN_SCORING_QUALITY),
            read_group,
        })
    }
}

impl Spillable for ReadEnds {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.library_id.write_to(writer)?;
        self.reference_index.write_to(writer)?;
        self.unclipped_five_prime.write_to(writer)?;
        self.reverse.write_to(writer)?;
        self.score.write_to(writer)?;
        self.read_group.write_to(writer)
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            library_id: u16::read_from(reader)?,
            reference_index: u32::read_from(reader)?,
            unclipped_five_prime: u32::read_from(reader)?,
            reverse: bool::read_from(reader)?,
            score: u32::read_from(reader)?,
            read_group: Option::<String>::read_from(reader)?,
        })
    }
}
