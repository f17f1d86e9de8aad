//! Conversion of terminal hard clips into soft clips.
//!
//! Multi-hit grouping works on the full read length, so any record whose CIGAR starts or ends
//! with a hard clip gets the clipped bases restored as filler: `N` bases at quality 2, with the
//! terminal `H` operations rewritten as `S` of the same length. Interior hard clips are not
//! touched.

use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record_buf::{QualityScores, RecordBuf, Sequence};

/// Base used for restored hard-clipped positions.
pub const FILLER_BASE: u8 = b'N';

/// Phred quality used for restored hard-clipped positions.
pub const FILLER_QUALITY: u8 = 2;

/// Lengths of the leading and trailing hard clips. A single-operation CIGAR only has a
/// leading operation.
fn terminal_hard_clips(ops: &[Op]) -> (usize, usize) {
    let hard =
        |op: Option<&Op>| op.filter(|op| op.kind() == Kind::HardClip).map_or(0, |op| op.len());
    let leading = hard(ops.first());
    let trailing = if ops.len() > 1 { hard(ops.last()) } else { 0 };
    (leading, trailing)
}

/// `original` placed after `leading` filler values, padded with filler to `total`.
fn pad(original: &[u8], leading: usize, total: usize, filler: u8) -> Vec<u8> {
    let mut padded = vec![filler; total];
    let n = original.len().min(total - leading);
    padded[leading..leading + n].copy_from_slice(&original[..n]);
    padded
}

/// Replaces terminal hard clips with soft clips, restoring filler bases and qualities.
///
/// Returns `true` when the record was modified. Unmapped records and records without
/// terminal hard clips are left unchanged.
pub fn replace_hard_with_soft_clips(record: &mut RecordBuf) -> bool {
    if record.flags().is_unmapped() {
        return false;
    }
    let (leading, trailing) = terminal_hard_clips(record.cigar().as_ref());
    if leading == 0 && trailing == 0 {
        return false;
    }

    let total = record.sequence().len() + leading + trailing;
    let bases = pad(record.sequence().as_ref(), leading, total, FILLER_BASE);
    let quals = pad(record.quality_scores().as_ref(), leading, total, FILLER_QUALITY);
    *record.sequence_mut() = Sequence::from(bases);
    *record.quality_scores_mut() = QualityScores::from(quals);

    let ops = record.cigar_mut().as_mut();
    if leading > 0 {
        ops[0] = Op::new(Kind::SoftClip, leading);
    }
    if trailing > 0 {
        let last = ops.len() - 1;
        ops[last] = Op::new(Kind::SoftClip, trailing);
    }
    true
}
