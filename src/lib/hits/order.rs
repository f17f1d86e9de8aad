//! Query-name orderings used to validate grouped input.
//!
//! The grouping iterator only needs one question answered: does a record belong strictly
//! after the one that follows it? A [`RecordOrder`] answers it by comparing two records.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use noodles::sam::alignment::record_buf::RecordBuf;

use crate::sam::record_utils::query_name;

/// A total order over records used to detect out-of-order input.
pub trait RecordOrder {
    /// Compare `a` (consumed first) with `b` (the record after it).
    fn compare(&self, a: &RecordBuf, b: &RecordBuf) -> Ordering;
}

impl<F> RecordOrder for F
where
    F: Fn(&RecordBuf, &RecordBuf) -> Ordering,
{
    fn compare(&self, a: &RecordBuf, b: &RecordBuf) -> Ordering {
        self(a, b)
    }
}

/// Byte-wise lexicographic order on query names (`samtools sort -n` with `LC_ALL=C`, Picard).
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicographicQueryname;

impl RecordOrder for LexicographicQueryname {
    fn compare(&self, a: &RecordBuf, b: &RecordBuf) -> Ordering {
        query_name(a).cmp(query_name(b))
    }
}

/// Natural order on query names where digit runs compare numerically, so `read2` < `read10`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalQueryname;

impl RecordOrder for NaturalQueryname {
    fn compare(&self, a: &RecordBuf, b: &RecordBuf) -> Ordering {
        natural_compare(query_name(a), query_name(b))
    }
}

/// Splits off the leading run of ASCII digits.
fn split_digits(bytes: &[u8]) -> (&[u8], &[u8]) {
    let end = bytes.iter().position(|b| !b.is_ascii_digit()).unwrap_or(bytes.len());
    bytes.split_at(end)
}

/// Compares two digit runs by numeric value without overflow.
fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    fn strip(run: &[u8]) -> &[u8] {
        let first = run.iter().position(|&d| d != b'0').unwrap_or(run.len());
        &run[first..]
    }
    let (a, b) = (strip(a), strip(b));
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural comparison of byte strings. Digit runs sort before other bytes at the same offset.
#[must_use]
pub fn natural_compare(mut a: &[u8], mut b: &[u8]) -> Ordering {
    loop {
        match (a.first(), b.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match (x.is_ascii_digit(), y.is_ascii_digit()) {
                (true, true) => {
                    let (run_a, rest_a) = split_digits(a);
                    let (run_b, rest_b) = split_digits(b);
                    let ord = compare_digit_runs(run_a, run_b);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    a = rest_a;
                    b = rest_b;
                }
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                (false, false) => {
                    if x != y {
                        return x.cmp(y);
                    }
                    a = &a[1..];
                    b = &b[1..];
                }
            },
        }
    }
}

/// Command-line selectable query-name order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuerynameOrder {
    /// See [`LexicographicQueryname`].
    #[default]
    Lexicographic,
    /// See [`NaturalQueryname`].
    Natural,
}

impl RecordOrder for QuerynameOrder {
    fn compare(&self, a: &RecordBuf, b: &RecordBuf) -> Ordering {
        match self {
            Self::Lexicographic => LexicographicQueryname.compare(a, b),
            Self::Natural => NaturalQueryname.compare(a, b),
        }
    }
}

impl fmt::Display for QuerynameOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexicographic => f.write_str("lexicographic"),
            Self::Natural => f.write_str("natural"),
        }
    }
}

impl FromStr for QuerynameOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lexicographic" => Ok(Self::Lexicographic),
            "natural" => Ok(Self::Natural),
            other => Err(format!("Unknown queryname order '{other}' (expected lexicographic or natural)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sam::builder::RecordBuilder;
    use rstest::rstest;

    fn named(name: &str) -> RecordBuf {
        RecordBuilder::new().name(name).build()
    }

    #[rstest]
    #[case("read2", "read10", Ordering::Less)]
    #[case("read10", "read2", Ordering::Greater)]
    #[case("read007", "read7", Ordering::Equal)]
    #[case("read010", "read9", Ordering::Greater)]
    #[case("read000", "read0", Ordering::Equal)]
    #[case("a1b2", "a1b10", Ordering::Less)]
    #[case("abc", "abd", Ordering::Less)]
    #[case("ab", "abc", Ordering::Less)]
    #[case("1a", "a1", Ordering::Less)]
    #[case("r99999999999999999999999", "r100000000000000000000000", Ordering::Less)]
    fn test_natural_compare(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(natural_compare(a.as_bytes(), b.as_bytes()), expected);
    }

    #[test]
    fn test_lexicographic_vs_natural() {
        let (r2, r10) = (named("read2"), named("read10"));
        assert_eq!(LexicographicQueryname.compare(&r2, &r10), Ordering::Greater);
        assert_eq!(NaturalQueryname.compare(&r2, &r10), Ordering::Less);
    }

    #[test]
    fn test_closure_is_an_order() {
        let reversed = |a: &RecordBuf, b: &RecordBuf| query_name(b).cmp(query_name(a));
        assert_eq!(reversed.compare(&named("A"), &named("B")), Ordering::Greater);
    }

    #[test]
    fn test_queryname_order_from_str() {
        assert_eq!("Natural".parse::<QuerynameOrder>().unwrap(), QuerynameOrder::Natural);
        assert_eq!(
            "lexicographic".parse::<QuerynameOrder>().unwrap(),
            QuerynameOrder::Lexicographic
        );
        assert!("coordinate".parse::<QuerynameOrder>().is_err());
        assert_eq!(QuerynameOrder::Natural.to_string(), "natural");
    }
}
