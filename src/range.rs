//! # Range — Inclusive Integer Intervals
//!
//! A [`Range`] is parsed from the textual form `start:end` given on the
//! command line. Parsing is strict: exactly one colon, two base-10 integers
//! (a leading minus sign is accepted), and `start <= end`. Each failure
//! mode has its own [`RangeError`] variant so callers can report which part
//! of the text was wrong.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// An inclusive interval `[start, end]` with `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    start: i64,
    end: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("invalid range format")]
    InvalidFormat,
    #[error("invalid start number: {0}")]
    InvalidStart(#[source] ParseIntError),
    #[error("invalid end number: {0}")]
    InvalidEnd(#[source] ParseIntError),
    #[error("start number must be less than or equal to end number ({start} > {end})")]
    InvalidOrder { start: i64, end: i64 },
}

impl Range {
    pub fn new(start: i64, end: i64) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvalidOrder { start, end });
        }
        Ok(Range { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Ascending iterator over every value in the range.
    pub fn values(&self) -> std::ops::RangeInclusive<i64> {
        self.start..=self.end
    }
}

impl FromStr for Range {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [start, end] = parts.as_slice() else {
            return Err(RangeError::InvalidFormat);
        };
        let start = start.parse::<i64>().map_err(RangeError::InvalidStart)?;
        let end = end.parse::<i64>().map_err(RangeError::InvalidEnd)?;
        Range::new(start, end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_range() {
        let r: Range = "1:10".parse().unwrap();
        assert_eq!((r.start(), r.end()), (1, 10));
        assert_eq!(r.values().count(), 10);
    }

    #[test]
    fn single_value_range() {
        let r: Range = "5:5".parse().unwrap();
        assert_eq!(r.values().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn negative_bounds_are_accepted() {
        let r: Range = "-10:-2".parse().unwrap();
        assert_eq!((r.start(), r.end()), (-10, -2));
        let r: Range = "-3:3".parse().unwrap();
        assert_eq!(r.values().count(), 7);
    }

    #[test]
    fn wrong_part_count_is_format_error() {
        assert_eq!("5".parse::<Range>(), Err(RangeError::InvalidFormat));
        assert_eq!("5:3:1".parse::<Range>(), Err(RangeError::InvalidFormat));
        assert_eq!("".parse::<Range>(), Err(RangeError::InvalidFormat));
        assert_eq!("1-10".parse::<Range>(), Err(RangeError::InvalidFormat));
    }

    #[test]
    fn non_numeric_start_is_start_error() {
        assert!(matches!("a:10".parse::<Range>(), Err(RangeError::InvalidStart(_))));
        assert!(matches!(":10".parse::<Range>(), Err(RangeError::InvalidStart(_))));
        assert!(matches!("1.5:10".parse::<Range>(), Err(RangeError::InvalidStart(_))));
    }

    #[test]
    fn non_numeric_end_is_end_error() {
        assert!(matches!("1:b".parse::<Range>(), Err(RangeError::InvalidEnd(_))));
        assert!(matches!("1:".parse::<Range>(), Err(RangeError::InvalidEnd(_))));
        assert!(matches!("1: 10".parse::<Range>(), Err(RangeError::InvalidEnd(_))));
    }

    // Both sides bad: the start is reported first.
    #[test]
    fn start_is_checked_before_end() {
        assert!(matches!("x:y".parse::<Range>(), Err(RangeError::InvalidStart(_))));
    }

    #[test]
    fn reversed_bounds_are_order_error() {
        assert_eq!(
            "5:3".parse::<Range>(),
            Err(RangeError::InvalidOrder { start: 5, end: 3 })
        );
    }

    #[test]
    fn out_of_range_integer_is_rejected() {
        assert!(matches!(
            "99999999999999999999:1".parse::<Range>(),
            Err(RangeError::InvalidStart(_))
        ));
    }

    #[test]
    fn values_reach_i64_max_without_overflow() {
        let r = Range::new(i64::MAX - 2, i64::MAX).unwrap();
        assert_eq!(
            r.values().collect::<Vec<_>>(),
            vec![i64::MAX - 2, i64::MAX - 1, i64::MAX]
        );
    }

    #[test]
    fn display_matches_input_form() {
        let r: Range = "-7:42".parse().unwrap();
        assert_eq!(r.to_string(), "-7:42");
    }
}
