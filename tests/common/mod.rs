//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;

/// Parse an output file into its lines as integers, in file order.
/// Panics on any line that is not a decimal integer.
pub fn read_primes(path: &Path) -> Vec<i64> {
    let text = std::fs::read_to_string(path).expect("output file readable");
    assert!(
        text.is_empty() || text.ends_with('\n'),
        "output must be newline-terminated: {:?}",
        text
    );
    text.lines()
        .map(|line| {
            line.parse::<i64>()
                .unwrap_or_else(|_| panic!("malformed line {:?}", line))
        })
        .collect()
}

/// Reference prime set for `[lo, hi]` by integer-only trial division.
pub fn reference_primes(lo: i64, hi: i64) -> BTreeSet<i64> {
    (lo..=hi)
        .filter(|&n| n > 1 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0))
        .collect()
}
