// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Precomputed pattern tables.
//!
//! For an n-wire network there are 2^n binary input patterns. The tables
//! record, for every pattern, whether it is already sorted and which
//! comparators would change it. They are built once at startup from the
//! configuration and shared read-only by every worker; nothing here is
//! mutated during search.

use crate::config::Config;
use crate::network::Comparator;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed of the Zobrist value stream. Fixed so that fingerprints are
/// comparable across runs.
const ZOBRIST_SEED: u64 = 0xDEAD_BEEF;

/// Immutable per-pattern lookup tables.
pub struct LookupTables {
    n: usize,
    sorted: Vec<bool>,
    allowed: Vec<Vec<Comparator>>,
    zobrist: Option<Vec<u64>>,
}

impl LookupTables {
    /// Build the tables for the configured network size.
    ///
    /// Construction is deterministic: the Zobrist values, when enabled,
    /// come from a fixed-seed ChaCha8 stream.
    pub fn build(config: &Config) -> Self {
        let n = config.net_size();
        let num_patterns = config.num_input_patterns();

        let sorted: Vec<bool> = (0..num_patterns).map(|p| is_sorted_pattern(p, n)).collect();

        // A comparator (i, j) changes pattern p exactly when bit i is 0 and
        // bit j is 1; those pairs are enumerated once per pattern.
        let allowed: Vec<Vec<Comparator>> = (0..num_patterns)
            .map(|p| {
                let mut ops = Vec::new();
                for i in 0..n - 1 {
                    for j in i + 1..n {
                        if (p >> i) & 1 == 0 && (p >> j) & 1 == 1 {
                            ops.push(Comparator::new(i as u8, j as u8));
                        }
                    }
                }
                ops
            })
            .collect();

        let zobrist = config.use_zobrist().then(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(ZOBRIST_SEED);
            (0..num_patterns).map(|_| rng.gen::<u64>()).collect()
        });

        Self {
            n,
            sorted,
            allowed,
            zobrist,
        }
    }

    /// Network size the tables were built for.
    #[inline]
    pub fn net_size(&self) -> usize {
        self.n
    }

    /// Number of patterns covered (2^n).
    #[inline]
    pub fn num_patterns(&self) -> usize {
        self.sorted.len()
    }

    /// True if `pattern` is already sorted (of the form 1^a 0^b from the
    /// least significant bit up).
    #[inline]
    pub fn is_sorted(&self, pattern: usize) -> bool {
        self.sorted[pattern]
    }

    /// The comparators that would change `pattern`.
    #[inline]
    pub fn allowed_ops(&self, pattern: usize) -> &[Comparator] {
        &self.allowed[pattern]
    }

    /// Zobrist value of `pattern`, or 0 when the table is disabled.
    #[inline]
    pub fn zobrist(&self, pattern: usize) -> u64 {
        match &self.zobrist {
            Some(values) => values[pattern],
            None => 0,
        }
    }

    /// Whether Zobrist values were built.
    #[inline]
    pub fn has_zobrist(&self) -> bool {
        self.zobrist.is_some()
    }
}

/// A pattern is sorted when no 0-bit is followed by a 1-bit, reading from
/// bit 0 upward.
fn is_sorted_pattern(p: usize, n: usize) -> bool {
    for i in 0..n - 1 {
        if (p >> i) & 1 == 0 && (p >> (i + 1)) & 1 == 1 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SearchParams};

    fn tables_for(n: usize, zobrist: bool) -> LookupTables {
        let config = Config::new(SearchParams {
            net_size: n,
            zobrist,
            ..SearchParams::default()
        })
        .unwrap();
        LookupTables::build(&config)
    }

    /// Reference predicate: sorted patterns are exactly 1^a 0^(n-a).
    fn reference_sorted(p: usize, n: usize) -> bool {
        (0..=n).any(|a| p == (1usize << a) - 1)
    }

    #[test]
    fn test_sorted_patterns_exhaustive() {
        for n in 2..=12 {
            let tables = tables_for(n, false);
            let mut count = 0;
            for p in 0..tables.num_patterns() {
                assert_eq!(tables.is_sorted(p), reference_sorted(p, n), "n={n} p={p}");
                if tables.is_sorted(p) {
                    count += 1;
                }
            }
            // Exactly n+1 sorted patterns: one per number of set bits.
            assert_eq!(count, n + 1);
        }
    }

    #[test]
    fn test_allowed_ops_exhaustive() {
        for n in 2..=10 {
            let tables = tables_for(n, false);
            for p in 0..tables.num_patterns() {
                let ops = tables.allowed_ops(p);
                // Every listed pair changes the pattern.
                for op in ops {
                    assert_eq!((p >> op.lo()) & 1, 0);
                    assert_eq!((p >> op.hi()) & 1, 1);
                }
                // And the list is complete.
                let expected: usize = (0..n - 1)
                    .map(|i| {
                        (i + 1..n)
                            .filter(|&j| (p >> i) & 1 == 0 && (p >> j) & 1 == 1)
                            .count()
                    })
                    .sum();
                assert_eq!(ops.len(), expected);
                // A sorted pattern admits no changing comparator.
                assert_eq!(tables.is_sorted(p), ops.is_empty());
            }
        }
    }

    #[test]
    fn test_zobrist_is_deterministic() {
        let a = tables_for(6, true);
        let b = tables_for(6, true);
        for p in 0..a.num_patterns() {
            assert_eq!(a.zobrist(p), b.zobrist(p));
        }
        assert!(a.has_zobrist());

        let off = tables_for(6, false);
        assert!(!off.has_zobrist());
        assert_eq!(off.zobrist(5), 0);
    }
}
