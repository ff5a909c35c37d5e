// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Parallel depth of a network, and the greedy depth minimizer.
//!
//! Two comparators that share no wire commute, so a completed sequence can
//! be reordered without changing what it computes. The minimizer repeatedly
//! pulls later, independent comparators forward into the currently open
//! layer; `depth_of` then counts layers with a single left-to-right pass.

use crate::network::Comparator;

/// Number of parallel layers of `ops`, read left to right.
///
/// A new layer starts whenever the next comparator reuses a wire already
/// occupied in the open layer. Returns 0 for an empty sequence.
pub fn depth_of(ops: &[Comparator], n: usize) -> usize {
    if ops.is_empty() {
        return 0;
    }

    let mut used = vec![false; n];
    let mut layers = 1;

    for op in ops {
        if used[op.lo()] || used[op.hi()] {
            used.fill(false);
            layers += 1;
        }
        used[op.lo()] = true;
        used[op.hi()] = true;
    }

    layers
}

/// Greedily reorder `ops` in place to reduce parallel depth.
///
/// Scanning left to right with the wires of the open layer in `layer`:
/// when `ops[l1]` collides with the open layer, search forward for the
/// earliest later comparator that is independent of the open layer and of
/// every comparator between the two positions, and swap it into `l1`. The
/// inter-position check makes the swap order-preserving for every pair of
/// comparators that share a wire, so the computed function is unchanged.
/// Passes repeat until no swap fires.
pub fn minimize_depth(ops: &mut [Comparator], n: usize) {
    let mut layer = vec![false; n];
    let mut between = vec![false; n];

    let mut altered = true;
    while altered {
        altered = false;
        layer.fill(false);

        let mut l1 = 0;
        while l1 < ops.len() {
            if layer[ops[l1].lo()] || layer[ops[l1].hi()] {
                between.fill(false);

                let mut l2 = l1;
                while l2 < ops.len() {
                    if between[ops[l2].lo()] || between[ops[l2].hi()] {
                        break;
                    }

                    if !layer[ops[l2].lo()] && !layer[ops[l2].hi()] {
                        layer[ops[l2].lo()] = true;
                        layer[ops[l2].hi()] = true;
                        ops.swap(l1, l2);

                        // Restart the forward scan just past the extended
                        // layer; everything between has been re-examined.
                        l2 = l1 + 1;
                        l1 += 1;
                        between.fill(false);
                        altered = true;
                        continue;
                    }

                    between[ops[l2].lo()] = true;
                    between[ops[l2].hi()] = true;
                    l2 += 1;
                }

                layer.fill(false);
            }

            layer[ops[l1].lo()] = true;
            layer[ops[l1].hi()] = true;
            l1 += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn ops(pairs: &[(u8, u8)]) -> Vec<Comparator> {
        pairs.iter().map(|&(a, b)| Comparator::new(a, b)).collect()
    }

    /// Apply a comparator sequence to an integer vector.
    fn apply(seq: &[Comparator], values: &mut [u32]) {
        for op in seq {
            if values[op.lo()] > values[op.hi()] {
                values.swap(op.lo(), op.hi());
            }
        }
    }

    #[test]
    fn test_depth_counts_layers() {
        assert_eq!(depth_of(&[], 4), 0);
        assert_eq!(depth_of(&ops(&[(0, 1)]), 2), 1);
        // (0,1),(2,3) are independent; (0,2) opens a second layer.
        assert_eq!(depth_of(&ops(&[(0, 1), (2, 3), (0, 2)]), 4), 2);
        // A serialized version of the same set.
        assert_eq!(depth_of(&ops(&[(0, 1), (0, 2), (2, 3)]), 4), 3);
    }

    #[test]
    fn test_minimize_pulls_independent_ops_forward() {
        // (2,3) is independent of (0,1) and can join its layer.
        let mut seq = ops(&[(0, 1), (0, 2), (2, 3)]);
        minimize_depth(&mut seq, 4);
        assert_eq!(depth_of(&seq, 4), 2);
    }

    #[test]
    fn test_minimize_on_optimal_net_is_stable() {
        // The classic 5-comparator 4-sorter already at depth 3.
        let mut seq = ops(&[(0, 1), (2, 3), (0, 2), (1, 3), (1, 2)]);
        let before = seq.clone();
        minimize_depth(&mut seq, 4);
        assert_eq!(depth_of(&seq, 4), 3);
        // Already optimal layering, so nothing moves.
        assert_eq!(seq, before);
    }

    #[test]
    fn test_minimize_never_increases_depth_and_preserves_function() {
        let mut rng = SmallRng::seed_from_u64(0x5EED);
        let n = 6;

        for _ in 0..200 {
            let len = rng.gen_range(1..20);
            let seq: Vec<Comparator> = (0..len)
                .map(|_| {
                    let a = rng.gen_range(0..n as u8 - 1);
                    let b = rng.gen_range(a + 1..n as u8);
                    Comparator::new(a, b)
                })
                .collect();

            let mut reordered = seq.clone();
            minimize_depth(&mut reordered, n);
            assert!(depth_of(&reordered, n) <= depth_of(&seq, n));

            // The reordering commutes only independent comparators, so both
            // sequences compute the same function on arbitrary inputs.
            for _ in 0..20 {
                let input: Vec<u32> = (0..n).map(|_| rng.gen_range(0..100)).collect();
                let mut a = input.clone();
                let mut b = input;
                apply(&seq, &mut a);
                apply(&reordered, &mut b);
                assert_eq!(a, b);
            }
        }
    }
}
