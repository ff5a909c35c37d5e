// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Canonical form and canonical hash of an operation sequence.
//!
//! The canonical form is produced in two steps:
//!
//! 1. **Relabel.** Wires are renamed 0..n-1 greedily by structural
//!    priority: highest degree, then highest sum of neighbor degrees, then
//!    smallest original index. After each assignment the still-unassigned
//!    neighbors lose the assigned wire's degree from their neighbor sum.
//! 2. **Layer sort.** The sequence is partitioned into greedy layers
//!    (maximal runs of comparators with pairwise disjoint wires) and each
//!    layer is sorted lexicographically.
//!
//! The hash is FNV-1a 64 over the canonical wire pairs. For printing a
//! finished network the relabeling instead uses standard-form untangling,
//! which keeps the sorting property intact (a bare relabel-and-swap need
//! not); the hash deliberately stays with the plain swap so that mirrored
//! structures collapse together.

use crate::network::Comparator;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the byte stream lo1, hi1, lo2, hi2, ...
fn fnv1a(ops: &[Comparator]) -> u64 {
    let mut hash = FNV_OFFSET;
    for op in ops {
        hash ^= op.lo() as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        hash ^= op.hi() as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Comparators touching each wire.
fn wire_degrees(ops: &[Comparator], n: usize) -> Vec<u32> {
    let mut degrees = vec![0u32; n];
    for op in ops {
        degrees[op.lo()] += 1;
        degrees[op.hi()] += 1;
    }
    degrees
}

/// For each wire, the sum over its comparators of the partner's degree.
fn neighbor_sums(ops: &[Comparator], degrees: &[u32]) -> Vec<i64> {
    let mut sums = vec![0i64; degrees.len()];
    for op in ops {
        sums[op.lo()] += i64::from(degrees[op.hi()]);
        sums[op.hi()] += i64::from(degrees[op.lo()]);
    }
    sums
}

/// Greedy canonical labeling: `mapping[w]` is the new label of wire `w`.
pub(crate) fn canonical_mapping(ops: &[Comparator], n: usize) -> Vec<u8> {
    let degrees = wire_degrees(ops, n);
    let mut sums = neighbor_sums(ops, &degrees);
    let mut mapping = vec![0u8; n];
    let mut assigned = vec![false; n];

    for new_label in 0..n {
        let mut best: Option<usize> = None;
        for wire in 0..n {
            if assigned[wire] {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => {
                    (degrees[wire], sums[wire]) > (degrees[current], sums[current])
                }
            };
            if better {
                best = Some(wire);
            }
        }
        let best = best.expect("fewer unassigned wires than labels");

        mapping[best] = new_label as u8;
        assigned[best] = true;

        // The assigned wire no longer contributes to its neighbors' pull.
        for op in ops {
            if op.lo() == best && !assigned[op.hi()] {
                sums[op.hi()] -= i64::from(degrees[best]);
            } else if op.hi() == best && !assigned[op.lo()] {
                sums[op.lo()] -= i64::from(degrees[best]);
            }
        }
    }

    mapping
}

/// Relabel every comparator, swapping each pair back into lo < hi order.
fn apply_mapping(ops: &mut [Comparator], mapping: &[u8]) {
    for op in ops.iter_mut() {
        let a = mapping[op.lo()];
        let b = mapping[op.hi()];
        *op = if a < b {
            Comparator::new(a, b)
        } else {
            Comparator::new(b, a)
        };
    }
}

/// Relabel into standard form without losing the sorting property: when a
/// mapped pair inverts, the two labels are exchanged for the remainder of
/// the sequence (Floyd's untangling). A bare swap of an inverted pair
/// changes what the network computes; with untangling, a sequence that
/// sorted before relabeling still sorts, because a standard network fixes
/// already-sorted inputs and that forces the accumulated exchanges to
/// cancel the relabeling exactly.
pub(crate) fn relabel_untangled(ops: &[Comparator], mapping: &[u8]) -> Vec<Comparator> {
    let mut labels = mapping.to_vec();
    ops.iter()
        .map(|op| {
            let a = labels[op.lo()];
            let b = labels[op.hi()];
            if a < b {
                Comparator::new(a, b)
            } else {
                for label in labels.iter_mut() {
                    if *label == a {
                        *label = b;
                    } else if *label == b {
                        *label = a;
                    }
                }
                Comparator::new(b, a)
            }
        })
        .collect()
}

/// Sort comparators lexicographically inside each greedy layer. A layer is
/// a maximal run in which all wires are distinct; a comparator reusing a
/// wire of the open layer starts the next one.
fn sort_within_layers(ops: &mut [Comparator], n: usize) {
    let mut used = vec![false; n];
    let mut start = 0;

    for idx in 0..ops.len() {
        if used[ops[idx].lo()] || used[ops[idx].hi()] {
            ops[start..idx].sort_unstable();
            used.fill(false);
            start = idx;
        }
        used[ops[idx].lo()] = true;
        used[ops[idx].hi()] = true;
    }
    let len = ops.len();
    ops[start..len].sort_unstable();
}

/// Canonicalize in place: greedy relabeling followed by intra-layer sort.
/// This is the dedup form; it does not in general preserve the computed
/// function (see [`normalize_for_report`]).
pub fn canonical_normalize(ops: &mut [Comparator], n: usize) {
    if ops.is_empty() {
        return;
    }
    let mapping = canonical_mapping(ops, n);
    apply_mapping(ops, &mapping);
    sort_within_layers(ops, n);
}

/// Canonical 64-bit fingerprint, equal for relabeled and intra-layer
/// reordered renditions of the same structure.
pub fn canonical_hash(ops: &[Comparator], n: usize) -> u64 {
    if ops.is_empty() {
        return 0;
    }
    let mut normalized = ops.to_vec();
    canonical_normalize(&mut normalized, n);
    fnv1a(&normalized)
}

/// Canonically relabeled rendition of a finished network that still
/// sorts, for reporting. The untangled sequence is depth-minimized again
/// (label exchanges can shift greedy layer boundaries) before the layer
/// sort, so the reported depth is read straight off the printed order.
pub fn normalize_for_report(ops: &[Comparator], n: usize) -> Vec<Comparator> {
    if ops.is_empty() {
        return Vec::new();
    }
    let mapping = canonical_mapping(ops, n);
    let mut normalized = relabel_untangled(ops, &mapping);
    crate::network::minimize_depth(&mut normalized, n);
    sort_within_layers(&mut normalized, n);
    normalized
}
