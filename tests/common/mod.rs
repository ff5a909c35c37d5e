// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

// Each integration test binary compiles its own copy; not all of them use
// every helper.
#![allow(dead_code)]

use sortnet_search::Comparator;

/// Apply a comparator sequence to a vector of values.
pub fn apply_network(ops: &[Comparator], values: &mut [u32]) {
    for op in ops {
        if values[op.lo()] > values[op.hi()] {
            values.swap(op.lo(), op.hi());
        }
    }
}

/// True if `ops` sorts every binary pattern of width n (and so, by the
/// 0/1 principle, every input).
pub fn sorts_all_binary(ops: &[Comparator], n: usize) -> bool {
    (0..1usize << n).all(|pattern| {
        let mut values: Vec<u32> = (0..n).map(|w| (pattern >> w) as u32 & 1).collect();
        apply_network(ops, &mut values);
        values.windows(2).all(|pair| pair[0] <= pair[1])
    })
}

/// True if `ops` sorts this particular integer input.
pub fn sorts_input(ops: &[Comparator], input: &[u32]) -> bool {
    let mut values = input.to_vec();
    apply_network(ops, &mut values);
    values.windows(2).all(|pair| pair[0] <= pair[1])
}
