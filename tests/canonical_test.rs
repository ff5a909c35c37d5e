// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Canonical-hash laws on real search output: idempotence, invariance
//! under intra-layer reordering, and separation of distinct structures.

mod common;

use common::sorts_all_binary;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sortnet_search::config::{Config, SearchParams};
use sortnet_search::engine;
use sortnet_search::symmetry::{canonical_hash, canonical_normalize, normalize_for_report};
use sortnet_search::Comparator;
use std::sync::atomic::AtomicBool;

/// Shuffle comparators within each greedy layer (maximal run of
/// wire-disjoint comparators).
fn shuffle_within_layers(ops: &[Comparator], n: usize, rng: &mut SmallRng) -> Vec<Comparator> {
    let mut out = ops.to_vec();
    let mut used = vec![false; n];
    let mut start = 0;
    for idx in 0..out.len() {
        if used[out[idx].lo()] || used[out[idx].hi()] {
            out[start..idx].shuffle(rng);
            used.fill(false);
            start = idx;
        }
        used[out[idx].lo()] = true;
        used[out[idx].hi()] = true;
    }
    let len = out.len();
    out[start..len].shuffle(rng);
    out
}

fn searched_network(n: usize, beam: usize, seed: u64) -> Vec<Comparator> {
    let config = Config::new(SearchParams {
        net_size: n,
        max_beam_size: beam,
        scoring_tests: 5,
        seed: Some(seed),
        ..SearchParams::default()
    })
    .unwrap();
    let stop = AtomicBool::new(false);
    let summary = engine::run_auto(&config, &stop);
    summary.results[0].ops.clone()
}

#[test]
fn test_search_output_hash_is_idempotent_and_shuffle_invariant() {
    let ops = searched_network(8, 100, 0xE5E5);
    let n = 8;
    let reference = canonical_hash(&ops, n);

    // Idempotence: normalizing the sequence does not move its hash.
    let mut normalized = ops.clone();
    canonical_normalize(&mut normalized, n);
    assert_eq!(canonical_hash(&normalized, n), reference);

    // The report form is an equivalent rendition of the same structure
    // and still sorts after its relabeling.
    let report = normalize_for_report(&ops, n);
    assert!(sorts_all_binary(&report, n));

    // Intra-layer reordering never moves the hash.
    let mut rng = SmallRng::seed_from_u64(0x5117);
    for _ in 0..20 {
        let shuffled = shuffle_within_layers(&ops, n, &mut rng);
        assert_eq!(canonical_hash(&shuffled, n), reference);
        assert!(sorts_all_binary(&shuffled, n));
    }
}

#[test]
fn test_mirror_image_collapses_to_the_same_hash() {
    // The top-bottom reflection of a network is a wire relabeling of it,
    // and is the one the symmetry heuristic banks on. The optimal 4-wire
    // network and its reflection share the canonical form
    // [(0,2),(1,3),(0,3),(1,2),(0,1)].
    let ops: Vec<Comparator> = [(0u8, 1u8), (2, 3), (0, 2), (1, 3), (1, 2)]
        .iter()
        .map(|&(a, b)| Comparator::new(a, b))
        .collect();
    let n = 4;
    let mirrored: Vec<Comparator> = ops.iter().map(|op| op.mirror(n)).collect();
    assert_ne!(mirrored, ops);
    assert_eq!(canonical_hash(&mirrored, n), canonical_hash(&ops, n));
}

#[test]
fn test_distinct_searched_networks_usually_differ_in_hash() {
    // Networks from different widths or clearly different structures must
    // not collide.
    let a = searched_network(5, 16, 1);
    let b = searched_network(6, 16, 2);

    let mut ca = a.clone();
    canonical_normalize(&mut ca, 6);
    let mut cb = b.clone();
    canonical_normalize(&mut cb, 6);
    if ca != cb {
        assert_ne!(canonical_hash(&a, 6), canonical_hash(&b, 6));
    }

    // Dropping the final comparator changes the structure.
    let truncated = &a[..a.len() - 1];
    assert_ne!(canonical_hash(truncated, 5), canonical_hash(&a, 5));
}
