// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! End-to-end searches on small widths, where the optimal networks are
//! known exactly and runs take milliseconds.

mod common;

use common::sorts_all_binary;
use sortnet_search::config::{Config, SearchParams};
use sortnet_search::engine;
use sortnet_search::Comparator;
use std::sync::atomic::AtomicBool;

fn run(params: SearchParams) -> engine::RunSummary {
    let config = Config::new(params).unwrap();
    let stop = AtomicBool::new(false);
    engine::run_auto(&config, &stop)
}

#[test]
fn test_two_wires_single_comparator() {
    let summary = run(SearchParams {
        net_size: 2,
        max_beam_size: 1,
        scoring_tests: 1,
        seed: Some(2),
        ..SearchParams::default()
    });

    assert_eq!(summary.iterations, 1);
    let result = &summary.results[0];
    assert_eq!(result.length, 1);
    assert_eq!(result.depth, 1);
    assert_eq!(result.ops, vec![Comparator::new(0, 1)]);
}

#[test]
fn test_three_wires_optimal_length() {
    let summary = run(SearchParams {
        net_size: 3,
        max_beam_size: 4,
        scoring_tests: 3,
        seed: Some(3),
        ..SearchParams::default()
    });

    let result = &summary.results[0];
    assert!(sorts_all_binary(&result.ops, 3));
    assert!(result.length <= 3);
}

#[test]
fn test_four_wires_optimal_length_and_depth() {
    let summary = run(SearchParams {
        net_size: 4,
        max_beam_size: 16,
        scoring_tests: 5,
        seed: Some(4),
        ..SearchParams::default()
    });

    let result = &summary.results[0];
    assert!(sorts_all_binary(&result.ops, 4));
    assert!(result.length <= 5);
    assert!(result.depth <= 3);
}

#[test]
fn test_repeated_restarts_all_sort() {
    let summary = run(SearchParams {
        net_size: 5,
        max_beam_size: 8,
        scoring_tests: 3,
        max_iterations: 4,
        seed: Some(5),
        ..SearchParams::default()
    });

    assert!(summary.iterations >= 1);
    assert_eq!(summary.results.len(), summary.iterations);
    for result in &summary.results {
        assert!(sorts_all_binary(&result.ops, 5));
        assert!(result.length >= 9, "below the proven optimum for n=5");
    }
}
