// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Monte-Carlo scoring of partial networks.
//!
//! A candidate is scored by completing it with random rollout steps until
//! every pattern is sorted, depth-minimizing the completion, and recording
//! its (length, depth). Samples accumulate in a [`SampleSet`] so that the
//! successive-halving driver can buy more precision for surviving
//! candidates round by round; ranking uses the mean over the best
//! ("elite") samples, with the elite count growing in proportion to the
//! accumulated sample count. Lower scores are better.

use crate::lookup::LookupTables;
use crate::network::{depth_of, minimize_depth, Pattern};
use crate::state::KnowledgeState;
use rand::Rng;

/// Accumulated rollout outcomes for one candidate.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    samples: Vec<(u32, u32)>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn record(&mut self, length: usize, depth: usize) {
        self.samples.push((length as u32, depth as u32));
    }

    /// Elite-mean score over the accumulated samples.
    ///
    /// Samples are ranked lexicographically by (length, depth) when
    /// `depth_weight < 0.5` and by (depth, length) otherwise; the best
    /// `elites`-per-`base_tests` fraction (at least one sample) is averaged
    /// into mean length and mean depth, and the score blends the two:
    /// `(1 - w) * mean_length + w * mean_depth`.
    ///
    /// # Panics
    ///
    /// Panics (in debug builds) when no samples have been recorded.
    pub fn score(&mut self, depth_weight: f64, elites: usize, base_tests: usize) -> f64 {
        debug_assert!(!self.samples.is_empty(), "scoring an empty sample set");

        if depth_weight < 0.5 {
            self.samples.sort_unstable();
        } else {
            self.samples.sort_unstable_by_key(|&(len, depth)| (depth, len));
        }

        let elite_count = (elites * self.samples.len())
            .div_ceil(base_tests)
            .clamp(1, self.samples.len());

        let mut total_length = 0u64;
        let mut total_depth = 0u64;
        for &(len, depth) in &self.samples[..elite_count] {
            total_length += u64::from(len);
            total_depth += u64::from(depth);
        }
        let mean_length = total_length as f64 / elite_count as f64;
        let mean_depth = total_depth as f64 / elite_count as f64;

        (1.0 - depth_weight) * mean_length + depth_weight * mean_depth
    }
}

/// Run `count` random completions of `base`, recording (length, depth) of
/// each depth-minimized completion into `samples`.
///
/// `scratch` is a worker-owned state reused across rollouts; its buffers
/// absorb the per-sample value copy of `base`.
pub fn run_rollouts<P: Pattern, R: Rng>(
    base: &KnowledgeState<P>,
    scratch: &mut KnowledgeState<P>,
    count: usize,
    tables: &LookupTables,
    rng: &mut R,
    samples: &mut SampleSet,
) {
    let n = tables.net_size();

    for _ in 0..count {
        scratch.clone_from(base);
        while !scratch.is_terminal() {
            scratch.random_rollout_step(tables, rng);
        }

        let ops = scratch.ops_mut();
        minimize_depth(ops, n);
        samples.record(ops.len(), depth_of(ops, n));
    }
}

/// One-shot score of `state` with `tests` fresh rollouts.
pub fn score_state<P: Pattern, R: Rng>(
    state: &KnowledgeState<P>,
    scratch: &mut KnowledgeState<P>,
    tables: &LookupTables,
    rng: &mut R,
    tests: usize,
    elites: usize,
    depth_weight: f64,
) -> f64 {
    let mut samples = SampleSet::new();
    run_rollouts(state, scratch, tests, tables, rng, &mut samples);
    samples.score(depth_weight, elites, tests)
}
