// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Counters accumulated by the beam driver between parallel sections.
//! They feed the successive-halving budget assertions in the test suite
//! and the per-run summary.

use strum::EnumCount;
use strum_macros::EnumCount as EnumCountMacro;

#[derive(EnumCountMacro, Copy, Clone, Debug)]
#[repr(u8)]
pub enum Counters {
    /// Beam levels fully expanded (terminal levels included).
    LevelsExpanded,
    /// Candidate successors emitted before deduplication.
    CandidatesGenerated,
    /// Candidates dropped as canonical-hash duplicates.
    CandidatesDeduplicated,
    /// Successive-halving rounds executed.
    HalvingRounds,
    /// Monte-Carlo rollouts run while scoring.
    RolloutsRun,
}

#[derive(Debug, Default)]
pub struct SearchStatistics {
    stats: [u64; Counters::COUNT],
}

impl SearchStatistics {
    pub fn new() -> Self {
        SearchStatistics::default()
    }

    /// Add `amount` to the specified counter.
    pub fn add(&mut self, counter: Counters, amount: u64) {
        self.stats[counter as usize] += amount;
    }

    /// Increment the specified counter by 1.
    pub fn increment(&mut self, counter: Counters) {
        self.add(counter, 1);
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }
}
