// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Level-synchronous beam search driver.
//!
//! The driver holds two double-buffered arrays of partial operation
//! sequences. Each level:
//!
//! 1. **Expand** (parallel): every beam entry is replayed into a reusable
//!    per-worker knowledge-state; its successor comparators are enumerated
//!    and fingerprinted with the canonical hash. An entry with no
//!    successors is a finished sorting network.
//! 2. **Dedup**: candidates are collapsed per canonical hash, first
//!    occurrence wins.
//! 3. **Score** (parallel): when more candidates survive than the beam can
//!    hold, successive halving spends rollouts on progressively fewer
//!    candidates - each round adds samples to every active candidate,
//!    re-ranks on the accumulated sets, and drops the worst half with
//!    doubled effort for the next round.
//! 4. **Select**: the best `max_beam` candidates are written into the
//!    shadow buffer and the buffers swap.
//!
//! Progress markers go to stdout as the search runs: the level index, the
//! bracketed pre/post-dedup candidate counts, and one parenthesized
//! per-round sample count per halving round.
//!
//! Worker RNGs are thread-local to the rayon tasks; with a dynamic
//! schedule this means runs are not bit-reproducible across thread counts
//! even when seeded.

use crate::config::Config;
use crate::engine::statistics::{Counters, SearchStatistics};
use crate::lookup::LookupTables;
use crate::network::{Comparator, Pattern};
use crate::state::{run_rollouts, KnowledgeState, SampleSet, SuccessorMask};
use crate::symmetry::canonical_hash;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-worker RNG source. With a base seed, worker streams are derived
/// from (seed, allocation index); otherwise each stream comes from OS
/// entropy.
pub(crate) struct SeedSource {
    base: Option<u64>,
    allocated: AtomicU64,
}

impl SeedSource {
    pub(crate) fn new(base: Option<u64>) -> Self {
        Self {
            base,
            allocated: AtomicU64::new(0),
        }
    }

    fn next_rng(&self) -> SmallRng {
        match self.base {
            Some(base) => {
                let stream = self.allocated.fetch_add(1, Ordering::Relaxed);
                SmallRng::seed_from_u64(base ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
            }
            None => SmallRng::from_entropy(),
        }
    }
}

/// Scratch owned by one worker for the lifetime of a parallel section: a
/// reusable state for replaying beam prefixes, a second state absorbing
/// rollout copies, the successor mask, and a buffer for hashing extended
/// sequences.
struct Workspace<P: Pattern> {
    state: KnowledgeState<P>,
    rollout: KnowledgeState<P>,
    mask: SuccessorMask,
    ops_buf: Vec<Comparator>,
    rng: SmallRng,
}

impl<P: Pattern> Workspace<P> {
    fn new(config: &Config, seeds: &SeedSource) -> Self {
        Self {
            state: KnowledgeState::new(config),
            rollout: KnowledgeState::new(config),
            mask: SuccessorMask::new(config.net_size()),
            ops_buf: Vec::with_capacity(config.length_upper_bound()),
            rng: seeds.next_rng(),
        }
    }

    /// Reset and replay a beam prefix into the reusable state.
    fn replay(&mut self, ops: &[Comparator], tables: &LookupTables) {
        self.state.reset(tables);
        for &op in ops {
            self.state.apply(op, tables);
        }
    }
}

/// A successor proposal: extend beam entry `beam_index` with `op`.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    beam_index: usize,
    op: Comparator,
    hash: u64,
}

/// What expanding one beam entry produced.
enum Expansion {
    /// The entry has no successors: it already sorts every pattern.
    Terminal,
    Candidates(Vec<Candidate>),
}

/// A candidate under successive halving, with its accumulated samples.
struct Evaluation {
    candidate: Candidate,
    samples: SampleSet,
    score: f64,
}

/// The beam search driver. One instance per search iteration.
pub struct BeamSearch<'a, P: Pattern> {
    config: &'a Config,
    tables: &'a LookupTables,
    beam: Vec<Vec<Comparator>>,
    shadow: Vec<Vec<Comparator>>,
    beam_len: usize,
    seeds: SeedSource,
    statistics: SearchStatistics,
    _pattern: std::marker::PhantomData<P>,
}

impl<'a, P: Pattern> BeamSearch<'a, P> {
    pub fn new(config: &'a Config, tables: &'a LookupTables) -> Self {
        let buffer = || {
            (0..config.max_beam_size())
                .map(|_| Vec::with_capacity(config.length_upper_bound()))
                .collect::<Vec<_>>()
        };
        Self {
            config,
            tables,
            beam: buffer(),
            shadow: buffer(),
            beam_len: 0,
            seeds: SeedSource::new(config.seed()),
            statistics: SearchStatistics::new(),
            _pattern: std::marker::PhantomData,
        }
    }

    /// Counters accumulated so far.
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Run the beam search from the empty network until some beam entry
    /// has no remaining successor; returns that entry's operation
    /// sequence, which sorts every binary pattern.
    pub fn search(&mut self) -> Vec<Comparator> {
        self.beam[0].clear();
        self.beam_len = 1;
        let mut out = io::stdout();

        for level in 0.. {
            // Beam entries live in buffers sized for the capacity bound;
            // overrunning it is a driver bug, not a search outcome.
            assert!(
                level <= self.config.length_upper_bound(),
                "beam level {level} exceeded the capacity bound of {}",
                self.config.length_upper_bound()
            );

            let _ = write!(out, "{level}");
            let _ = out.flush();

            // Expand every beam entry in parallel; rayon's indexed collect
            // keeps the output in beam order, so everything downstream is
            // deterministic for a fixed beam and RNG stream.
            let expansions: Vec<Expansion> = (0..self.beam_len)
                .into_par_iter()
                .map_init(
                    || Workspace::<P>::new(self.config, &self.seeds),
                    |workspace, index| self.expand_entry(workspace, index),
                )
                .collect();
            self.statistics.increment(Counters::LevelsExpanded);

            let mut terminal = None;
            let mut candidates = Vec::new();
            for (index, expansion) in expansions.into_iter().enumerate() {
                match expansion {
                    Expansion::Terminal => {
                        if terminal.is_none() {
                            terminal = Some(index);
                        }
                    }
                    Expansion::Candidates(mut chunk) => candidates.append(&mut chunk),
                }
            }

            if let Some(index) = terminal {
                let _ = writeln!(out);
                return self.beam[index].clone();
            }

            let before = candidates.len();
            let mut seen =
                FxHashSet::with_capacity_and_hasher(candidates.len(), Default::default());
            candidates.retain(|candidate| seen.insert(candidate.hash));
            let after = candidates.len();

            self.statistics
                .add(Counters::CandidatesGenerated, before as u64);
            self.statistics
                .add(Counters::CandidatesDeduplicated, (before - after) as u64);

            if before == after {
                let _ = write!(out, " [{after}]");
            } else {
                let _ = write!(out, " [{before}\u{2192}{after}]");
            }
            let _ = out.flush();

            let selected = if candidates.len() <= self.config.max_beam_size() {
                candidates
            } else {
                self.successive_halving(candidates, &mut out)
            };

            // Select: write the survivors into the shadow buffer and swap.
            self.beam_len = selected.len();
            for (slot, candidate) in selected.iter().enumerate() {
                let entry = &mut self.shadow[slot];
                entry.clear();
                entry.extend_from_slice(&self.beam[candidate.beam_index]);
                entry.push(candidate.op);
            }
            std::mem::swap(&mut self.beam, &mut self.shadow);

            let _ = write!(out, ", ");
            let _ = out.flush();
        }

        unreachable!("the capacity bound aborts before the level counter can")
    }

    /// Replay one beam entry and emit its successor candidates, or detect
    /// that it is terminal.
    fn expand_entry(&self, workspace: &mut Workspace<P>, index: usize) -> Expansion {
        let n = self.config.net_size();
        let prefix = &self.beam[index];

        workspace.replay(prefix, self.tables);
        let successors = workspace
            .state
            .successor_mask(self.tables, &mut workspace.mask);
        if successors == 0 {
            return Expansion::Terminal;
        }

        let mut candidates = Vec::with_capacity(successors);

        // Symmetry shortcut: when the previous comparator and its mirror
        // involve four distinct wires and the mirror is still a valid
        // successor, propose only the mirror.
        if self.config.use_symmetry() {
            if let Some(&last) = prefix.last() {
                let mirror = last.mirror(n);
                let distinct = !last.touches(mirror.lo()) && !last.touches(mirror.hi());
                if distinct && workspace.mask.contains(mirror) {
                    candidates.push(Candidate {
                        beam_index: index,
                        op: mirror,
                        hash: extended_hash(&mut workspace.ops_buf, prefix, mirror, n),
                    });
                    return Expansion::Candidates(candidates);
                }
            }
        }

        for op in workspace.mask.iter() {
            candidates.push(Candidate {
                beam_index: index,
                op,
                hash: extended_hash(&mut workspace.ops_buf, prefix, op, n),
            });
        }
        Expansion::Candidates(candidates)
    }

    /// Successive halving over more candidates than the beam can hold.
    ///
    /// Round samples start at ceil(base / rounds) where rounds is
    /// ceil(log2(candidates / max_beam)), and double every round; samples
    /// accumulate, so survivors are re-ranked on everything observed so
    /// far. Stops when halving again would drop below the beam size and
    /// returns the best `max_beam` candidates.
    fn successive_halving(&mut self, candidates: Vec<Candidate>, out: &mut io::Stdout) -> Vec<Candidate> {
        let max_beam = self.config.max_beam_size();
        let base_tests = self.config.scoring_tests();
        let elites = self.config.elites();
        let depth_weight = self.config.depth_weight();

        // rounds = ceil(log2(candidates / max_beam)), at least 1 here.
        let mut rounds = 0usize;
        let mut capacity = max_beam;
        while capacity < candidates.len() {
            capacity *= 2;
            rounds += 1;
        }
        let mut per_round = base_tests.div_ceil(rounds);

        let mut evaluations: Vec<Evaluation> = candidates
            .into_iter()
            .map(|candidate| Evaluation {
                candidate,
                samples: SampleSet::new(),
                score: 0.0,
            })
            .collect();
        let mut active = evaluations.len();

        while active > max_beam {
            let _ = write!(out, " ({per_round})");
            let _ = out.flush();

            let beam = &self.beam;
            let tables = self.tables;
            let config = self.config;
            let seeds = &self.seeds;
            evaluations[..active].par_iter_mut().for_each_init(
                || Workspace::<P>::new(config, seeds),
                |workspace, evaluation| {
                    workspace.replay(&beam[evaluation.candidate.beam_index], tables);
                    workspace.state.apply(evaluation.candidate.op, tables);
                    run_rollouts(
                        &workspace.state,
                        &mut workspace.rollout,
                        per_round,
                        tables,
                        &mut workspace.rng,
                        &mut evaluation.samples,
                    );
                    evaluation.score =
                        evaluation
                            .samples
                            .score(depth_weight, elites, base_tests);
                },
            );

            self.statistics.increment(Counters::HalvingRounds);
            self.statistics
                .add(Counters::RolloutsRun, (per_round * active) as u64);

            evaluations[..active].sort_by(|a, b| a.score.total_cmp(&b.score));

            let halved = active / 2;
            if halved < max_beam {
                break;
            }
            active = halved;
            per_round *= 2;
        }

        evaluations.truncate(active.min(max_beam));
        evaluations
            .into_iter()
            .map(|evaluation| evaluation.candidate)
            .collect()
    }
}

/// Canonical hash of `prefix` extended by `op`, built in a reusable
/// buffer.
fn extended_hash(buffer: &mut Vec<Comparator>, prefix: &[Comparator], op: Comparator, n: usize) -> u64 {
    buffer.clear();
    buffer.extend_from_slice(prefix);
    buffer.push(op);
    canonical_hash(buffer, n)
}
