// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The 0/1 knowledge-state of a partial network.
//!
//! By the 0/1 principle a network sorts every input exactly when it sorts
//! every binary input, so the state of a partial network is the set of
//! binary patterns its comparators have not yet driven to sorted form.
//!
//! The set is an intrusive singly-linked list inside one flat `Vec` of 2^n
//! nodes. A slot plays two roles at once:
//! - slot p's `in_list` flag records whether pattern value p is currently
//!   in the unsorted set, giving O(1) membership tests by value;
//! - a slot that is a *list node* carries the pattern it currently
//!   represents in `value` and its successor in `next`. When a comparator
//!   rewrites a node's pattern from v to v', the node stays at its slot
//!   (preserving the splice pointers) and only `value` changes, while the
//!   membership flags move from slot v to slot v'.
//!
//! Applying a comparator is therefore a single O(live-patterns) traversal,
//! and building a fresh state is O(2^n); workers keep one instance and
//! `reset` it between candidates instead of reallocating.

use crate::config::Config;
use crate::lookup::LookupTables;
use crate::network::{Comparator, Pattern};
use rand::Rng;
use std::fmt;

/// Sentinel terminating the intrusive list.
const END_OF_LIST: i32 = -1;

#[derive(Clone, Copy)]
struct Node<P> {
    in_list: bool,
    value: P,
    next: i32,
}

/// Which patterns a partial operation sequence leaves unsorted, plus the
/// sequence itself.
pub struct KnowledgeState<P: Pattern> {
    nodes: Vec<Node<P>>,
    first_used: i32,
    num_unsorted: usize,
    ops: Vec<Comparator>,
    zobrist_key: u64,
}

impl<P: Pattern> KnowledgeState<P> {
    /// Allocate a state for the configured network size. The state is
    /// unusable until [`reset`](Self::reset).
    pub fn new(config: &Config) -> Self {
        let num_patterns = config.num_input_patterns();
        Self {
            nodes: vec![
                Node {
                    in_list: false,
                    value: P::from_index(0),
                    next: END_OF_LIST,
                };
                num_patterns
            ],
            first_used: END_OF_LIST,
            num_unsorted: 0,
            // Sized for the beam capacity bound; random completions may
            // run longer and simply grow the vector.
            ops: Vec::with_capacity(config.length_upper_bound()),
            zobrist_key: 0,
        }
    }

    /// Re-initialize to the empty network: every non-sorted pattern joins
    /// the list. The n+1 sorted patterns (1^a 0^(n-a)) stay out, so the
    /// unsorted count starts at 2^n - (n+1).
    pub fn reset(&mut self, tables: &LookupTables) {
        self.first_used = END_OF_LIST;
        self.zobrist_key = 0;

        for p in 0..self.nodes.len() {
            if tables.is_sorted(p) {
                self.nodes[p].in_list = false;
            } else {
                self.nodes[p] = Node {
                    in_list: true,
                    value: P::from_index(p),
                    next: self.first_used,
                };
                self.first_used = p as i32;
                self.zobrist_key ^= tables.zobrist(p);
            }
        }

        self.num_unsorted = self.nodes.len() - (tables.net_size() + 1);
        self.ops.clear();
    }

    /// Apply one comparator to every unsorted pattern and append it to the
    /// operation sequence.
    ///
    /// A pattern v with bit `lo` = 0 and bit `hi` = 1 becomes
    /// v' = v with those bits exchanged. If v' is already tracked (two
    /// patterns collapsing to one image) or is sorted, the node is unlinked
    /// and the unsorted count drops; otherwise the node is relocated in
    /// place by overwriting its value.
    pub fn apply(&mut self, op: Comparator, tables: &LookupTables) {
        let (lo, hi) = (op.lo(), op.hi());
        let mut last = END_OF_LIST;
        let mut cur = self.first_used;

        while cur != END_OF_LIST {
            let slot = cur as usize;
            let next = self.nodes[slot].next;
            let v = self.nodes[slot].value.index();

            if (v >> lo) & 1 == 0 && (v >> hi) & 1 == 1 {
                // Membership of v ends before v' is published, so the
                // traversal stays consistent under in-place mutation.
                self.nodes[v].in_list = false;
                self.zobrist_key ^= tables.zobrist(v);

                let moved = (v | (1 << lo)) & !(1 << hi);

                if self.nodes[moved].in_list || tables.is_sorted(moved) {
                    // The image is already tracked or sorted: unlink.
                    self.num_unsorted -= 1;
                    if last == END_OF_LIST {
                        self.first_used = next;
                    } else {
                        self.nodes[last as usize].next = next;
                    }
                } else {
                    self.nodes[moved].in_list = true;
                    self.zobrist_key ^= tables.zobrist(moved);
                    self.nodes[slot].value = P::from_index(moved);
                    if last == END_OF_LIST {
                        self.first_used = cur;
                    } else {
                        self.nodes[last as usize].next = cur;
                    }
                    last = cur;
                }
            } else {
                last = cur;
            }

            cur = next;
        }

        self.ops.push(op);
    }

    /// One random completion step: pick an unsorted pattern uniformly, then
    /// one of the comparators that change it, and apply it.
    ///
    /// Selecting the pattern first weights comparators by how many live
    /// patterns they can touch.
    ///
    /// # Panics
    ///
    /// Panics (in debug builds) when called on a terminal state.
    pub fn random_rollout_step<R: Rng>(&mut self, tables: &LookupTables, rng: &mut R) {
        debug_assert!(self.num_unsorted > 0, "rollout step on a terminal state");

        let target = rng.gen_range(0..self.num_unsorted);
        let mut cur = self.first_used;
        for _ in 0..target {
            cur = self.nodes[cur as usize].next;
        }
        let v = self.nodes[cur as usize].value.index();

        let allowed = tables.allowed_ops(v);
        let op = allowed[rng.gen_range(0..allowed.len())];
        self.apply(op, tables);
    }

    /// Collect into `mask` every comparator that would change at least one
    /// unsorted pattern; returns how many distinct comparators were found.
    /// Zero means the state is terminal.
    pub fn successor_mask(&self, tables: &LookupTables, mask: &mut SuccessorMask) -> usize {
        mask.clear();
        let mut count = 0;

        let mut cur = self.first_used;
        while cur != END_OF_LIST {
            let v = self.nodes[cur as usize].value.index();
            for &op in tables.allowed_ops(v) {
                if mask.insert(op) {
                    count += 1;
                }
            }
            cur = self.nodes[cur as usize].next;
        }

        count
    }

    /// Number of patterns still unsorted.
    #[inline]
    pub fn num_unsorted(&self) -> usize {
        self.num_unsorted
    }

    /// True when every pattern is sorted, i.e. the sequence is a sorting
    /// network.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.num_unsorted == 0
    }

    /// Number of operations applied so far.
    #[inline]
    pub fn level(&self) -> usize {
        self.ops.len()
    }

    /// The operation sequence applied since the last reset.
    #[inline]
    pub fn ops(&self) -> &[Comparator] {
        &self.ops
    }

    /// Mutable access for in-place depth minimization of a completed
    /// sequence; reordering must only commute independent comparators.
    #[inline]
    pub(crate) fn ops_mut(&mut self) -> &mut [Comparator] {
        &mut self.ops
    }

    /// Incremental Zobrist fingerprint of the unsorted set (0 when the
    /// table is disabled).
    #[inline]
    pub fn fingerprint(&self) -> u64 {
        self.zobrist_key
    }

    /// Check the list structure against its counters and flags, for tests.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self, tables: &LookupTables) {
        let mut seen = vec![false; self.nodes.len()];
        let mut count = 0;

        let mut cur = self.first_used;
        while cur != END_OF_LIST {
            let v = self.nodes[cur as usize].value.index();
            assert!(self.nodes[v].in_list, "listed value {v} lost its flag");
            assert!(!tables.is_sorted(v), "sorted value {v} on the list");
            assert!(!seen[v], "value {v} listed twice");
            seen[v] = true;
            count += 1;
            cur = self.nodes[cur as usize].next;
        }

        assert_eq!(count, self.num_unsorted);
        assert_eq!(self.first_used == END_OF_LIST, self.num_unsorted == 0);

        for p in 0..self.nodes.len() {
            assert_eq!(self.nodes[p].in_list, seen[p], "stray flag at {p}");
        }
    }
}

impl<P: Pattern> Clone for KnowledgeState<P> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            first_used: self.first_used,
            num_unsorted: self.num_unsorted,
            ops: self.ops.clone(),
            zobrist_key: self.zobrist_key,
        }
    }

    /// Value-copy that reuses the destination's allocations; rollouts call
    /// this once per sample, so it must not reallocate the 2^n-entry vector.
    fn clone_from(&mut self, source: &Self) {
        self.nodes.clone_from(&source.nodes);
        self.ops.clone_from(&source.ops);
        self.first_used = source.first_used;
        self.num_unsorted = source.num_unsorted;
        self.zobrist_key = source.zobrist_key;
    }
}

impl<P: Pattern> fmt::Debug for KnowledgeState<P> {
    /// Compact dump: counters plus the head of the unsorted list.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KnowledgeState {{ level: {}, unsorted: {}, head: [",
            self.ops.len(),
            self.num_unsorted
        )?;
        let mut cur = self.first_used;
        let mut shown = 0;
        while cur != END_OF_LIST && shown < 8 {
            if shown > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.nodes[cur as usize].value.index())?;
            cur = self.nodes[cur as usize].next;
            shown += 1;
        }
        if cur != END_OF_LIST {
            write!(f, ", ..")?;
        }
        write!(f, "] }}")
    }
}

/// The set of comparators valid from some state, as an n x n upper
/// triangle of cells. Workers keep one instance and clear it per beam
/// entry.
pub struct SuccessorMask {
    n: usize,
    cells: Vec<bool>,
}

impl SuccessorMask {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![false; n * n],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Mark `op`; returns true if it was newly set.
    fn insert(&mut self, op: Comparator) -> bool {
        let cell = &mut self.cells[op.lo() * self.n + op.hi()];
        let fresh = !*cell;
        *cell = true;
        fresh
    }

    /// True if `op` is a valid successor.
    #[inline]
    pub fn contains(&self, op: Comparator) -> bool {
        self.cells[op.lo() * self.n + op.hi()]
    }

    /// Set comparators in deterministic (lo, hi) lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = Comparator> + '_ {
        let n = self.n;
        (0..n - 1)
            .flat_map(move |i| (i + 1..n).map(move |j| Comparator::new(i as u8, j as u8)))
            .filter(move |&op| self.contains(op))
    }
}
