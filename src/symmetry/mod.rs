// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Isomorphism handling for partial networks.
//!
//! Two partial networks are treated as equivalent when one is the other
//! under a wire relabeling that preserves the comparator structure,
//! possibly with comparators reordered inside a parallel layer. The beam
//! driver collapses such duplicates through a canonical 64-bit hash; the
//! labeling is the greedy structural heuristic of Choi & Moon
//! ("Isomorphism, Normalization, and a Genetic Algorithm for Sorting
//! Network Optimization"), deterministic and cheap rather than a complete
//! canonicalization, so rare false merges cost only a missed exploration.

pub mod canonical;

pub use canonical::{canonical_hash, canonical_normalize, normalize_for_report};
