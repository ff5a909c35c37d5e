// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Mutable search state.
//!
//! This module contains the knowledge-state machine tracked during search:
//! - [`KnowledgeState`] - which binary input patterns a partial network has
//!   not yet sorted, maintained as an intrusive linked list over 2^n slots
//! - [`SuccessorMask`] - the set of comparators that would still change at
//!   least one unsorted pattern
//! - [`scoring`] - Monte-Carlo completion of a partial network, used to
//!   rank beam candidates
//!
//! The lookup tables (the immutable tier) are built once in [`crate::lookup`]
//! and shared read-only; every worker owns one reusable `KnowledgeState`
//! plus a second scratch state for rollouts.

pub mod knowledge;
pub mod scoring;

pub use knowledge::{KnowledgeState, SuccessorMask};
pub use scoring::{run_rollouts, score_state, SampleSet};
