// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Restart orchestrator.
//!
//! Runs independent beam searches until the iteration budget is spent, a
//! result strictly beats the best known length or depth bound, or the
//! external stop flag fires. The flag is polled between iterations only;
//! an in-progress level always completes, which keeps the beam buffers
//! consistent on SIGINT. All reporting is best-effort: stdout failures
//! are ignored.

use crate::config::{Config, PatternWidth};
use crate::engine::beam::BeamSearch;
use crate::lookup::LookupTables;
use crate::network::{depth_of, minimize_depth, Comparator, Pattern};
use crate::symmetry::normalize_for_report;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// One finished network, in its reported (canonically relabeled,
/// depth-minimized, layer-sorted) form.
#[derive(Debug, Clone)]
pub struct NetworkResult {
    pub ops: Vec<Comparator>,
    pub length: usize,
    pub depth: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Iterations that completed (including one cut short by the bound
    /// check).
    pub iterations: usize,
    pub elapsed_seconds: f64,
    /// One result per completed iteration.
    pub results: Vec<NetworkResult>,
}

/// Run up to `max_iterations` independent searches for the configured
/// width, reporting each result as it lands.
pub fn run<P: Pattern>(config: &Config, stop: &AtomicBool) -> RunSummary {
    let n = config.net_size();
    let tables = LookupTables::build(config);
    let start = Instant::now();
    let mut out = io::stdout();

    let _ = write!(out, "{config}");
    let _ = writeln!(out);

    let mut results = Vec::new();
    let mut iterations = 0;

    while iterations < config.max_iterations() && !stop.load(Ordering::SeqCst) {
        let _ = writeln!(out, "Iteration {}:", iterations + 1);
        let _ = out.flush();

        let mut driver = BeamSearch::<P>::new(config, &tables);
        let mut ops = driver.search();
        minimize_depth(&mut ops, n);

        let report = normalize_for_report(&ops, n);
        let length = report.len();
        let depth = depth_of(&report, n);

        for (position, op) in report.iter().enumerate() {
            let _ = writeln!(out, "+{}:{}", position + 1, op);
        }
        let _ = writeln!(out, "+Length: {length}");
        let _ = writeln!(out, "+Depth : {depth}");
        let _ = writeln!(out);

        results.push(NetworkResult {
            ops: report,
            length,
            depth,
        });
        iterations += 1;

        // Strictly better than the published bounds: stop searching.
        if length < config.length_lower_bound() || depth < config.depth_lower_bound() {
            break;
        }
    }

    let elapsed_seconds = start.elapsed().as_secs_f64();
    let _ = writeln!(out, "Total Iterations  : {iterations}");
    let _ = writeln!(out, "Total Time        : {elapsed_seconds:.3} seconds");
    let _ = out.flush();

    RunSummary {
        iterations,
        elapsed_seconds,
        results,
    }
}

/// Dispatch on the narrowest pattern storage for the configured width.
pub fn run_auto(config: &Config, stop: &AtomicBool) -> RunSummary {
    match config.pattern_width() {
        PatternWidth::U8 => run::<u8>(config, stop),
        PatternWidth::U16 => run::<u16>(config, stop),
        PatternWidth::U32 => run::<u32>(config, stop),
    }
}
