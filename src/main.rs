// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Command-line entry point.
//!
//! Parses flags, validates them into a [`Config`], installs the SIGINT
//! handler (first delivery requests a stop after the current iteration,
//! second forces exit 1), sizes the worker pool, and runs the search.
//! Invalid flags or values exit 1 with a diagnostic on stderr; `--help`
//! exits 0.

use clap::Parser;
use sortnet_search::config::{Config, SearchParams};
use sortnet_search::engine;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sortnet-search")]
#[command(about = "Beam search for short and shallow sorting networks")]
struct Cli {
    /// Network size (wires), 2-32. Sizes above 20 need significant
    /// memory (the engine tracks 2^n patterns).
    #[arg(short = 'n', long = "net-size", default_value_t = 8)]
    net_size: usize,

    /// Beam width: partial networks retained per level.
    #[arg(short = 'b', long = "beam-size", default_value_t = 100)]
    beam_size: usize,

    /// Monte-Carlo rollouts per candidate when scoring.
    #[arg(short = 't', long = "scoring-tests", default_value_t = 5)]
    scoring_tests: usize,

    /// Elite samples averaged into a candidate's score (at most the
    /// scoring test count).
    #[arg(short = 'e', long = "elites", default_value_t = 1)]
    elites: usize,

    /// Weight of depth against length in scores, 0.0-1.0; below 0.5
    /// prioritizes length, above prioritizes depth.
    #[arg(short = 'w', long = "depth-weight", default_value_t = 0.0001)]
    depth_weight: f64,

    /// Force the symmetry heuristic on (default: on for even sizes).
    #[arg(short = 's', long = "symmetry", conflicts_with = "no_symmetry")]
    symmetry: bool,

    /// Force the symmetry heuristic off.
    #[arg(short = 'S', long = "no-symmetry")]
    no_symmetry: bool,

    /// Build the Zobrist table and maintain state fingerprints.
    #[arg(short = 'z', long = "zobrist")]
    zobrist: bool,

    /// Independent search restarts.
    #[arg(short = 'i', long = "max-iterations", default_value_t = 1)]
    max_iterations: usize,

    /// Base seed for worker RNGs (default: OS entropy). Runs are still
    /// not bit-reproducible across thread counts.
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Worker threads (default: machine parallelism).
    #[arg(short = 'T', long = "threads")]
    threads: Option<usize>,
}

impl Cli {
    fn into_params(self) -> SearchParams {
        SearchParams {
            net_size: self.net_size,
            max_beam_size: self.beam_size,
            scoring_tests: self.scoring_tests,
            elites: self.elites,
            depth_weight: self.depth_weight,
            symmetry: if self.symmetry {
                Some(true)
            } else if self.no_symmetry {
                Some(false)
            } else {
                None
            },
            zobrist: self.zobrist,
            max_iterations: self.max_iterations,
            seed: self.seed,
            threads: self.threads,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and exit 0; real parse errors
            // go to stderr and exit 1.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    let config = match Config::new(cli.into_params()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    let threads = config.threads().unwrap_or_else(num_cpus::get);
    if let Err(err) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        eprintln!("Error: {err}");
        process::exit(1);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    if let Err(err) = ctrlc::set_handler(move || {
        if handler_stop.swap(true, Ordering::SeqCst) {
            // Second interrupt: give up immediately.
            process::exit(1);
        }
    }) {
        eprintln!("Error: {err}");
        process::exit(1);
    }

    engine::run_auto(&config, &stop);
}
