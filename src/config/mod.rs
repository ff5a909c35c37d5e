// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Run configuration and the best-known-bounds table.
//!
//! All user-visible parameters are validated up front; once a [`Config`]
//! exists, every runtime path may assume the values are consistent. The
//! embedded bounds come from the published table of best known sorting
//! networks (<https://bertdobbelaere.github.io/sorting_networks.html>);
//! a search result strictly below a bound ends the run early.

use crate::network::Pattern;
use std::fmt;

/// Best known (length, depth) for one network size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub length: usize,
    pub depth: usize,
}

/// Best known bounds for n wires, or `None` outside [2, 32].
pub fn best_known_bounds(n: usize) -> Option<Bounds> {
    let (length, depth) = match n {
        2 => (1, 1),
        3 => (3, 3),
        4 => (5, 3),
        5 => (9, 5),
        6 => (12, 5),
        7 => (16, 6),
        8 => (19, 6),
        9 => (25, 7),
        10 => (29, 7),
        11 => (35, 8),
        12 => (39, 8),
        13 => (45, 9),
        14 => (51, 9),
        15 => (56, 9),
        16 => (60, 9),
        17 => (71, 10),
        18 => (77, 11),
        19 => (85, 11),
        20 => (91, 11),
        21 => (99, 12),
        22 => (106, 12),
        23 => (114, 12),
        24 => (120, 12),
        25 => (130, 13),
        26 => (138, 13),
        27 => (147, 13),
        28 => (155, 13),
        29 => (164, 14),
        30 => (172, 14),
        31 => (180, 14),
        32 => (185, 14),
        _ => return None,
    };
    Some(Bounds { length, depth })
}

/// Narrowest unsigned storage for an n-bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternWidth {
    U8,
    U16,
    U32,
}

impl PatternWidth {
    fn for_net_size(n: usize) -> Self {
        if n <= u8::MAX_BITS {
            PatternWidth::U8
        } else if n <= u16::MAX_BITS {
            PatternWidth::U16
        } else {
            PatternWidth::U32
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PatternWidth::U8 => u8::NAME,
            PatternWidth::U16 => u16::NAME,
            PatternWidth::U32 => u32::NAME,
        }
    }
}

/// Raw, unvalidated run parameters, as collected from the command line.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub net_size: usize,
    pub max_beam_size: usize,
    pub scoring_tests: usize,
    pub elites: usize,
    pub depth_weight: f64,
    /// `None` selects the default gate: on for even n, off for odd.
    pub symmetry: Option<bool>,
    pub zobrist: bool,
    pub max_iterations: usize,
    /// Base seed for per-worker RNGs; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Worker thread count; `None` uses the machine's parallelism.
    pub threads: Option<usize>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            net_size: 8,
            max_beam_size: 100,
            scoring_tests: 5,
            elites: 1,
            depth_weight: 0.0001,
            symmetry: None,
            zobrist: false,
            max_iterations: 1,
            seed: None,
            threads: None,
        }
    }
}

/// Errors detected while validating run parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NetSizeOutOfRange { net_size: usize },
    BeamSizeTooSmall,
    ScoringTestsTooSmall,
    ElitesOutOfRange { elites: usize, scoring_tests: usize },
    DepthWeightOutOfRange { depth_weight: f64 },
    IterationsTooSmall,
    ThreadsTooSmall,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NetSizeOutOfRange { net_size } => {
                write!(f, "net size {} outside the supported range 2-32", net_size)
            }
            ConfigError::BeamSizeTooSmall => write!(f, "beam size must be at least 1"),
            ConfigError::ScoringTestsTooSmall => {
                write!(f, "scoring tests must be at least 1")
            }
            ConfigError::ElitesOutOfRange {
                elites,
                scoring_tests,
            } => write!(
                f,
                "elites {} must be between 1 and the scoring test count {}",
                elites, scoring_tests
            ),
            ConfigError::DepthWeightOutOfRange { depth_weight } => {
                write!(f, "depth weight {} outside [0, 1]", depth_weight)
            }
            ConfigError::IterationsTooSmall => write!(f, "max iterations must be at least 1"),
            ConfigError::ThreadsTooSmall => write!(f, "threads must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated run configuration plus derived constants.
#[derive(Debug, Clone)]
pub struct Config {
    params: SearchParams,
    use_symmetry: bool,
    num_input_patterns: usize,
    pattern_width: PatternWidth,
    branching_factor: usize,
    length_lower_bound: usize,
    length_upper_bound: usize,
    depth_lower_bound: usize,
}

impl Config {
    /// Validate `params` and derive the computed constants.
    pub fn new(params: SearchParams) -> Result<Self, ConfigError> {
        let n = params.net_size;
        let bounds = best_known_bounds(n).ok_or(ConfigError::NetSizeOutOfRange { net_size: n })?;

        if params.max_beam_size < 1 {
            return Err(ConfigError::BeamSizeTooSmall);
        }
        if params.scoring_tests < 1 {
            return Err(ConfigError::ScoringTestsTooSmall);
        }
        if params.elites < 1 || params.elites > params.scoring_tests {
            return Err(ConfigError::ElitesOutOfRange {
                elites: params.elites,
                scoring_tests: params.scoring_tests,
            });
        }
        if !(0.0..=1.0).contains(&params.depth_weight) {
            return Err(ConfigError::DepthWeightOutOfRange {
                depth_weight: params.depth_weight,
            });
        }
        if params.max_iterations < 1 {
            return Err(ConfigError::IterationsTooSmall);
        }
        if params.threads == Some(0) {
            return Err(ConfigError::ThreadsTooSmall);
        }

        let use_symmetry = params.symmetry.unwrap_or(n % 2 == 0);

        Ok(Self {
            use_symmetry,
            num_input_patterns: 1usize << n,
            pattern_width: PatternWidth::for_net_size(n),
            branching_factor: n * (n - 1) / 2,
            length_lower_bound: bounds.length,
            // Capacity bound: twice the best known length.
            length_upper_bound: bounds.length * 2,
            depth_lower_bound: bounds.depth,
            params,
        })
    }

    /// Default configuration for `net_size`, for tests and tools.
    ///
    /// # Panics
    ///
    /// Panics when `net_size` is outside [2, 32].
    pub fn for_net_size(net_size: usize) -> Self {
        Self::new(SearchParams {
            net_size,
            ..SearchParams::default()
        })
        .expect("net size outside the supported range")
    }

    pub fn net_size(&self) -> usize {
        self.params.net_size
    }

    pub fn max_beam_size(&self) -> usize {
        self.params.max_beam_size
    }

    pub fn scoring_tests(&self) -> usize {
        self.params.scoring_tests
    }

    pub fn elites(&self) -> usize {
        self.params.elites
    }

    pub fn depth_weight(&self) -> f64 {
        self.params.depth_weight
    }

    pub fn use_symmetry(&self) -> bool {
        self.use_symmetry
    }

    pub fn use_zobrist(&self) -> bool {
        self.params.zobrist
    }

    pub fn max_iterations(&self) -> usize {
        self.params.max_iterations
    }

    pub fn seed(&self) -> Option<u64> {
        self.params.seed
    }

    pub fn threads(&self) -> Option<usize> {
        self.params.threads
    }

    pub fn num_input_patterns(&self) -> usize {
        self.num_input_patterns
    }

    pub fn pattern_width(&self) -> PatternWidth {
        self.pattern_width
    }

    /// Number of distinct comparators on n wires, n(n-1)/2.
    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    pub fn length_lower_bound(&self) -> usize {
        self.length_lower_bound
    }

    pub fn length_upper_bound(&self) -> usize {
        self.length_upper_bound
    }

    pub fn depth_lower_bound(&self) -> usize {
        self.depth_lower_bound
    }
}

impl fmt::Display for Config {
    /// The effective-configuration banner printed at startup.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        writeln!(f, "MAX_ITERATIONS          = {}", self.params.max_iterations)?;
        writeln!(f, "NET_SIZE                = {}", self.params.net_size)?;
        writeln!(f, "MAX_BEAM_SIZE           = {}", self.params.max_beam_size)?;
        writeln!(f, "NUM_SCORING_TESTS       = {}", self.params.scoring_tests)?;
        writeln!(f, "NUM_ELITE_TESTS         = {}", self.params.elites)?;
        writeln!(f, "USE_SYMMETRY_HEURISTIC  = {}", yes_no(self.use_symmetry))?;
        writeln!(f, "USE_ZOBRIST_TABLE       = {}", yes_no(self.params.zobrist))?;
        writeln!(f, "DEPTH_WEIGHT            = {}", self.params.depth_weight)?;
        match self.params.seed {
            Some(seed) => writeln!(f, "RNG_SEED                = {}", seed)?,
            None => writeln!(f, "RNG_SEED                = entropy")?,
        }
        match self.params.threads {
            Some(threads) => writeln!(f, "NUM_THREADS             = {}", threads)?,
            None => writeln!(f, "NUM_THREADS             = auto")?,
        }
        writeln!(f, "NUM_INPUT_PATTERNS      = {}", self.num_input_patterns)?;
        writeln!(f, "INPUT_PATTERN_TYPE      = {}", self.pattern_width.name())?;
        writeln!(f, "LENGTH_LOWER_BOUND      = {}", self.length_lower_bound)?;
        writeln!(f, "LENGTH_UPPER_BOUND      = {}", self.length_upper_bound)?;
        writeln!(f, "DEPTH_LOWER_BOUND       = {}", self.depth_lower_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::MAX_NET_SIZE;

    #[test]
    fn test_bounds_cover_supported_range() {
        assert!(best_known_bounds(1).is_none());
        assert!(best_known_bounds(33).is_none());
        for n in 2..=MAX_NET_SIZE {
            let bounds = best_known_bounds(n).unwrap();
            assert!(bounds.length >= 1);
            assert!(bounds.depth >= 1);
            assert!(bounds.length >= bounds.depth);
        }
        assert_eq!(
            best_known_bounds(8),
            Some(Bounds {
                length: 19,
                depth: 6
            })
        );
    }

    #[test]
    fn test_derived_values() {
        let config = Config::for_net_size(8);
        assert_eq!(config.num_input_patterns(), 256);
        assert_eq!(config.branching_factor(), 28);
        assert_eq!(config.length_lower_bound(), 19);
        assert_eq!(config.length_upper_bound(), 38);
        assert_eq!(config.depth_lower_bound(), 6);
        assert_eq!(config.pattern_width(), PatternWidth::U8);
        assert_eq!(Config::for_net_size(16).pattern_width(), PatternWidth::U16);
        assert_eq!(Config::for_net_size(17).pattern_width(), PatternWidth::U32);
    }

    #[test]
    fn test_symmetry_gate_defaults_to_even_sizes() {
        assert!(Config::for_net_size(8).use_symmetry());
        assert!(!Config::for_net_size(7).use_symmetry());

        let forced = Config::new(SearchParams {
            net_size: 7,
            symmetry: Some(true),
            ..SearchParams::default()
        })
        .unwrap();
        assert!(forced.use_symmetry());
    }

    #[test]
    fn test_validation_rejects_bad_parameters() {
        let cases = [
            SearchParams {
                net_size: 1,
                ..SearchParams::default()
            },
            SearchParams {
                net_size: 33,
                ..SearchParams::default()
            },
            SearchParams {
                max_beam_size: 0,
                ..SearchParams::default()
            },
            SearchParams {
                scoring_tests: 0,
                ..SearchParams::default()
            },
            SearchParams {
                elites: 6,
                scoring_tests: 5,
                ..SearchParams::default()
            },
            SearchParams {
                depth_weight: 1.5,
                ..SearchParams::default()
            },
            SearchParams {
                max_iterations: 0,
                ..SearchParams::default()
            },
            SearchParams {
                threads: Some(0),
                ..SearchParams::default()
            },
        ];
        for params in cases {
            assert!(Config::new(params.clone()).is_err(), "accepted {params:?}");
        }
    }

    #[test]
    fn test_banner_lists_effective_values() {
        let banner = Config::for_net_size(8).to_string();
        assert!(banner.contains("NET_SIZE                = 8"));
        assert!(banner.contains("INPUT_PATTERN_TYPE      = u8"));
        assert!(banner.contains("USE_SYMMETRY_HEURISTIC  = Yes"));
        assert!(banner.contains("RNG_SEED                = entropy"));
    }
}
