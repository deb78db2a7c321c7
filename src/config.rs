//! Checker and stats configuration.
//!
//! Every field has a default matching the competition rules, so an empty
//! JSON object (or no config file at all) gives the official behaviour.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tolerance on time-window upper bounds.
pub const TIME_WINDOW_EPSILON: f64 = 1e-6;

/// PassMark score of the reference machine used to normalise solve times.
pub const CPU_BASE_REF: f64 = 2000.0;

/// How a real-valued distance is turned into an integer edge cost
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingRule {
    /// Nearest integer, ties away from zero (C `round`)
    #[default]
    HalfAwayFromZero,
    /// Nearest integer, ties to even
    HalfToEven,
}

impl RoundingRule {
    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            RoundingRule::HalfAwayFromZero => value.round(),
            RoundingRule::HalfToEven => value.round_ties_even(),
        }
    }
}

/// How customer coverage is verified after all routes are walked
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageRule {
    /// Every customer must be visited exactly once; missing and repeated
    /// customers are reported separately.
    #[default]
    Exact,
    /// Flip a visited flag on every visit, as the historical judge did.
    /// An even number of visits counts as "not visited".
    Toggle,
}

/// Configuration of the feasibility checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Allowed overshoot of a time-window upper bound
    pub time_window_epsilon: f64,
    /// Rounding applied to each edge before accumulation
    pub rounding: RoundingRule,
    /// Coverage verification
    pub coverage: CoverageRule,
    /// Claimed and computed costs further apart than this are logged
    pub cost_mismatch_tolerance: f64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            time_window_epsilon: TIME_WINDOW_EPSILON,
            rounding: RoundingRule::default(),
            coverage: CoverageRule::default(),
            cost_mismatch_tolerance: 0.5,
        }
    }
}

/// Configuration of the stats line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Benchmark score of the reference machine
    pub reference_benchmark: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig { reference_benchmark: CPU_BASE_REF }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub checker: CheckerConfig,
    pub stats: StatsConfig,
}

impl Config {
    /// Read a JSON config file; missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&text)?;
        log::debug!("Loaded config from {:?}: {:?}", path.as_ref(), config);
        Ok(config)
    }
}
