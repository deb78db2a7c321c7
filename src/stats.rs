//! Timing line reported for a scored run.
//!
//! Solve times are normalised by the ratio of the competitor's CPU benchmark
//! score to the reference machine's so that runs on different hardware can
//! be compared.

use std::time::{Duration, Instant, TryFromFloatSecsError};

use serde::{Deserialize, Serialize};

/// Cost and timing of one scored run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub cost: f64,
    /// Wall-clock seconds, truncated to whole milliseconds
    pub elapsed_seconds: f64,
    /// `elapsed_seconds * competitor / reference`
    pub normalized_seconds: f64,
}

impl RunStats {
    pub fn from_elapsed(
        cost: f64,
        elapsed: Duration,
        competitor_benchmark: f64,
        reference_benchmark: f64,
    ) -> Self {
        let elapsed_seconds = elapsed.as_millis() as f64 / 1000.0;
        RunStats {
            cost,
            elapsed_seconds,
            normalized_seconds: elapsed_seconds * (competitor_benchmark / reference_benchmark),
        }
    }

    pub fn from_instants(
        cost: f64,
        begin: Instant,
        end: Instant,
        competitor_benchmark: f64,
        reference_benchmark: f64,
    ) -> Self {
        Self::from_elapsed(
            cost,
            end.saturating_duration_since(begin),
            competitor_benchmark,
            reference_benchmark,
        )
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} {:.3} {:.3}", self.cost, self.elapsed_seconds, self.normalized_seconds)
    }
}

/// Measured solve time given in seconds, e.g. on the command line.
///
/// Negative, NaN and out-of-range values are rejected.
pub fn elapsed_from_secs(seconds: f64) -> Result<Duration, TryFromFloatSecsError> {
    Duration::try_from_secs_f64(seconds)
}

/// Format the `cost elapsed normalized` line for a run between `begin` and `end`.
pub fn format_stats(
    cost: f64,
    begin: Instant,
    end: Instant,
    competitor_benchmark: f64,
    reference_benchmark: f64,
) -> String {
    RunStats::from_instants(cost, begin, end, competitor_benchmark, reference_benchmark).to_string()
}
