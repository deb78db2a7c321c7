//! Collecting check results over several solution files.
//!
//! Provides a CSV export of every checked solution and a plain-text summary.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::checker::CheckResult;
use crate::instance::VRPTWInstance;
use crate::solution::Solution;
use crate::stats::RunStats;

/// Result of checking one solution file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Instance name
    pub instance: String,
    /// Where the solution came from (usually a file path)
    pub solution: String,
    /// Number of routes listed
    pub routes: usize,
    /// Whether the solution was accepted
    pub feasible: bool,
    /// Official cost (feasible solutions only)
    pub computed_cost: Option<f64>,
    /// Cost the solver claimed
    pub claimed_cost: Option<f64>,
    /// Wall-clock seconds, when the run was timed
    pub elapsed_seconds: Option<f64>,
    /// Normalised seconds, when the run was timed
    pub normalized_seconds: Option<f64>,
    /// Diagnostic of an infeasible solution
    pub reason: Option<String>,
    /// RFC 3339 time of the check
    pub checked_at: String,
}

impl CheckRecord {
    pub fn new(
        instance: &VRPTWInstance,
        source: &str,
        solution: &Solution,
        result: &CheckResult,
        stats: Option<&RunStats>,
    ) -> Self {
        CheckRecord {
            instance: instance.name.clone(),
            solution: source.to_string(),
            routes: solution.num_routes(),
            feasible: result.is_ok(),
            computed_cost: result.as_ref().ok().map(|report| report.cost),
            claimed_cost: solution.claimed_cost,
            elapsed_seconds: stats.map(|s| s.elapsed_seconds),
            normalized_seconds: stats.map(|s| s.normalized_seconds),
            reason: result
                .as_ref()
                .err()
                .map(|violation| violation.to_string().replace('\n', "; ")),
            checked_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

/// Accumulates check records
#[derive(Debug, Default)]
pub struct Report {
    records: Vec<CheckRecord>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result
    pub fn record(&mut self, record: CheckRecord) {
        self.records.push(record);
    }

    /// Get all records
    pub fn records(&self) -> &[CheckRecord] {
        &self.records
    }

    pub fn num_feasible(&self) -> usize {
        self.records.iter().filter(|r| r.feasible).count()
    }

    /// Cheapest feasible record
    pub fn best(&self) -> Option<&CheckRecord> {
        self.records
            .iter()
            .filter(|r| r.feasible)
            .filter_map(|r| r.computed_cost.map(|cost| (r, cost)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(r, _)| r)
    }

    /// Export records to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), csv::Error> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for record in &self.records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       VRPTW Check Report\n");
        report.push_str("========================================\n\n");

        report.push_str(&format!("Feasible: {}/{}\n", self.num_feasible(), self.records.len()));
        report.push_str("-".repeat(80).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<12} {:<30} {:>7} {:>12} {:>12}\n",
            "Instance", "Solution", "Routes", "Cost", "Claimed"
        ));
        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        for record in &self.records {
            let cost = record
                .computed_cost
                .map(|c| format!("{:.1}", c))
                .unwrap_or_else(|| "INFEASIBLE".to_string());
            let claimed = record
                .claimed_cost
                .map(|c| format!("{:.2}", c))
                .unwrap_or_else(|| "-".to_string());

            report.push_str(&format!(
                "{:<12} {:<30} {:>7} {:>12} {:>12}\n",
                record.instance, record.solution, record.routes, cost, claimed
            ));
            if let Some(reason) = &record.reason {
                report.push_str(&format!("    {}\n", reason));
            }
        }

        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        if let Some(best) = self.best() {
            report.push_str(&format!(
                "\nBest: {} ({:.1})\n",
                best.solution,
                best.computed_cost.unwrap_or_default()
            ));
        }

        report
    }
}
