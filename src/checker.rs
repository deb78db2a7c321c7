//! Feasibility checking and official scoring of VRPTW solutions.
//!
//! The checker walks every route once, in listed order, propagating the
//! elapsed time (travel, then waiting until the window opens, then service)
//! and the cumulative load. The first violated constraint stops the walk.
//!
//! Costs follow the competition convention: each edge is the Euclidean
//! distance rounded to an integer, and the solution cost is the sum of these
//! already-rounded edges. Rounding the real-valued total instead gives a
//! different score and must not be done.
//!
//! # Example
//!
//! ```
//! use vrptw_checker::instance::{Node, VRPTWInstance};
//! use vrptw_checker::solution::Solution;
//! use vrptw_checker::checker::check_solution;
//!
//! let instance = VRPTWInstance::new("toy", 1, 100, vec![
//!     Node::new(0, 0.0, 0.0, 0, 0, 1000, 0),
//!     Node::new(1, 0.0, 10.0, 5, 0, 100, 0),
//! ]);
//! let mut solution = Solution::from_routes(vec![vec![1]]);
//!
//! let report = check_solution(&instance, &mut solution).unwrap();
//! assert_eq!(report.cost, 20.0);
//! assert_eq!(solution.computed_cost, Some(20.0));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{CheckerConfig, CoverageRule};
use crate::instance::{VRPTWInstance, DEPOT};
use crate::solution::Solution;

/// Result of a check: the score report, or the first violated constraint
pub type CheckResult = Result<CheckReport, Violation>;

/// A constraint violated by a solution.
///
/// Route numbers are 1-based, as printed by solvers (`Route #1: ...`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("Max nb. of vehicles was violated: {routes} > V={max_vehicles}")]
    FleetSize { routes: usize, max_vehicles: usize },
    #[error("Route {route} lists invalid node {node} at position {position}")]
    InvalidNode { route: usize, position: usize, node: usize },
    #[error("TW of {node} ([{ready},{due}]) was violated (arrival time = {arrival})")]
    TimeWindow { route: usize, node: usize, ready: i32, due: i32, arrival: f64 },
    #[error(
        "Capacity of route {route} was violated at customer {node} (load {load} > Q={capacity})"
    )]
    Capacity { route: usize, node: usize, load: i64, capacity: i32 },
    #[error("{0}")]
    Coverage(CoverageReport),
    /// Solver output that could not be read as routes
    #[error("Unreadable solution: {0}")]
    Unreadable(String),
}

/// Customers not served exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Rule the report was produced with
    pub rule: CoverageRule,
    /// Customers never visited (under [`CoverageRule::Toggle`]: visited an even number of times)
    pub missing: Vec<usize>,
    /// Customers visited more than once, with their visit count
    pub repeated: Vec<(usize, usize)>,
}

impl CoverageReport {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.repeated.is_empty()
    }
}

impl std::fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines: Vec<String> = Vec::with_capacity(self.missing.len() + self.repeated.len());
        for customer in &self.missing {
            lines.push(match self.rule {
                CoverageRule::Exact => format!("Customer {} was not visited", customer),
                CoverageRule::Toggle => {
                    format!("Customer {} was not visited or was visited more than once!", customer)
                }
            });
        }
        for (customer, visits) in &self.repeated {
            lines.push(format!("Customer {} was visited {} times", customer, visits));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

/// Summary of one feasible route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    /// Sum of the rounded edge costs, depot to depot
    pub cost: f64,
    /// Total demand served
    pub load: i64,
    /// Elapsed time when back at the depot
    pub duration: f64,
    /// Number of customers served
    pub visits: usize,
}

/// Score of a feasible solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Official cost
    pub cost: f64,
    /// Cost the solver claimed, if any
    pub claimed_cost: Option<f64>,
    /// One entry per listed route, empty routes included
    pub routes: Vec<RouteReport>,
}

impl CheckReport {
    /// Routes that actually leave the depot
    pub fn vehicles_used(&self) -> usize {
        self.routes.iter().filter(|r| r.visits > 0).count()
    }

    /// `claimed - computed` when the two differ by more than `tolerance`
    pub fn cost_mismatch(&self, tolerance: f64) -> Option<f64> {
        self.claimed_cost
            .map(|claimed| claimed - self.cost)
            .filter(|delta| delta.abs() > tolerance)
    }
}

/// Feasibility checker and scorer
#[derive(Debug, Clone, Default)]
pub struct Checker {
    config: CheckerConfig,
}

impl Checker {
    pub fn new(config: CheckerConfig) -> Self {
        Checker { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Check `solution` against `instance` and record the outcome on the solution.
    ///
    /// On success `computed_cost` is set and `feasible` is true; on failure
    /// both are cleared. Checking the same pair twice gives the same result.
    pub fn check(&self, instance: &VRPTWInstance, solution: &mut Solution) -> CheckResult {
        solution.clear_check();

        let result = self.evaluate(instance, solution);
        match &result {
            Ok(report) => {
                solution.computed_cost = Some(report.cost);
                solution.feasible = true;
                log::info!(
                    "Feasible solution for {}: cost {} with {} routes",
                    instance.name,
                    report.cost,
                    report.vehicles_used()
                );
                if let Some(delta) = report.cost_mismatch(self.config.cost_mismatch_tolerance) {
                    log::warn!(
                        "Claimed cost differs from computed cost {} by {:.3}",
                        report.cost,
                        delta
                    );
                }
            }
            Err(violation) => {
                log::info!("Infeasible solution for {}: {}", instance.name, violation)
            }
        }

        result
    }

    /// Read and check one solution file.
    ///
    /// Output that cannot be parsed is scored as infeasible
    /// ([`Violation::Unreadable`]) together with an empty solution.
    pub fn check_file<P: AsRef<Path>>(
        &self,
        instance: &VRPTWInstance,
        path: P,
    ) -> (Solution, CheckResult) {
        match Solution::from_file(&path) {
            Ok(mut solution) => {
                let result = self.check(instance, &mut solution);
                (solution, result)
            }
            Err(err) => {
                log::warn!("Cannot read solution {:?}: {}", path.as_ref(), err);
                (Solution::new(), Err(Violation::Unreadable(err.to_string())))
            }
        }
    }

    /// Evaluate without touching the solution.
    pub fn evaluate(&self, instance: &VRPTWInstance, solution: &Solution) -> CheckResult {
        if solution.routes.len() > instance.max_vehicles {
            return Err(Violation::FleetSize {
                routes: solution.routes.len(),
                max_vehicles: instance.max_vehicles,
            });
        }

        let mut visits = vec![0usize; instance.dimension];
        let mut routes = Vec::with_capacity(solution.routes.len());
        let mut cost = 0.0;

        for (index, route) in solution.routes.iter().enumerate() {
            let report = self.walk_route(instance, index + 1, route, &mut visits)?;
            log::debug!(
                "Route #{}: cost {} load {} back at depot {}",
                index + 1,
                report.cost,
                report.load,
                report.duration
            );
            cost += report.cost;
            routes.push(report);
        }

        let coverage = self.coverage(&visits);
        if !coverage.is_empty() {
            return Err(Violation::Coverage(coverage));
        }

        Ok(CheckReport { cost, claimed_cost: solution.claimed_cost, routes })
    }

    /// Walk one route from the depot and back, counting visits.
    fn walk_route(
        &self,
        instance: &VRPTWInstance,
        number: usize,
        route: &[usize],
        visits: &mut [usize],
    ) -> Result<RouteReport, Violation> {
        let route = match route.split_last() {
            Some((&DEPOT, rest)) => rest,
            _ => route,
        };
        if route.is_empty() {
            return Ok(RouteReport::default());
        }

        let rounding = self.config.rounding;
        let epsilon = self.config.time_window_epsilon;

        let mut cost = 0.0;
        let mut elapsed = 0.0f64;
        let mut load: i64 = 0;
        let mut prev = DEPOT;

        for (position, &node) in route.iter().enumerate() {
            if !instance.is_customer(node) {
                return Err(Violation::InvalidNode {
                    route: number,
                    position: position + 1,
                    node,
                });
            }

            let edge = instance.edge_cost(prev, node, rounding);
            cost += edge;

            // no service is performed at the depot before leaving
            let service =
                if position == 0 { 0.0 } else { instance.nodes[prev].service_time as f64 };
            let customer = &instance.nodes[node];
            elapsed = (elapsed + edge + service).max(customer.ready_time as f64);
            if elapsed > customer.due_date as f64 + epsilon {
                return Err(Violation::TimeWindow {
                    route: number,
                    node,
                    ready: customer.ready_time,
                    due: customer.due_date,
                    arrival: elapsed,
                });
            }

            load += customer.demand as i64;
            if load > instance.capacity as i64 {
                return Err(Violation::Capacity {
                    route: number,
                    node,
                    load,
                    capacity: instance.capacity,
                });
            }

            visits[node] += 1;
            prev = node;
        }

        let edge = instance.edge_cost(prev, DEPOT, rounding);
        cost += edge;
        let depot = instance.depot();
        let service = instance.nodes[prev].service_time as f64;
        elapsed = (elapsed + edge + service).max(depot.ready_time as f64);
        if elapsed > depot.due_date as f64 + epsilon {
            return Err(Violation::TimeWindow {
                route: number,
                node: DEPOT,
                ready: depot.ready_time,
                due: depot.due_date,
                arrival: elapsed,
            });
        }

        Ok(RouteReport { cost, load, duration: elapsed, visits: route.len() })
    }

    fn coverage(&self, visits: &[usize]) -> CoverageReport {
        let rule = self.config.coverage;
        let mut report = CoverageReport { rule, missing: Vec::new(), repeated: Vec::new() };

        for (customer, &count) in visits.iter().enumerate().skip(1) {
            match rule {
                CoverageRule::Exact if count == 0 => report.missing.push(customer),
                CoverageRule::Exact if count > 1 => report.repeated.push((customer, count)),
                CoverageRule::Toggle if count % 2 == 0 => report.missing.push(customer),
                _ => {}
            }
        }

        report
    }
}

/// Check with the official competition settings.
pub fn check_solution(instance: &VRPTWInstance, solution: &mut Solution) -> CheckResult {
    Checker::default().check(instance, solution)
}
