//! VRPTW Solution Checker Library
//!
//! Reference feasibility checker and scorer for Vehicle Routing Problem with
//! Time Windows competition submissions.
//!
//! # Features
//!
//! - Solomon-format instance loader with node id validation
//! - Solver output parser (`Route #k: ...` / `Cost ...` lines)
//! - Fail-fast feasibility check: fleet size, time windows (with waiting and
//!   a `1e-6` tolerance), capacity, customer coverage
//! - Official cost: integer-rounded Euclidean edges summed edge by edge
//! - Normalised timing line, CSV reports and SVG rendering
//!
//! # Example
//!
//! ```no_run
//! use vrptw_checker::instance::VRPTWInstance;
//! use vrptw_checker::solution::Solution;
//! use vrptw_checker::checker::check_solution;
//!
//! let instance = VRPTWInstance::from_file("C101.txt").unwrap();
//! let mut solution = Solution::from_file("C101.sol").unwrap();
//!
//! match check_solution(&instance, &mut solution) {
//!     Ok(report) => println!("Cost: {:.1}", report.cost),
//!     Err(violation) => println!("Infeasible: {}", violation),
//! }
//! ```

pub mod checker;
pub mod config;
pub mod error;
pub mod instance;
pub mod report;
pub mod solution;
pub mod stats;
pub mod visualization;

pub use checker::{check_solution, CheckReport, Checker, Violation};
pub use config::Config;
pub use instance::VRPTWInstance;
pub use solution::Solution;
