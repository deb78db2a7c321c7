//! VRPTW Checker - Command Line Interface
//!
//! Checks solver output against a VRPTW instance and prints the official
//! score line.

use clap::{Parser, Subcommand, ValueEnum};
use vrptw_checker::checker::Checker;
use vrptw_checker::config::{Config, CoverageRule, RoundingRule};
use vrptw_checker::instance::VRPTWInstance;
use vrptw_checker::report::{CheckRecord, Report};
use vrptw_checker::solution::Solution;
use vrptw_checker::stats::{elapsed_from_secs, RunStats};
use vrptw_checker::visualization::Visualizer;

use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "vrptw-checker")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Feasibility checker and scorer for VRPTW solutions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one or more solutions against an instance
    Check {
        #[arg(short, long)]
        instance: PathBuf,

        /// Solver output files
        #[arg(short, long, required = true, num_args = 1..)]
        solution: Vec<PathBuf>,

        /// CPU benchmark score of the machine that ran the solver
        #[arg(short, long)]
        passmark: Option<f64>,

        /// Measured solve time in seconds
        #[arg(short, long, default_value = "0")]
        elapsed: f64,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tolerance on time-window upper bounds
        #[arg(long)]
        epsilon: Option<f64>,

        /// Edge cost rounding
        #[arg(long, value_enum)]
        rounding: Option<Rounding>,

        /// Coverage rule
        #[arg(long, value_enum)]
        coverage: Option<Coverage>,

        /// CPU benchmark score of the reference machine
        #[arg(long)]
        reference_benchmark: Option<f64>,

        /// Export results to CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Render the first solution as SVG
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Exit with status 2 if any solution is infeasible
        #[arg(long)]
        strict: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },

    /// Draw a solution as SVG
    Render {
        #[arg(short, long)]
        instance: PathBuf,

        #[arg(short, long)]
        solution: PathBuf,

        /// SVG output file
        #[arg(short, long)]
        output: PathBuf,

        /// Also write plain-text plot data
        #[arg(long)]
        plot_data: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Rounding {
    /// Nearest integer, ties away from zero
    HalfAwayFromZero,
    /// Nearest integer, ties to even
    HalfToEven,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Coverage {
    /// Every customer exactly once
    Exact,
    /// Historical flag flipping
    Toggle,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            instance,
            solution,
            passmark,
            elapsed,
            config,
            epsilon,
            rounding,
            coverage,
            reference_benchmark,
            csv,
            svg,
            strict,
            verbose,
        } => {
            let mut settings = match config {
                Some(path) => Config::from_file(&path).unwrap_or_else(|e| {
                    eprintln!("Error loading config: {}", e);
                    std::process::exit(1);
                }),
                None => Config::default(),
            };
            if let Some(epsilon) = epsilon {
                settings.checker.time_window_epsilon = epsilon;
            }
            if let Some(rounding) = rounding {
                settings.checker.rounding = match rounding {
                    Rounding::HalfAwayFromZero => RoundingRule::HalfAwayFromZero,
                    Rounding::HalfToEven => RoundingRule::HalfToEven,
                };
            }
            if let Some(coverage) = coverage {
                settings.checker.coverage = match coverage {
                    Coverage::Exact => CoverageRule::Exact,
                    Coverage::Toggle => CoverageRule::Toggle,
                };
            }
            if let Some(reference) = reference_benchmark {
                settings.stats.reference_benchmark = reference;
            }

            let elapsed = match elapsed_from_secs(elapsed) {
                Ok(elapsed) => elapsed,
                Err(e) => {
                    eprintln!("Invalid elapsed time {}: {}", elapsed, e);
                    std::process::exit(1);
                }
            };

            let all_feasible = check_solutions(
                &instance, &solution, passmark, elapsed, &settings, csv, svg, verbose,
            );
            if strict && !all_feasible {
                std::process::exit(2);
            }
        }

        Commands::Analyze { instance } => {
            analyze_instance(&instance);
        }

        Commands::Render { instance, solution, output, plot_data } => {
            render_solution(&instance, &solution, &output, plot_data);
        }
    }
}

fn load_instance(path: &Path) -> VRPTWInstance {
    match VRPTWInstance::from_file(path) {
        Ok(inst) => inst,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_solution(path: &Path) -> Solution {
    match Solution::from_file(path) {
        Ok(sol) => sol,
        Err(e) => {
            eprintln!("Error reading solution {:?}: {}", path, e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every solution was feasible.
#[allow(clippy::too_many_arguments)]
fn check_solutions(
    instance_path: &Path,
    solution_paths: &[PathBuf],
    passmark: Option<f64>,
    elapsed: Duration,
    settings: &Config,
    csv: Option<PathBuf>,
    svg: Option<PathBuf>,
    verbose: bool,
) -> bool {
    let instance = load_instance(instance_path);
    let checker = Checker::new(settings.checker.clone());
    let reference = settings.stats.reference_benchmark;
    let competitor = passmark.unwrap_or(reference);

    if verbose {
        println!("{}", instance.statistics());
    }

    let mut report = Report::new();
    let mut all_feasible = true;

    for (i, path) in solution_paths.iter().enumerate() {
        let (solution, result) = checker.check_file(&instance, path);

        let stats = match &result {
            Ok(check) => {
                let stats = RunStats::from_elapsed(check.cost, elapsed, competitor, reference);
                println!("{}", stats);
                if verbose {
                    for (k, route) in check.routes.iter().enumerate() {
                        println!(
                            "  Route #{}: cost {} load {} duration {} ({} customers)",
                            k + 1,
                            route.cost,
                            route.load,
                            route.duration,
                            route.visits
                        );
                    }
                    let tolerance = settings.checker.cost_mismatch_tolerance;
                    if let Some(delta) = check.cost_mismatch(tolerance) {
                        println!("  Claimed cost differs by {:.3}", delta);
                    }
                }
                Some(stats)
            }
            Err(violation) => {
                all_feasible = false;
                println!("INFEASIBLE: {}", violation);
                None
            }
        };

        if i == 0 {
            if let Some(svg_path) = &svg {
                let viz = Visualizer::new();
                let drawing = viz.generate_svg(&instance, &solution);
                match viz.save_svg(&drawing, svg_path) {
                    Ok(()) => println!("Visualization saved to {:?}", svg_path),
                    Err(e) => eprintln!("Failed to save SVG: {}", e),
                }
            }
        }

        report.record(CheckRecord::new(
            &instance,
            &path.to_string_lossy(),
            &solution,
            &result,
            stats.as_ref(),
        ));
    }

    if verbose && solution_paths.len() > 1 {
        println!("\n{}", report.generate_report());
    }

    if let Some(csv_path) = csv {
        match report.export_to_csv(&csv_path) {
            Ok(()) => println!("Results exported to {:?}", csv_path),
            Err(e) => {
                eprintln!("Failed to export results: {}", e);
                std::process::exit(1);
            }
        }
    }

    all_feasible
}

fn analyze_instance(path: &Path) {
    let instance = load_instance(path);

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let tight: Vec<_> = instance
        .customers()
        .filter(|n| {
            let earliest = instance.distance(0, n.id).round().max(n.ready_time as f64);
            earliest > n.due_date as f64
        })
        .map(|n| n.id)
        .collect();
    if !tight.is_empty() {
        println!("Customers unreachable in time from the depot: {:?}", tight);
    }

    let heavy: Vec<_> = instance
        .customers()
        .filter(|n| n.demand > instance.capacity)
        .map(|n| n.id)
        .collect();
    if !heavy.is_empty() {
        println!("Customers with demand above capacity: {:?}", heavy);
    }
}

fn render_solution(
    instance_path: &Path,
    solution_path: &Path,
    output: &Path,
    plot_data: Option<PathBuf>,
) {
    let instance = load_instance(instance_path);
    let mut solution = load_solution(solution_path);
    if let Err(violation) = Checker::default().check(&instance, &mut solution) {
        println!("INFEASIBLE: {}", violation);
    }

    let viz = Visualizer::new();
    let svg = viz.generate_svg(&instance, &solution);
    if let Err(e) = viz.save_svg(&svg, output) {
        eprintln!("Failed to save SVG: {}", e);
        std::process::exit(1);
    }
    println!("Visualization saved to {:?}", output);

    if let Some(data_path) = plot_data {
        let data = viz.export_plot_data(&instance, &solution);
        if let Err(e) = std::fs::write(&data_path, data) {
            eprintln!("Failed to write plot data: {}", e);
            std::process::exit(1);
        }
        println!("Plot data saved to {:?}", data_path);
    }
}
