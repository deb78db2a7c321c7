use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use vrptw_checker::checker::{check_solution, Checker, Violation};
use vrptw_checker::config::{CheckerConfig, CoverageRule, RoundingRule};
use vrptw_checker::instance::{Node, VRPTWInstance, DEPOT};
use vrptw_checker::report::{CheckRecord, Report};
use vrptw_checker::solution::Solution;
use vrptw_checker::stats::RunStats;

const INSTANCE: &str = "\
TOY

VEHICLE
NUMBER     CAPACITY
   1         100

CUSTOMER
CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE   TIME

    0      0          0          0          0       1000          0
    1      0         10          5          0        100          0
";

/// Random instance with windows and capacity loose enough for any split
/// into at most `vehicles` routes.
fn random_instance(rng: &mut ChaCha8Rng, customers: usize, vehicles: usize) -> VRPTWInstance {
    let mut nodes = vec![Node::new(0, 50.0, 50.0, 0, 0, 1_000_000, 0)];
    for id in 1..=customers {
        nodes.push(Node::new(
            id,
            rng.gen_range(0..100) as f64,
            rng.gen_range(0..100) as f64,
            rng.gen_range(1..20),
            0,
            1_000_000,
            rng.gen_range(0..10),
        ));
    }
    VRPTWInstance::new("random", vehicles, 20 * customers as i32, nodes)
}

fn random_split(rng: &mut ChaCha8Rng, customers: usize, vehicles: usize) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (1..=customers).collect();
    order.shuffle(rng);
    let mut routes = vec![Vec::new(); vehicles];
    for customer in order {
        routes[rng.gen_range(0..vehicles)].push(customer);
    }
    routes.retain(|r| !r.is_empty());
    routes
}

#[test]
fn parsed_toy_instance_scores_twenty() {
    let instance = VRPTWInstance::parse(INSTANCE).unwrap();
    let mut solution = Solution::parse("Route #1: 1\nCost 20\n").unwrap();

    let report = check_solution(&instance, &mut solution).unwrap();

    assert_eq!(report.cost, 20.0);
    assert_eq!(report.cost_mismatch(0.5), None);
    let elapsed = std::time::Duration::from_millis(1234);
    assert_eq!(
        RunStats::from_elapsed(report.cost, elapsed, 2000.0, 2000.0).to_string(),
        "20.0 1.234 1.234"
    );
}

#[test]
fn parsed_toy_instance_with_tight_window_is_rejected() {
    let text = INSTANCE.replace("0        100          0", "0          5          0");
    let instance = VRPTWInstance::parse(&text).unwrap();
    assert_eq!(instance.nodes[1].due_date, 5);
    let mut solution = Solution::parse("Route #1: 1\nCost 20\n").unwrap();

    let violation = check_solution(&instance, &mut solution).unwrap_err();

    assert_eq!(violation.to_string(), "TW of 1 ([0,5]) was violated (arrival time = 10)");
}

#[test]
fn depot_costs_nothing_to_itself() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let instance = random_instance(&mut rng, 30, 5);

    assert_eq!(instance.edge_cost(DEPOT, DEPOT, RoundingRule::HalfAwayFromZero), 0.0);
    assert_eq!(instance.customers().count(), 30);
    assert!(instance.customers().all(|n| n.id != DEPOT));
}

#[test]
fn random_solutions_are_feasible_and_scored_edge_by_edge() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for _ in 0..20 {
        let instance = random_instance(&mut rng, 25, 4);
        let routes = random_split(&mut rng, 25, 4);
        let mut solution = Solution::from_routes(routes.clone());

        let report = check_solution(&instance, &mut solution).unwrap();

        let mut expected = 0.0;
        for route in &routes {
            let mut prev = DEPOT;
            for &node in route {
                expected += instance.distance(prev, node).round();
                prev = node;
            }
            expected += instance.distance(prev, DEPOT).round();
        }
        assert_eq!(report.cost, expected);
        assert_eq!(report.cost.fract(), 0.0);
    }
}

#[test]
fn checking_twice_gives_the_same_answer() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let instance = random_instance(&mut rng, 15, 3);
    let checker = Checker::default();

    for _ in 0..10 {
        let mut routes = random_split(&mut rng, 15, 3);
        // drop a customer half of the time
        if rng.gen_bool(0.5) {
            routes[0].pop();
        }
        let mut solution = Solution::from_routes(routes);

        let first = checker.check(&instance, &mut solution);
        let first_cost = solution.computed_cost;
        let second = checker.check(&instance, &mut solution);

        assert_eq!(first, second);
        assert_eq!(first_cost, solution.computed_cost);
    }
}

#[test]
fn too_many_routes_are_rejected_whatever_they_contain() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let instance = random_instance(&mut rng, 10, 2);
    let mut solution = Solution::from_routes(vec![vec![1], vec![2], vec![3, 4, 5, 6, 7, 8, 9, 10]]);

    assert_eq!(
        check_solution(&instance, &mut solution).unwrap_err(),
        Violation::FleetSize { routes: 3, max_vehicles: 2 }
    );
}

#[test]
fn omitting_any_customer_is_infeasible() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let instance = random_instance(&mut rng, 12, 3);
    let routes = random_split(&mut rng, 12, 3);

    for skipped in 1..=12 {
        let pruned: Vec<Vec<usize>> = routes
            .iter()
            .map(|r| r.iter().copied().filter(|&c| c != skipped).collect())
            .collect();
        let mut solution = Solution::from_routes(pruned);

        match check_solution(&instance, &mut solution) {
            Err(Violation::Coverage(report)) => assert_eq!(report.missing, vec![skipped]),
            other => panic!("expected customer {} to be reported, got {:?}", skipped, other),
        }
    }
}

#[test]
fn toggle_rule_hides_double_visits() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let instance = random_instance(&mut rng, 6, 3);
    let routes = vec![vec![1, 2, 3], vec![4, 5, 6], vec![1, 1]];
    let toggle =
        Checker::new(CheckerConfig { coverage: CoverageRule::Toggle, ..Default::default() });

    // customer 1 visited three times looks visited once
    assert!(toggle.evaluate(&instance, &Solution::from_routes(routes.clone())).is_ok());

    match Checker::default().evaluate(&instance, &Solution::from_routes(routes)) {
        Err(Violation::Coverage(report)) => assert_eq!(report.repeated, vec![(1, 3)]),
        other => panic!("expected a coverage violation, got {:?}", other),
    }
}

#[test]
fn garbled_file_does_not_stop_the_batch() {
    let instance = VRPTWInstance::parse(INSTANCE).unwrap();
    let dir = std::env::temp_dir().join(format!("vrptw-batch-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let garbled = dir.join("garbled.sol");
    let chatter = dir.join("chatter.sol");
    let good = dir.join("good.sol");
    std::fs::write(&garbled, "Route 1 : 1 x\nCost : 20\n").unwrap();
    std::fs::write(&chatter, b"iter 3 \xff\xfe\nRoute #1: 1\nCost 20\n").unwrap();
    std::fs::write(&good, "Route #1: 1\nCost 20\n").unwrap();

    let checker = Checker::default();
    let mut report = Report::new();
    for path in [&garbled, &chatter, &good] {
        let (solution, result) = checker.check_file(&instance, path);
        let source = path.to_string_lossy();
        report.record(CheckRecord::new(&instance, &source, &solution, &result, None));
    }
    let csv_path = dir.join("results.csv");
    report.export_to_csv(&csv_path).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    let records = report.records();
    assert_eq!(records.len(), 3);
    assert!(!records[0].feasible);
    assert_eq!(
        records[0].reason.as_deref(),
        Some("Unreadable solution: Invalid node id \"x\" at line 1")
    );
    assert_eq!(records[1].computed_cost, Some(20.0));
    assert_eq!(records[2].computed_cost, Some(20.0));
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains("garbled.sol"));
    assert!(csv.contains("good.sol"));
}
