//! Module for parsing and representing VRPTW instances.
//!
//! This module handles the Solomon-style text files used by the competition:
//! a name line, the fleet section (`maxVehicles capacity`) and one line per
//! node with coordinates, demand, time window and service time.
//! Edge weights are Euclidean distances computed on demand.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::RoundingRule;
use crate::error::LoadError;

/// Index of the depot in every instance.
pub const DEPOT: usize = 0;

/// Represents a node (depot or customer) of a VRPTW instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier, also its position in the node table
    pub id: usize,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Demand served when visiting the node
    pub demand: i32,
    /// Time-window lower bound (service may not start earlier)
    pub ready_time: i32,
    /// Time-window upper bound (latest arrival)
    pub due_date: i32,
    /// Time spent at the node before leaving
    pub service_time: i32,
}

impl Node {
    pub fn new(
        id: usize,
        x: f64,
        y: f64,
        demand: i32,
        ready_time: i32,
        due_date: i32,
        service_time: i32,
    ) -> Self {
        Node { id, x, y, demand, ready_time, due_date, service_time }
    }

    /// Check if this node is the depot
    pub fn is_depot(&self) -> bool {
        self.id == DEPOT
    }

    /// Width of the time window
    pub fn window_width(&self) -> i32 {
        self.due_date - self.ready_time
    }
}

/// Represents a complete VRPTW instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VRPTWInstance {
    /// Name of the instance
    pub name: String,
    /// Number of nodes (including depot)
    pub dimension: usize,
    /// Maximum number of routes a solution may use
    pub max_vehicles: usize,
    /// Vehicle capacity
    pub capacity: i32,
    /// All nodes, indexed by id; node 0 is the depot
    pub nodes: Vec<Node>,
}

impl VRPTWInstance {
    /// Build an instance from an already validated node table.
    pub fn new(
        name: impl Into<String>,
        max_vehicles: usize,
        capacity: i32,
        nodes: Vec<Node>,
    ) -> Self {
        VRPTWInstance {
            name: name.into(),
            dimension: nodes.len(),
            max_vehicles,
            capacity,
            nodes,
        }
    }

    /// Load an instance from a file. An unreadable path is fatal for the caller.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let file = File::open(&path).map_err(|source| LoadError::Open {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let instance = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "Loaded instance {} from {:?}: {} customers, V={}, Q={}",
            instance.name,
            path.as_ref(),
            instance.num_customers(),
            instance.max_vehicles,
            instance.capacity
        );
        Ok(instance)
    }

    /// Parse an instance from its textual description.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse an instance from any buffered reader.
    ///
    /// Blank lines are skipped everywhere, so the two ignored lines around
    /// the fleet section are the section headers of the Solomon format.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LoadError> {
        let mut lines = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if !line.trim().is_empty() {
                lines.push((index + 1, line));
            }
        }
        let mut lines = lines.into_iter();

        let (_, name_line) = lines.next().ok_or(LoadError::MissingLine("name"))?;
        let name = name_line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        lines.next().ok_or(LoadError::MissingLine("VEHICLE header"))?;
        lines.next().ok_or(LoadError::MissingLine("NUMBER CAPACITY header"))?;

        let (fleet_no, fleet_line) = lines.next().ok_or(LoadError::MissingLine("fleet"))?;
        let (max_vehicles, capacity) = Self::parse_fleet(fleet_no, &fleet_line)?;

        lines.next().ok_or(LoadError::MissingLine("CUSTOMER header"))?;
        lines.next().ok_or(LoadError::MissingLine("column header"))?;

        let mut nodes: Vec<Node> = Vec::new();
        for (line_no, line) in lines {
            let node = Self::parse_node(line_no, &line)?;
            if node.id != nodes.len() {
                return Err(LoadError::NodeId { line: line_no, id: node.id, expected: nodes.len() });
            }
            nodes.push(node);
        }

        if nodes.is_empty() {
            return Err(LoadError::Empty);
        }

        log::debug!("Parsed instance {} with {} nodes", name, nodes.len());

        Ok(VRPTWInstance::new(name, max_vehicles, capacity, nodes))
    }

    fn parse_fleet(line_no: usize, line: &str) -> Result<(usize, i32), LoadError> {
        let invalid = || LoadError::InvalidFleet { line: line_no, content: line.to_string() };
        let mut parts = line.split_whitespace();
        let max_vehicles = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let capacity = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        Ok((max_vehicles, capacity))
    }

    fn parse_node(line_no: usize, line: &str) -> Result<Node, LoadError> {
        let malformed = || LoadError::MalformedNode {
            line: line_no,
            content: line.trim().to_string(),
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 7 {
            return Err(malformed());
        }

        let id: usize = parts[0].parse().map_err(|_| malformed())?;
        let x: f64 = parts[1].parse().map_err(|_| malformed())?;
        let y: f64 = parts[2].parse().map_err(|_| malformed())?;
        let mut ints = [0i32; 4];
        for (slot, part) in ints.iter_mut().zip(&parts[3..7]) {
            *slot = part.parse().map_err(|_| malformed())?;
        }
        let [demand, ready_time, due_date, service_time] = ints;

        Ok(Node::new(id, x, y, demand, ready_time, due_date, service_time))
    }

    /// Euclidean distance between two nodes
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        let dx = self.nodes[i].x - self.nodes[j].x;
        let dy = self.nodes[i].y - self.nodes[j].y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance rounded to an integer, the cost of travelling from `i` to `j`
    #[inline]
    pub fn edge_cost(&self, i: usize, j: usize, rounding: RoundingRule) -> f64 {
        rounding.apply(self.distance(i, j))
    }

    /// The depot node
    pub fn depot(&self) -> &Node {
        &self.nodes[DEPOT]
    }

    /// Get the number of customer nodes (excluding depot)
    pub fn num_customers(&self) -> usize {
        self.dimension.saturating_sub(1)
    }

    /// Iterate over the customer nodes
    pub fn customers(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().skip(1)
    }

    /// Check whether `id` names a customer of this instance
    pub fn is_customer(&self, id: usize) -> bool {
        id != DEPOT && id < self.dimension
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let total_demand: i64 = self.customers().map(|n| n.demand as i64).sum();
        let min_vehicles = if self.capacity > 0 {
            ((total_demand + self.capacity as i64 - 1) / self.capacity as i64).max(0) as usize
        } else {
            0
        };

        let avg_window = if self.num_customers() > 0 {
            let total: f64 = self.customers().map(|n| n.window_width() as f64).sum();
            total / self.num_customers() as f64
        } else {
            0.0
        };

        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                distances.push(self.distance(i, j));
            }
        }
        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);

        let depot = self.depot();

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            max_vehicles: self.max_vehicles,
            capacity: self.capacity,
            total_demand,
            min_vehicles,
            horizon: (depot.ready_time, depot.due_date),
            avg_window,
            avg_distance,
            max_distance,
        }
    }
}

/// Statistics about a VRPTW instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub max_vehicles: usize,
    pub capacity: i32,
    pub total_demand: i64,
    /// Capacity lower bound on the number of routes
    pub min_vehicles: usize,
    /// Depot time window
    pub horizon: (i32, i32),
    pub avg_window: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(
            f,
            "  Nodes: {} (1 depot + {} customers)",
            self.dimension,
            self.dimension.saturating_sub(1)
        )?;
        writeln!(f, "  Vehicles: {}", self.max_vehicles)?;
        writeln!(f, "  Capacity: {}", self.capacity)?;
        writeln!(f, "  Total demand: {}", self.total_demand)?;
        writeln!(f, "  Vehicles needed (capacity bound): {}", self.min_vehicles)?;
        writeln!(f, "  Horizon: [{}, {}]", self.horizon.0, self.horizon.1)?;
        writeln!(f, "  Avg window width: {:.2}", self.avg_window)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "\
C101

VEHICLE
NUMBER     CAPACITY
  2         100

CUSTOMER
CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE   TIME

    0      0          0          0          0       1000          0
    1      0         10          5          0        100          0
    2      3          4         20         10        200         10

";

    #[test]
    fn test_parse_solomon_layout() {
        let instance = VRPTWInstance::parse(SMALL).unwrap();

        assert_eq!(instance.name, "C101");
        assert_eq!(instance.dimension, 3);
        assert_eq!(instance.max_vehicles, 2);
        assert_eq!(instance.capacity, 100);
        assert_eq!(instance.nodes[2], Node::new(2, 3.0, 4.0, 20, 10, 200, 10));
        assert!(instance.depot().is_depot());
        assert_eq!(instance.num_customers(), 2);
    }

    #[test]
    fn test_distance_calculation() {
        let instance = VRPTWInstance::parse(SMALL).unwrap();

        assert!((instance.distance(0, 2) - 5.0).abs() < 1e-10);
        assert!((instance.distance(2, 0) - 5.0).abs() < 1e-10);
        assert_eq!(instance.distance(0, 0), 0.0);
        assert_eq!(instance.edge_cost(0, 0, RoundingRule::HalfAwayFromZero), 0.0);
    }

    #[test]
    fn test_depot_is_not_a_customer() {
        let instance = VRPTWInstance::parse(SMALL).unwrap();

        assert!(!instance.is_customer(DEPOT));
        assert!(instance.is_customer(1));
        assert!(!instance.is_customer(3));
        assert!(instance.customers().all(|n| !n.is_depot()));
    }

    #[test]
    fn test_rejects_gap_in_ids() {
        let text = SMALL.replace("    2      3", "    3      3");
        match VRPTWInstance::parse(&text) {
            Err(LoadError::NodeId { id, expected, .. }) => {
                assert_eq!(id, 3);
                assert_eq!(expected, 2);
            }
            other => panic!("expected a node id error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_short_node_line() {
        let text = SMALL.replace("10        200         10", "10");
        assert!(matches!(VRPTWInstance::parse(&text), Err(LoadError::MalformedNode { .. })));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = VRPTWInstance::from_file("/definitely/not/here.txt");
        match result {
            Err(err @ LoadError::Open { .. }) => {
                let message = err.to_string();
                assert!(message.starts_with("Instance path wrong: \"/definitely/not/here.txt\""));
            }
            other => panic!("expected an open error, got {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_content_is_a_read_error() {
        let mut bytes = SMALL.as_bytes().to_vec();
        bytes.extend_from_slice(b"    3 \xff\xfe\n");

        match VRPTWInstance::from_reader(bytes.as_slice()) {
            Err(err @ LoadError::Io(_)) => {
                assert!(err.to_string().starts_with("Cannot read instance"))
            }
            other => panic!("expected a read error, got {:?}", other),
        }
    }

    #[test]
    fn test_statistics() {
        let instance = VRPTWInstance::parse(SMALL).unwrap();
        let stats = instance.statistics();

        assert_eq!(stats.total_demand, 25);
        assert_eq!(stats.min_vehicles, 1);
        assert_eq!(stats.horizon, (0, 1000));
        assert!(stats.to_string().contains("1 depot + 2 customers"));
    }
}
