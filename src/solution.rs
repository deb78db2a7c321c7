//! Solution representation and solver output parsing for VRPTW.
//!
//! A solver reports its answer as text:
//!
//! ```text
//! Route #1: 3 5 7
//! Route #2: 1 2
//! Cost 828.94
//! ```
//!
//! Each line is classified independently by [`OutputLine::parse`]; the
//! [`SolutionParser`] folds the classified lines into a [`Solution`] and
//! stops at the first cost line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Represents a candidate solution to a VRPTW instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// One entry per vehicle; customer ids only, depot endpoints are implicit
    pub routes: Vec<Vec<usize>>,
    /// Cost reported by the solver itself (not trusted)
    pub claimed_cost: Option<f64>,
    /// Cost computed by the checker, set only when the solution is feasible
    pub computed_cost: Option<f64>,
    /// Whether the last check accepted the solution
    pub feasible: bool,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solution from a list of routes
    pub fn from_routes(routes: Vec<Vec<usize>>) -> Self {
        Solution { routes, ..Self::default() }
    }

    /// Read solver output from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let file = File::open(&path)?;
        let solution = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "Read {} routes from {:?} (claimed cost: {:?})",
            solution.num_routes(),
            path.as_ref(),
            solution.claimed_cost
        );
        Ok(solution)
    }

    /// Read solver output from text
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::from_reader(text.as_bytes())
    }

    /// Read solver output line by line until the cost line.
    ///
    /// Lines are decoded lossily: solver chatter is not required to be UTF-8.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, ParseError> {
        let mut parser = SolutionParser::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if parser.feed(line.trim_end_matches(|c: char| c == '\n' || c == '\r'))? {
                break;
            }
        }
        if !parser.is_complete() {
            log::warn!("Solver output ended without a cost line");
        }
        Ok(parser.finish())
    }

    /// Number of routes (vehicles used)
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Total number of listed visits over all routes
    pub fn num_visits(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    /// Reset the result of a previous check
    pub fn clear_check(&mut self) {
        self.computed_cost = None;
        self.feasible = false;
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (k, route) in self.routes.iter().enumerate() {
            write!(f, "Route #{}:", k + 1)?;
            for node in route {
                write!(f, " {}", node)?;
            }
            writeln!(f)?;
        }
        if let Some(cost) = self.computed_cost.or(self.claimed_cost) {
            writeln!(f, "Cost {}", cost)?;
        }
        Ok(())
    }
}

/// One classified line of solver output
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    /// `Route <ordinal> <ids...>`
    Route(Vec<usize>),
    /// `Cost <value>`
    Cost(f64),
    /// Anything else (progress chatter, blank lines)
    Other,
}

impl OutputLine {
    /// Classify a single line; `line_no` is only used for error messages.
    pub fn parse(line_no: usize, line: &str) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace();
        let marker = match tokens.next() {
            Some(token) => token,
            None => return Ok(OutputLine::Other),
        };

        if marker.contains("Route") {
            // the ordinal, e.g. `#1:` or `1`
            tokens.next();
            let route = tokens
                .filter(|token| *token != ":")
                .map(|token| {
                    token.parse::<usize>().map_err(|_| ParseError::InvalidNodeId {
                        line: line_no,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(OutputLine::Route(route))
        } else if marker.contains("Cost") {
            let value = tokens
                .find(|token| *token != ":")
                .and_then(|token| token.parse::<f64>().ok())
                .ok_or(ParseError::InvalidCost { line: line_no })?;
            Ok(OutputLine::Cost(value))
        } else {
            Ok(OutputLine::Other)
        }
    }
}

/// Accumulates classified output lines into a [`Solution`]
#[derive(Debug, Default)]
pub struct SolutionParser {
    solution: Solution,
    complete: bool,
    line_no: usize,
}

impl SolutionParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line. Returns `true` once the cost line has been seen;
    /// lines fed after that are ignored.
    pub fn feed(&mut self, line: &str) -> Result<bool, ParseError> {
        if self.complete {
            return Ok(true);
        }
        self.line_no += 1;

        match OutputLine::parse(self.line_no, line)? {
            OutputLine::Route(route) => self.solution.routes.push(route),
            OutputLine::Cost(cost) => {
                self.solution.claimed_cost = Some(cost);
                self.complete = true;
            }
            OutputLine::Other => {
                log::trace!("Ignoring solver output line {}: {:?}", self.line_no, line)
            }
        }

        Ok(self.complete)
    }

    /// Whether the cost line was seen
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn finish(self) -> Solution {
        self.solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_creation() {
        let sol = Solution::new();
        assert!(sol.routes.is_empty());
        assert!(!sol.feasible);
        assert_eq!(sol.computed_cost, None);
    }

    #[test]
    fn test_route_line_formats() {
        assert_eq!(
            OutputLine::parse(1, "Route #1: 3 5 7").unwrap(),
            OutputLine::Route(vec![3, 5, 7])
        );
        assert_eq!(
            OutputLine::parse(1, "Route 2 : 4 1").unwrap(),
            OutputLine::Route(vec![4, 1])
        );
        assert_eq!(OutputLine::parse(1, "Route #3:").unwrap(), OutputLine::Route(vec![]));
    }

    #[test]
    fn test_cost_line_formats() {
        assert_eq!(OutputLine::parse(1, "Cost 828.94").unwrap(), OutputLine::Cost(828.94));
        assert_eq!(OutputLine::parse(1, "Cost : 20").unwrap(), OutputLine::Cost(20.0));
        assert!(matches!(OutputLine::parse(4, "Cost"), Err(ParseError::InvalidCost { line: 4 })));
    }

    #[test]
    fn test_other_lines() {
        assert_eq!(OutputLine::parse(1, "").unwrap(), OutputLine::Other);
        assert_eq!(OutputLine::parse(1, "iteration 10 best 900").unwrap(), OutputLine::Other);
    }

    #[test]
    fn test_invalid_node_id() {
        match OutputLine::parse(7, "Route #1: 3 x 7") {
            Err(ParseError::InvalidNodeId { line, token }) => {
                assert_eq!(line, 7);
                assert_eq!(token, "x");
            }
            other => panic!("expected invalid node id, got {:?}", other),
        }
    }

    #[test]
    fn test_cost_line_ends_parsing() {
        let text = "starting solver\nRoute #1: 1 2\nRoute #2: 3\nCost 42.5\nRoute #3: 4\n";
        let sol = Solution::parse(text).unwrap();

        assert_eq!(sol.routes, vec![vec![1, 2], vec![3]]);
        assert_eq!(sol.claimed_cost, Some(42.5));
        assert_eq!(sol.num_visits(), 3);
    }

    #[test]
    fn test_undecodable_chatter_is_ignored() {
        let bytes = b"progress \xff\xfe iter 3\r\nRoute #1: 1 2\r\nCost 20\r\n";
        let sol = Solution::from_reader(&bytes[..]).unwrap();

        assert_eq!(sol.routes, vec![vec![1, 2]]);
        assert_eq!(sol.claimed_cost, Some(20.0));
    }

    #[test]
    fn test_garbled_route_is_an_error() {
        match Solution::parse("Route 1 : 3 x 5\nCost : 20\n") {
            Err(ParseError::InvalidNodeId { line, token }) => {
                assert_eq!(line, 1);
                assert_eq!(token, "x");
            }
            other => panic!("expected invalid node id, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_reports_completion() {
        let mut parser = SolutionParser::new();
        assert!(!parser.feed("Route #1: 1").unwrap());
        assert!(!parser.is_complete());
        assert!(parser.feed("Cost 10").unwrap());
        assert!(parser.feed("garbage that would not parse: Route x").unwrap());
        assert_eq!(parser.finish().routes, vec![vec![1]]);
    }

    #[test]
    fn test_display_is_parseable() {
        let mut sol = Solution::from_routes(vec![vec![2, 1], vec![3]]);
        sol.claimed_cost = Some(57.0);
        let text = sol.to_string();

        assert_eq!(text, "Route #1: 2 1\nRoute #2: 3\nCost 57\n");
        assert_eq!(Solution::parse(&text).unwrap(), sol);
    }
}
