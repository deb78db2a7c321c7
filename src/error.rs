//! Error types for loading instances and reading solver output.
//!
//! Feasibility problems are not errors: they are reported as
//! [`Violation`](crate::checker::Violation) values by the checker.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a [`VRPTWInstance`](crate::instance::VRPTWInstance).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Instance path wrong: {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot read instance: {0}")]
    Io(#[from] std::io::Error),
    #[error("Missing {0} line")]
    MissingLine(&'static str),
    #[error("Invalid fleet line {line}: expected `maxVehicles capacity`, got {content:?}")]
    InvalidFleet { line: usize, content: String },
    #[error("Malformed node at line {line}: {content:?}")]
    MalformedNode { line: usize, content: String },
    #[error("Node id {id} at line {line} is out of sequence (expected {expected})")]
    NodeId { line: usize, id: usize, expected: usize },
    #[error("Instance has no nodes")]
    Empty,
}

/// Failure to read a solution from solver output.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Cannot read solution: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid node id {token:?} at line {line}")]
    InvalidNodeId { line: usize, token: String },
    #[error("Invalid cost at line {line}")]
    InvalidCost { line: usize },
}

/// Failure to read a JSON configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
