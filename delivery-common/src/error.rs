//! Error types for the delivery-route toolkit
//!
//! One enum covers both graph construction failures and per-request routing
//! failures. "No path between two nodes" is not an error at the solver level
//! (it is an `Option`); it only becomes [`Error::NoRouteExists`] when a tour
//! needs that pair.

use thiserror::Error;

use crate::types::NodeId;

/// Main error type for delivery-route operations
#[derive(Debug, Error)]
pub enum Error {
    /// Origin, destination or queried node is not part of the graph
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    /// Some pair required by the tour has no connecting path
    #[error("No route exists from node {from} to node {to}")]
    NoRouteExists { from: NodeId, to: NodeId },

    /// Assembled legs disagree with the optimizer's tour length
    #[error("Internal inconsistency: tour distance {expected} but legs sum to {actual}")]
    InternalInconsistency { expected: f64, actual: f64 },

    /// Node id appears more than once while building a graph
    #[error("Duplicate node {0}")]
    DuplicateNode(NodeId),

    /// Edge endpoint does not reference a known node
    #[error("Edge {from} -> {to} references missing node {missing}")]
    DanglingEdge {
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    /// Edge weight is negative, NaN or infinite
    #[error("Edge {from} -> {to} has invalid weight {weight}")]
    InvalidWeight { from: NodeId, to: NodeId, weight: f64 },

    /// Node coordinate is outside WGS84 bounds or not finite
    #[error("Node {id} has invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { id: NodeId, lat: f64, lon: f64 },

    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Malformed input (graph file, algorithm name, coordinate)
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures caused by the request rather than the graph or a defect
    pub fn is_request_error(&self) -> bool {
        matches!(self, Error::UnknownNode(_) | Error::NoRouteExists { .. })
    }
}

/// Convenience result type for delivery-route operations
pub type Result<T> = std::result::Result<T, Error>;
