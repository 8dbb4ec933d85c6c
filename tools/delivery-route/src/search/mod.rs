//! Shortest-path solvers
//!
//! Both solvers work in graph index space and share the same contract:
//! unreachable targets have infinite distance and no path, and a path is
//! always a simple walk along existing edges whose weight sum equals the
//! reported distance.

pub mod dijkstra;
pub mod floyd_warshall;

pub use dijkstra::{dijkstra, dijkstra_from, ShortestPathTree};
pub use floyd_warshall::{floyd_warshall, AllPairs};

use crate::graph::RoadGraph;

/// Sentinel for "no predecessor / no next hop"
pub(crate) const NO_NODE: usize = usize::MAX;

/// Sum of edge weights along a path of node indices.
///
/// Each hop uses the lightest parallel edge. Returns `None` if some hop has
/// no edge at all.
pub fn path_weight(graph: &RoadGraph, path: &[usize]) -> Option<f64> {
    path.windows(2)
        .map(|hop| graph.edge_weight_by_index(hop[0], hop[1]))
        .sum()
}
