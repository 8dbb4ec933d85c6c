//! All-pairs shortest paths (Floyd–Warshall)
//!
//! Stores flat `n × n` distance and next-hop tables. Memory and time grow as
//! O(n²) and O(n³), so this is only worth it on small graphs or when most
//! nodes are points of interest.

use delivery_common::{NodeId, Result};

use super::NO_NODE;
use crate::graph::RoadGraph;

/// Distance and next-hop tables for every ordered node pair, in index space
#[derive(Debug, Clone)]
pub struct AllPairs {
    n: usize,
    dist: Vec<f64>,
    next: Vec<usize>,
}

impl AllPairs {
    /// Distance `i -> j`, `f64::INFINITY` when unreachable
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.dist[i * self.n + j]
    }

    /// First hop after `i` on the shortest path to `j`
    #[inline]
    pub fn next_hop(&self, i: usize, j: usize) -> Option<usize> {
        match self.next[i * self.n + j] {
            NO_NODE => None,
            v => Some(v),
        }
    }

    /// Node indices from `i` to `j` by following next hops
    pub fn path(&self, i: usize, j: usize) -> Option<Vec<usize>> {
        if !self.distance(i, j).is_finite() {
            return None;
        }

        let mut path = vec![i];
        let mut curr = i;
        while curr != j {
            curr = self.next_hop(curr, j)?;
            path.push(curr);
            // A simple path never has more than n nodes
            if path.len() > self.n {
                tracing::warn!(from = i, to = j, "next-hop table loops, dropping path");
                return None;
            }
        }
        Some(path)
    }

    /// Node ids from `source` to `target`.
    ///
    /// Unknown ids fail with `UnknownNode`; unreachable pairs are `Ok(None)`.
    pub fn reconstruct_path(
        &self,
        graph: &RoadGraph,
        source: NodeId,
        target: NodeId,
    ) -> Result<Option<Vec<NodeId>>> {
        let i = graph.index_of(source)?;
        let j = graph.index_of(target)?;
        Ok(self
            .path(i, j)
            .map(|path| path.into_iter().map(|idx| graph.id_of(idx)).collect()))
    }
}

/// Compute all-pairs shortest paths over the whole graph.
///
/// Parallel edges keep the lightest weight and self-loops are ignored.
/// Relaxation uses strict `<`, so the first path found at a given cost is kept.
pub fn floyd_warshall(graph: &RoadGraph) -> AllPairs {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n * n];
    let mut next = vec![NO_NODE; n * n];

    for u in 0..n {
        dist[u * n + u] = 0.0;
        next[u * n + u] = u;
        for (v, w) in graph.neighbors_by_index(u) {
            if u != v && w < dist[u * n + v] {
                dist[u * n + v] = w;
                next[u * n + v] = v;
            }
        }
    }

    for k in 0..n {
        let row_k = dist[k * n..(k + 1) * n].to_vec();
        for i in 0..n {
            let d_ik = dist[i * n + k];
            if !d_ik.is_finite() {
                continue;
            }
            let hop = next[i * n + k];
            for j in 0..n {
                let candidate = d_ik + row_k[j];
                if candidate < dist[i * n + j] {
                    dist[i * n + j] = candidate;
                    next[i * n + j] = hop;
                }
            }
        }
    }

    tracing::debug!(nodes = n, "floyd-warshall tables complete");

    AllPairs { n, dist, next }
}
