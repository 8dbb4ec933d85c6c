//! Single-source Dijkstra with parent pointers

use std::cmp::Ordering;

use delivery_common::{NodeId, Result};
use priority_queue::PriorityQueue;

use super::NO_NODE;
use crate::graph::RoadGraph;

/// Heap key: lower distance first, then earlier discovery.
///
/// `PriorityQueue` pops the greatest priority, so the ordering is reversed.
#[derive(Debug, Clone, Copy)]
struct Priority {
    dist: f64,
    seq: u32,
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Shortest-path tree rooted at one source, in graph index space
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: usize,
    dist: Vec<f64>,
    parent: Vec<usize>,
    settled: usize,
}

impl ShortestPathTree {
    /// Distance to `target`, `f64::INFINITY` when unreachable
    #[inline]
    pub fn distance(&self, target: usize) -> f64 {
        self.dist[target]
    }

    #[inline]
    pub fn is_reachable(&self, target: usize) -> bool {
        self.dist[target].is_finite()
    }

    /// Predecessor of `target` on its shortest path (none for the source and unreachable nodes)
    pub fn parent(&self, target: usize) -> Option<usize> {
        match self.parent[target] {
            NO_NODE => None,
            p => Some(p),
        }
    }

    /// Number of nodes settled by the search
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Node indices from the source to `target`, or `None` when unreachable
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        if !self.is_reachable(target) {
            return None;
        }

        let mut path = vec![target];
        let mut curr = target;
        while curr != self.source {
            curr = self.parent[curr];
            if curr == NO_NODE {
                return None;
            }
            path.push(curr);
        }
        path.reverse();
        Some(path)
    }

    /// Node ids from the source to `target`.
    ///
    /// Fails with `UnknownNode` for an id outside the graph; an unreachable
    /// target is `Ok(None)`.
    pub fn reconstruct_path(&self, graph: &RoadGraph, target: NodeId) -> Result<Option<Vec<NodeId>>> {
        let target = graph.index_of(target)?;
        Ok(self
            .path_to(target)
            .map(|path| path.into_iter().map(|idx| graph.id_of(idx)).collect()))
    }
}

/// Run Dijkstra from a node index over the whole graph.
///
/// Ties in the queue are broken by discovery order, so equal-cost
/// alternatives always resolve the same way.
pub fn dijkstra(graph: &RoadGraph, source: usize) -> ShortestPathTree {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut parent = vec![NO_NODE; n];
    let mut seq = vec![u32::MAX; n];
    let mut next_seq = 0u32;
    let mut pq: PriorityQueue<usize, Priority> = PriorityQueue::new();
    let mut settled = 0usize;

    dist[source] = 0.0;
    seq[source] = next_seq;
    next_seq += 1;
    pq.push(source, Priority { dist: 0.0, seq: 0 });

    while let Some((u, Priority { dist: d, .. })) = pq.pop() {
        settled += 1;

        for (v, w) in graph.neighbors_by_index(u) {
            let new_dist = d + w;
            // Settled nodes never pass this check: weights are non-negative
            if new_dist < dist[v] {
                dist[v] = new_dist;
                parent[v] = u;
                if seq[v] == u32::MAX {
                    seq[v] = next_seq;
                    next_seq += 1;
                }
                pq.push_increase(
                    v,
                    Priority {
                        dist: new_dist,
                        seq: seq[v],
                    },
                );
            }
        }
    }

    ShortestPathTree {
        source,
        dist,
        parent,
        settled,
    }
}

/// Run Dijkstra from a node id
pub fn dijkstra_from(graph: &RoadGraph, source: NodeId) -> Result<ShortestPathTree> {
    let source = graph.index_of(source)?;
    Ok(dijkstra(graph, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};
    use delivery_common::Error;

    fn graph(n: i64, edges: &[(i64, i64, f64)]) -> RoadGraph {
        let nodes = (1..=n)
            .map(|id| Node::new(id, 0.0, id as f64 * 0.001))
            .collect();
        let edges = edges
            .iter()
            .map(|&(a, b, w)| Edge::new(a, b, w))
            .collect();
        RoadGraph::from_parts(nodes, edges).unwrap()
    }

    #[test]
    fn test_distances_and_paths() {
        // 1 -> 2 -> 4 is cheaper than 1 -> 3 -> 4
        let g = graph(
            4,
            &[(1, 2, 1.0), (1, 3, 2.0), (2, 4, 1.5), (3, 4, 1.0)],
        );
        let tree = dijkstra_from(&g, 1).unwrap();

        assert_eq!(tree.distance(g.index_of(4).unwrap()), 2.5);
        assert_eq!(tree.reconstruct_path(&g, 4).unwrap(), Some(vec![1, 2, 4]));
        assert_eq!(tree.reconstruct_path(&g, 1).unwrap(), Some(vec![1]));
        assert_eq!(tree.parent(g.index_of(1).unwrap()), None);
        assert_eq!(tree.settled(), 4);
    }

    #[test]
    fn test_unreachable_is_not_an_error() {
        let g = graph(3, &[(1, 2, 1.0)]);
        let tree = dijkstra_from(&g, 1).unwrap();
        let idx3 = g.index_of(3).unwrap();

        assert!(tree.distance(idx3).is_infinite());
        assert_eq!(tree.parent(idx3), None);
        assert_eq!(tree.reconstruct_path(&g, 3).unwrap(), None);
    }

    #[test]
    fn test_unknown_nodes_fail() {
        let g = graph(2, &[(1, 2, 1.0)]);
        assert!(matches!(dijkstra_from(&g, 9), Err(Error::UnknownNode(9))));

        let tree = dijkstra_from(&g, 1).unwrap();
        assert!(matches!(
            tree.reconstruct_path(&g, 9),
            Err(Error::UnknownNode(9))
        ));
    }

    #[test]
    fn test_directed_edges_are_respected() {
        let g = graph(2, &[(1, 2, 3.0)]);
        let tree = dijkstra_from(&g, 2).unwrap();
        assert_eq!(tree.reconstruct_path(&g, 1).unwrap(), None);
    }

    #[test]
    fn test_equal_cost_tie_goes_to_first_discovered() {
        // Two equal-cost routes to 4: via 2 (discovered first) and via 3
        let g = graph(
            4,
            &[(1, 2, 1.0), (1, 3, 1.0), (2, 4, 1.0), (3, 4, 1.0)],
        );
        for _ in 0..5 {
            let tree = dijkstra_from(&g, 1).unwrap();
            assert_eq!(tree.reconstruct_path(&g, 4).unwrap(), Some(vec![1, 2, 4]));
        }

        // Reversing edge load order flips the discovery order
        let g = graph(
            4,
            &[(1, 3, 1.0), (1, 2, 1.0), (3, 4, 1.0), (2, 4, 1.0)],
        );
        let tree = dijkstra_from(&g, 1).unwrap();
        assert_eq!(tree.reconstruct_path(&g, 4).unwrap(), Some(vec![1, 3, 4]));
    }

    #[test]
    fn test_zero_weight_edges_and_cycles() {
        let g = graph(
            3,
            &[(1, 2, 0.0), (2, 1, 0.0), (2, 3, 0.0), (3, 1, 0.0)],
        );
        let tree = dijkstra_from(&g, 1).unwrap();
        assert_eq!(tree.distance(g.index_of(3).unwrap()), 0.0);
        assert_eq!(tree.reconstruct_path(&g, 3).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_decrease_key_updates_parent() {
        // 3 is first discovered through the expensive direct edge
        let g = graph(3, &[(1, 3, 10.0), (1, 2, 1.0), (2, 3, 1.0)]);
        let tree = dijkstra_from(&g, 1).unwrap();
        assert_eq!(tree.distance(g.index_of(3).unwrap()), 2.0);
        assert_eq!(tree.reconstruct_path(&g, 3).unwrap(), Some(vec![1, 2, 3]));
    }
}
