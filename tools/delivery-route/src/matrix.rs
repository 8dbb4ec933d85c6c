//! Distance matrix over the points of interest of one request
//!
//! Point 0 is the origin, followed by the distinct destinations in the
//! order they were first given. The matrix keeps the solver output it was
//! built from so legs can be expanded into node paths without searching
//! again.

use delivery_common::{Algorithm, Error, NodeId, Result};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::graph::RoadGraph;
use crate::search::{dijkstra, floyd_warshall, AllPairs, ShortestPathTree};

/// Read-only path information backing a matrix
#[derive(Debug)]
enum PathTable {
    /// One shortest-path tree per point, in point order
    Trees(Vec<ShortestPathTree>),
    /// A single all-pairs table over the whole graph
    AllPairs(AllPairs),
}

#[derive(Debug)]
pub struct DistanceMatrix<'g> {
    graph: &'g RoadGraph,
    algorithm: Algorithm,
    points: Vec<NodeId>,
    indices: Vec<usize>,
    distances: Vec<f64>,
    paths: PathTable,
}

/// Origin followed by the distinct destinations, first appearance wins.
/// A destination equal to the origin is dropped.
pub fn points_of_interest(origin: NodeId, destinations: &[NodeId]) -> Vec<NodeId> {
    let mut seen = FxHashSet::default();
    seen.insert(origin);

    let mut points = Vec::with_capacity(destinations.len() + 1);
    points.push(origin);
    for &dest in destinations {
        if seen.insert(dest) {
            points.push(dest);
        }
    }
    points
}

impl<'g> DistanceMatrix<'g> {
    /// Build the matrix for `origin` and `destinations`.
    ///
    /// Every id is checked before any search runs. Fails with `NoRouteExists`
    /// for the first unreachable pair in row-major order.
    pub fn build(
        graph: &'g RoadGraph,
        origin: NodeId,
        destinations: &[NodeId],
        algorithm: Algorithm,
        parallel: bool,
    ) -> Result<Self> {
        let points = points_of_interest(origin, destinations);
        let indices = points
            .iter()
            .map(|&id| graph.index_of(id))
            .collect::<Result<Vec<usize>>>()?;
        let n = points.len();

        let paths = match algorithm {
            Algorithm::Dijkstra => {
                let trees: Vec<ShortestPathTree> = if parallel {
                    indices.par_iter().map(|&s| dijkstra(graph, s)).collect()
                } else {
                    indices.iter().map(|&s| dijkstra(graph, s)).collect()
                };
                PathTable::Trees(trees)
            }
            Algorithm::FloydWarshall => PathTable::AllPairs(floyd_warshall(graph)),
        };

        let mut distances = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                let d = match &paths {
                    PathTable::Trees(trees) => trees[i].distance(indices[j]),
                    PathTable::AllPairs(ap) => ap.distance(indices[i], indices[j]),
                };
                if !d.is_finite() {
                    return Err(Error::NoRouteExists {
                        from: points[i],
                        to: points[j],
                    });
                }
                distances[i * n + j] = d;
            }
        }

        tracing::debug!(points = n, %algorithm, parallel, "distance matrix built");

        Ok(DistanceMatrix {
            graph,
            algorithm,
            points,
            indices,
            distances,
            paths,
        })
    }

    /// Number of points (origin included)
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn graph(&self) -> &'g RoadGraph {
        self.graph
    }

    /// Node id of point `i`
    pub fn point(&self, i: usize) -> NodeId {
        self.points[i]
    }

    pub fn points(&self) -> &[NodeId] {
        &self.points
    }

    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i * self.points.len() + j]
    }

    /// Row-major `n × n` view
    pub fn as_flat(&self) -> &[f64] {
        &self.distances
    }

    /// Graph node indices of the shortest path from point `i` to point `j`
    pub fn leg_indices(&self, i: usize, j: usize) -> Option<Vec<usize>> {
        match &self.paths {
            PathTable::Trees(trees) => trees[i].path_to(self.indices[j]),
            PathTable::AllPairs(ap) => ap.path(self.indices[i], self.indices[j]),
        }
    }

    /// Node ids of the shortest path from point `i` to point `j`
    pub fn leg_path(&self, i: usize, j: usize) -> Option<Vec<NodeId>> {
        self.leg_indices(i, j)
            .map(|path| path.into_iter().map(|idx| self.graph.id_of(idx)).collect())
    }
}
