//! Route engine facade
//!
//! Owns a shared read-only graph and the engine config. Each call is
//! independent: matrices, trees and tours live only for that call.

use std::sync::Arc;

use delivery_common::{Algorithm, Coordinate, NodeId, Result};
use serde::Serialize;

use crate::config::{AlgorithmChoice, EngineConfig};
use crate::graph::RoadGraph;
use crate::matrix::{points_of_interest, DistanceMatrix};
use crate::route::{assemble, Route};
use crate::search::{dijkstra, floyd_warshall};
use crate::trip::solve_tour;

/// Point-to-point shortest path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub from: NodeId,
    pub to: NodeId,
    pub algorithm: Algorithm,
    pub distance: f64,
    pub nodes: Vec<NodeId>,
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Clone)]
pub struct RouteEngine {
    graph: Arc<RoadGraph>,
    config: EngineConfig,
}

impl RouteEngine {
    pub fn new(graph: Arc<RoadGraph>) -> Self {
        Self {
            graph,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(graph: Arc<RoadGraph>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { graph, config })
    }

    pub fn graph(&self) -> &Arc<RoadGraph> {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Plan a closed route from `origin` through every destination and back.
    ///
    /// Duplicate destinations (and the origin itself) are ignored. The
    /// algorithm only changes how distances are computed.
    pub fn compute_route(
        &self,
        origin: NodeId,
        destinations: &[NodeId],
        algorithm: impl Into<AlgorithmChoice>,
    ) -> Result<Route> {
        let choice = algorithm.into();
        let points = points_of_interest(origin, destinations).len();
        let algorithm = self
            .config
            .resolve(choice, points, self.graph.node_count());

        tracing::debug!(origin, points, %algorithm, ?choice, "computing route");

        let matrix = DistanceMatrix::build(
            &self.graph,
            origin,
            destinations,
            algorithm,
            self.config.parallel,
        )?;
        let tour = solve_tour(matrix.as_flat(), matrix.len(), self.config.max_two_opt_passes);
        let route = assemble(&matrix, &tour, self.config.distance_tolerance)?;

        tracing::debug!(
            origin,
            stops = route.stops.len(),
            nodes = route.nodes.len(),
            total_distance = route.total_distance,
            "route computed"
        );

        Ok(route)
    }

    /// Shortest path between two nodes, `None` when `to` is unreachable
    pub fn shortest_path(
        &self,
        from: NodeId,
        to: NodeId,
        algorithm: impl Into<AlgorithmChoice>,
    ) -> Result<Option<PathResult>> {
        let source = self.graph.index_of(from)?;
        let target = self.graph.index_of(to)?;
        let points = if from == to { 1 } else { 2 };
        let algorithm = self
            .config
            .resolve(algorithm.into(), points, self.graph.node_count());

        let (distance, path) = match algorithm {
            Algorithm::Dijkstra => {
                let tree = dijkstra(&self.graph, source);
                (tree.distance(target), tree.path_to(target))
            }
            Algorithm::FloydWarshall => {
                let all_pairs = floyd_warshall(&self.graph);
                (all_pairs.distance(source, target), all_pairs.path(source, target))
            }
        };

        let Some(path) = path else {
            tracing::debug!(from, to, %algorithm, "no path");
            return Ok(None);
        };

        Ok(Some(PathResult {
            from,
            to,
            algorithm,
            distance,
            nodes: path.iter().map(|&idx| self.graph.id_of(idx)).collect(),
            coordinates: path
                .iter()
                .map(|&idx| self.graph.node_at(idx).coordinate())
                .collect(),
        }))
    }
}
