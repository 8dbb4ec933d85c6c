//! Route assembly: optimized tour → node sequence and per-leg geometry

use delivery_common::{Algorithm, Coordinate, Error, NodeId, Result};
use serde::Serialize;

use crate::geo::polyline_length;
use crate::matrix::DistanceMatrix;
use crate::search::path_weight;
use crate::trip::Tour;

/// One leg of a route, between two consecutive stops
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub from: NodeId,
    pub to: NodeId,
    /// Sum of edge weights along `nodes`
    pub distance: f64,
    /// Great-circle length of `coordinates` in metres
    pub length_m: f64,
    /// Full node path of the leg, both endpoints included
    pub nodes: Vec<NodeId>,
    /// Coordinates of `nodes`, one per node
    pub coordinates: Vec<Coordinate>,
}

/// 2-opt statistics for a route
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TourStats {
    pub seed_distance: f64,
    pub passes: usize,
    pub improvement_pct: f64,
}

/// A closed delivery route from the origin through every stop and back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub origin: NodeId,
    /// Destinations in visiting order
    pub stops: Vec<NodeId>,
    /// Full node sequence, origin at both ends, no duplicated leg boundaries
    pub nodes: Vec<NodeId>,
    pub total_distance: f64,
    pub algorithm: Algorithm,
    pub legs: Vec<Leg>,
    pub stats: TourStats,
}

impl Route {
    /// Coordinate segments, one per leg
    pub fn segments(&self) -> Vec<&[Coordinate]> {
        self.legs.iter().map(|leg| leg.coordinates.as_slice()).collect()
    }
}

/// `|expected - actual| <= tolerance`, scaled by `|expected|` once that exceeds 1
pub fn within_tolerance(expected: f64, actual: f64, tolerance: f64) -> bool {
    (expected - actual).abs() <= tolerance * expected.abs().max(1.0)
}

/// Expand `tour` into a concrete route using the paths stored in `matrix`.
///
/// Fails with `InternalInconsistency` if the measured legs do not add up to
/// the tour length.
pub fn assemble(matrix: &DistanceMatrix<'_>, tour: &Tour, tolerance: f64) -> Result<Route> {
    let graph = matrix.graph();
    let origin = matrix.point(0);

    let stats = TourStats {
        seed_distance: tour.seed_distance,
        passes: tour.passes,
        improvement_pct: tour.improvement_pct,
    };

    if matrix.len() == 1 {
        return Ok(Route {
            origin,
            stops: vec![],
            nodes: vec![origin],
            total_distance: 0.0,
            algorithm: matrix.algorithm(),
            legs: vec![],
            stats,
        });
    }

    let mut nodes: Vec<NodeId> = Vec::new();
    let mut legs = Vec::with_capacity(tour.order.len().saturating_sub(1));

    for hop in tour.order.windows(2) {
        let (i, j) = (hop[0], hop[1]);
        let (from, to) = (matrix.point(i), matrix.point(j));

        let path = matrix
            .leg_indices(i, j)
            .ok_or(Error::NoRouteExists { from, to })?;
        let distance = path_weight(graph, &path).ok_or(Error::InternalInconsistency {
            expected: matrix.distance(i, j),
            actual: f64::INFINITY,
        })?;

        let leg_nodes: Vec<NodeId> = path.iter().map(|&idx| graph.id_of(idx)).collect();
        let coordinates: Vec<Coordinate> = path
            .iter()
            .map(|&idx| graph.node_at(idx).coordinate())
            .collect();

        let length_m = polyline_length(&coordinates);

        let skip = usize::from(!nodes.is_empty());
        nodes.extend_from_slice(&leg_nodes[skip..]);

        tracing::trace!(from, to, distance, length_m, hops = path.len() - 1, "leg assembled");

        legs.push(Leg {
            from,
            to,
            distance,
            length_m,
            nodes: leg_nodes,
            coordinates,
        });
    }

    let measured: f64 = legs.iter().map(|leg| leg.distance).sum();
    if !within_tolerance(tour.total_distance, measured, tolerance) {
        tracing::warn!(
            expected = tour.total_distance,
            actual = measured,
            "route legs disagree with tour length"
        );
        return Err(Error::InternalInconsistency {
            expected: tour.total_distance,
            actual: measured,
        });
    }

    let stops = tour.order[1..tour.order.len() - 1]
        .iter()
        .map(|&i| matrix.point(i))
        .collect();

    Ok(Route {
        origin,
        stops,
        nodes,
        total_distance: tour.total_distance,
        algorithm: matrix.algorithm(),
        legs,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node, RoadGraph};
    use crate::trip::solve_tour;

    /// Directed triangle 1 -> 2 -> 3 -> 1 with a slow shortcut 1 -> 3
    fn triangle() -> RoadGraph {
        let nodes = vec![
            Node::new(1, 0.0, 0.0),
            Node::new(2, 0.0, 0.01),
            Node::new(3, 0.01, 0.01),
        ];
        let edges = vec![
            Edge::new(1, 2, 1.0),
            Edge::new(2, 3, 2.0),
            Edge::new(3, 1, 3.0),
            Edge::new(1, 3, 10.0),
        ];
        RoadGraph::from_parts(nodes, edges).unwrap()
    }

    #[test]
    fn test_assemble_concatenates_legs() {
        let g = triangle();
        let m = DistanceMatrix::build(&g, 1, &[3], Algorithm::Dijkstra, false).unwrap();
        let tour = solve_tour(m.as_flat(), m.len(), None);
        let route = assemble(&m, &tour, 1e-6).unwrap();

        assert_eq!(route.stops, vec![3]);
        assert_eq!(route.nodes, vec![1, 2, 3, 1]);
        assert_eq!(route.total_distance, 6.0);
        assert_eq!(route.legs.len(), 2);
        assert_eq!(route.legs[0].nodes, vec![1, 2, 3]);
        assert_eq!(route.legs[0].distance, 3.0);
        assert_eq!(route.legs[1].nodes, vec![3, 1]);

        let segments = route.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], &[Coordinate::new(0.01, 0.01), Coordinate::new(0.0, 0.0)]);
    }

    #[test]
    fn test_leg_length_follows_geometry() {
        let g = triangle();
        let m = DistanceMatrix::build(&g, 1, &[3], Algorithm::Dijkstra, false).unwrap();
        let tour = solve_tour(m.as_flat(), m.len(), None);
        let route = assemble(&m, &tour, 1e-6).unwrap();

        // 1 -> 2 -> 3 runs 0.01 degrees east then 0.01 degrees north
        let outbound = &route.legs[0];
        assert!((outbound.length_m - 2.0 * 1_111.95).abs() < 1.0, "got {}", outbound.length_m);
        assert_eq!(outbound.length_m, polyline_length(&outbound.coordinates));

        // The direct way back is the diagonal, shorter than the way out
        let inbound = &route.legs[1];
        assert!(inbound.length_m > 0.0);
        assert!(inbound.length_m < outbound.length_m);
    }

    #[test]
    fn test_assemble_origin_only() {
        let g = triangle();
        let m = DistanceMatrix::build(&g, 2, &[], Algorithm::FloydWarshall, false).unwrap();
        let tour = solve_tour(m.as_flat(), m.len(), None);
        let route = assemble(&m, &tour, 1e-6).unwrap();

        assert_eq!(route.nodes, vec![2]);
        assert_eq!(route.total_distance, 0.0);
        assert!(route.legs.is_empty());
        assert!(route.segments().is_empty());
    }

    #[test]
    fn test_assemble_detects_inconsistent_tour() {
        let g = triangle();
        let m = DistanceMatrix::build(&g, 1, &[2], Algorithm::Dijkstra, false).unwrap();
        let mut tour = solve_tour(m.as_flat(), m.len(), None);
        tour.total_distance += 1.0;

        let err = assemble(&m, &tour, 1e-6).unwrap_err();
        assert!(matches!(err, Error::InternalInconsistency { .. }));
    }

    #[test]
    fn test_within_tolerance() {
        assert!(within_tolerance(1000.0, 1000.0005, 1e-6));
        assert!(!within_tolerance(1000.0, 1000.01, 1e-6));
        assert!(within_tolerance(0.0, 5e-7, 1e-6));
        assert!(!within_tolerance(0.0, 1e-5, 1e-6));
    }
}
