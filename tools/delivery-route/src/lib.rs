//! Delivery route planning over a road network graph
//!
//! Given an origin and a set of destination nodes, computes a closed tour
//! through every destination (nearest neighbor + 2-opt over shortest-path
//! distances) and expands it into road-level node paths and coordinates.

pub mod cli;
pub mod config;
pub mod engine;
pub mod geo;
pub mod graph;
pub mod loader;
pub mod matrix;
pub mod route;
pub mod search;
pub mod trip;

pub use config::{AlgorithmChoice, EngineConfig};
pub use delivery_common::{Algorithm, Coordinate, Error, NodeId, Result};
pub use engine::{PathResult, RouteEngine};
pub use graph::{Edge, Node, RoadGraph};
pub use matrix::DistanceMatrix;
pub use route::{Leg, Route};
pub use trip::{solve_tour, Tour};
