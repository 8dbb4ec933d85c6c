//! JSON road network format
//!
//! ```json
//! {
//!   "nodes": [{"id": 1, "lat": -12.05, "lon": -77.04}, ...],
//!   "edges": [{"from": 1, "to": 2, "weight": 120.5, "oneway": false}, ...]
//! }
//! ```
//!
//! `weight` defaults to the haversine length between the endpoints in
//! metres. Edges are two-way unless `oneway` is set; a two-way edge becomes
//! a pair of directed edges.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use delivery_common::{Coordinate, Error, NodeId, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::geo::haversine_distance;
use crate::graph::{Edge, Node, RoadGraph};

#[derive(Debug, Serialize, Deserialize)]
struct GraphFile {
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    from: NodeId,
    to: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    #[serde(default)]
    oneway: bool,
}

pub fn load_graph(path: &Path) -> Result<RoadGraph> {
    let file = File::open(path)?;
    let graph = read_graph(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), nodes = graph.node_count(), "loaded graph");
    Ok(graph)
}

pub fn read_graph<R: Read>(reader: R) -> Result<RoadGraph> {
    let file: GraphFile =
        serde_json::from_reader(reader).map_err(|e| Error::Parse(e.to_string()))?;
    into_graph(file)
}

pub fn parse_graph(json: &str) -> Result<RoadGraph> {
    let file: GraphFile = serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
    into_graph(file)
}

fn into_graph(file: GraphFile) -> Result<RoadGraph> {
    let coords: FxHashMap<NodeId, Coordinate> = file
        .nodes
        .iter()
        .map(|node| (node.id, node.coordinate()))
        .collect();

    let mut edges = Vec::with_capacity(file.edges.len() * 2);
    for record in &file.edges {
        let weight = match record.weight {
            Some(w) => w,
            // Unknown endpoints are reported by the graph builder
            None => match (coords.get(&record.from), coords.get(&record.to)) {
                (Some(&a), Some(&b)) => haversine_distance(a, b),
                _ => 0.0,
            },
        };
        edges.push(Edge::new(record.from, record.to, weight));
        if !record.oneway {
            edges.push(Edge::new(record.to, record.from, weight));
        }
    }

    RoadGraph::from_parts(file.nodes, edges)
}

/// Serialize a graph as JSON, one directed `oneway` record per edge
pub fn to_json(graph: &RoadGraph) -> Result<String> {
    let file = GraphFile {
        nodes: graph.nodes().copied().collect(),
        edges: graph
            .edges()
            .map(|edge| EdgeRecord {
                from: edge.from,
                to: edge.to,
                weight: Some(edge.weight),
                oneway: true,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| Error::Parse(e.to_string()))
}
