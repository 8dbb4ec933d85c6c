//! Road network graph store
//!
//! Immutable after construction. Nodes keep their loader-supplied ids; the
//! solvers work in dense index space (`0..node_count`) and translate at the
//! boundary. Outgoing edges are stored as a flat CSR (offsets / heads /
//! weights) in the order they were supplied, so every traversal is
//! deterministic.

use delivery_common::{Coordinate, Error, NodeId, Result};
use rstar::{primitives::GeomWithData, RTree};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A road network node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn new(id: NodeId, lat: f64, lon: f64) -> Self {
        Self { id, lat, lon }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// A directed, weighted road segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, weight: f64) -> Self {
        Self { from, to, weight }
    }
}

#[derive(Debug)]
pub struct RoadGraph {
    nodes: Vec<Node>,
    node_map: FxHashMap<NodeId, usize>,
    offsets: Vec<usize>, // n_nodes + 1
    heads: Vec<usize>,
    weights: Vec<f64>,
    spatial_index: RTree<GeomWithData<[f64; 2], usize>>, // [lon, lat], node index
}

impl RoadGraph {
    /// Build a graph from node and edge lists, enforcing the load-time invariants:
    /// unique node ids, valid coordinates, edge endpoints that exist and
    /// finite non-negative weights.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        let mut node_map = FxHashMap::default();
        node_map.reserve(nodes.len());

        for (idx, node) in nodes.iter().enumerate() {
            if !node.coordinate().is_valid() {
                return Err(Error::InvalidCoordinate {
                    id: node.id,
                    lat: node.lat,
                    lon: node.lon,
                });
            }
            if node_map.insert(node.id, idx).is_some() {
                return Err(Error::DuplicateNode(node.id));
            }
        }

        // Resolve endpoints first so the CSR fill below cannot fail halfway
        let mut resolved = Vec::with_capacity(edges.len());
        for edge in &edges {
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(Error::InvalidWeight {
                    from: edge.from,
                    to: edge.to,
                    weight: edge.weight,
                });
            }
            let from = *node_map.get(&edge.from).ok_or(Error::DanglingEdge {
                from: edge.from,
                to: edge.to,
                missing: edge.from,
            })?;
            let to = *node_map.get(&edge.to).ok_or(Error::DanglingEdge {
                from: edge.from,
                to: edge.to,
                missing: edge.to,
            })?;
            resolved.push((from, to, edge.weight));
        }

        // Counting sort by source, stable with respect to input order
        let n = nodes.len();
        let mut offsets = vec![0usize; n + 1];
        for &(from, _, _) in &resolved {
            offsets[from + 1] += 1;
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let mut heads = vec![0usize; resolved.len()];
        let mut weights = vec![0.0f64; resolved.len()];
        for &(from, to, weight) in &resolved {
            let slot = cursor[from];
            heads[slot] = to;
            weights[slot] = weight;
            cursor[from] += 1;
        }

        let points: Vec<GeomWithData<[f64; 2], usize>> = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| GeomWithData::new([node.lon, node.lat], idx))
            .collect();
        let spatial_index = RTree::bulk_load(points);

        tracing::debug!(nodes = n, edges = heads.len(), "built road graph");

        Ok(RoadGraph {
            nodes,
            node_map,
            offsets,
            heads,
            weights,
            spatial_index,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.heads.len()
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.node_map.contains_key(&id)
    }

    /// Dense index of a node id
    pub fn index_of(&self, id: NodeId) -> Result<usize> {
        self.node_map.get(&id).copied().ok_or(Error::UnknownNode(id))
    }

    /// Node id at a dense index. Panics on an out-of-range index.
    #[inline]
    pub fn id_of(&self, idx: usize) -> NodeId {
        self.nodes[idx].id
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        Ok(&self.nodes[self.index_of(id)?])
    }

    #[inline]
    pub fn node_at(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub fn coordinate(&self, id: NodeId) -> Result<Coordinate> {
        self.node(id).map(Node::coordinate)
    }

    /// Outgoing edges of a node as `(neighbor_id, weight)`, in load order
    pub fn neighbors(&self, id: NodeId) -> Result<impl Iterator<Item = (NodeId, f64)> + '_> {
        let idx = self.index_of(id)?;
        Ok(self
            .neighbors_by_index(idx)
            .map(move |(v, w)| (self.nodes[v].id, w)))
    }

    /// Outgoing edges in index space
    #[inline(always)]
    pub fn neighbors_by_index(&self, idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        (start..end).map(move |i| (self.heads[i], self.weights[i]))
    }

    /// Lightest edge `from -> to`, if any. Parallel edges collapse to their minimum.
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let from_idx = self.node_map.get(&from)?;
        let to_idx = self.node_map.get(&to)?;
        self.edge_weight_by_index(*from_idx, *to_idx)
    }

    pub fn edge_weight_by_index(&self, from: usize, to: usize) -> Option<f64> {
        self.neighbors_by_index(from)
            .filter(|&(v, _)| v == to)
            .map(|(_, w)| w)
            .reduce(f64::min)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All edges in load order per source node
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.nodes.len()).flat_map(move |u| {
            self.neighbors_by_index(u)
                .map(move |(v, w)| Edge::new(self.nodes[u].id, self.nodes[v].id, w))
        })
    }

    /// Nearest node to a coordinate using the R-tree (planar lon/lat metric)
    pub fn nearest_node(&self, at: Coordinate) -> Option<NodeId> {
        self.spatial_index
            .nearest_neighbor(&[at.lon, at.lat])
            .map(|point| self.nodes[point.data].id)
    }
}
