//! CLI commands for delivery-route

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use delivery_common::{Coordinate, NodeId};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::{AlgorithmChoice, EngineConfig};
use crate::engine::RouteEngine;
use crate::graph::RoadGraph;
use crate::loader::{load_graph, to_json};

#[derive(Parser)]
#[command(name = "delivery-route")]
#[command(about = "Multi-stop delivery route planning over a road graph", long_about = None)]
pub struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print graph statistics
    Info {
        /// Graph file (JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Dump every node and edge as JSON
        #[arg(long)]
        list: bool,
    },

    /// Plan a round trip from the origin through all destinations
    Route {
        /// Graph file (JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Origin node id
        #[arg(long, required_unless_present = "origin_at", conflicts_with = "origin_at")]
        origin: Option<NodeId>,

        /// Origin coordinate (lat,lon), snapped to the nearest node
        #[arg(long)]
        origin_at: Option<String>,

        /// Destination node ids, comma separated
        #[arg(long, value_delimiter = ',')]
        destinations: Vec<NodeId>,

        /// Destination coordinate (lat,lon), snapped; repeatable
        #[arg(long)]
        stop_at: Vec<String>,

        /// auto, dijkstra or floyd_warshall
        #[arg(short, long, default_value = "auto")]
        algorithm: AlgorithmChoice,

        /// Engine config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Shortest path between two nodes
    Path {
        /// Graph file (JSON)
        #[arg(short, long)]
        graph: PathBuf,

        #[arg(long)]
        from: NodeId,

        #[arg(long)]
        to: NodeId,

        /// auto, dijkstra or floyd_warshall
        #[arg(short, long, default_value = "auto")]
        algorithm: AlgorithmChoice,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Find the node nearest to a coordinate
    Snap {
        /// Graph file (JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Coordinate (lat,lon)
        #[arg(long)]
        at: String,
    },
}

/// Install the tracing subscriber on stderr
pub fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

fn open_graph(path: &Path) -> Result<Arc<RoadGraph>> {
    let start = Instant::now();
    let graph = load_graph(path)
        .with_context(|| format!("Failed to load graph from {}", path.display()))?;
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "graph loaded"
    );
    Ok(Arc::new(graph))
}

fn snap(graph: &RoadGraph, at: &str) -> Result<NodeId> {
    let coord: Coordinate = at.parse()?;
    graph
        .nearest_node(coord)
        .with_context(|| format!("No node near {at}: graph is empty"))
}

fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let out = self.command.execute()?;
        println!("{out}");
        Ok(())
    }
}

impl Commands {
    /// Run the command and return what it prints on stdout
    pub fn execute(self) -> Result<String> {
        match self {
            Commands::Info { graph, list } => info(&graph, list),
            Commands::Route {
                graph,
                origin,
                origin_at,
                destinations,
                stop_at,
                algorithm,
                config,
                pretty,
            } => {
                let config = match config {
                    Some(path) => EngineConfig::load(&path)
                        .with_context(|| format!("Failed to load config {}", path.display()))?,
                    None => EngineConfig::default(),
                };
                let request = RouteRequest {
                    origin,
                    origin_at,
                    destinations,
                    stop_at,
                    algorithm,
                };
                route(&graph, request, config, pretty)
            }
            Commands::Path {
                graph,
                from,
                to,
                algorithm,
                pretty,
            } => path(&graph, from, to, algorithm, pretty),
            Commands::Snap { graph, at } => snap_point(&graph, &at),
        }
    }
}

fn info(path: &Path, list: bool) -> Result<String> {
    let graph = open_graph(path)?;
    if list {
        Ok(to_json(&graph)?)
    } else {
        Ok(format!(
            "Nodes: {}\nEdges: {}",
            graph.node_count(),
            graph.edge_count()
        ))
    }
}

/// Route stops as given on the command line, before snapping
struct RouteRequest {
    origin: Option<NodeId>,
    origin_at: Option<String>,
    destinations: Vec<NodeId>,
    stop_at: Vec<String>,
    algorithm: AlgorithmChoice,
}

fn route(path: &Path, request: RouteRequest, config: EngineConfig, pretty: bool) -> Result<String> {
    let graph = open_graph(path)?;

    let origin = match (request.origin, request.origin_at) {
        (Some(id), _) => id,
        (None, Some(at)) => snap(&graph, &at)?,
        (None, None) => anyhow::bail!("Either --origin or --origin-at is required"),
    };
    let mut stops = request.destinations;
    for at in &request.stop_at {
        stops.push(snap(&graph, at)?);
    }

    let engine = RouteEngine::with_config(graph, config)?;
    let start = Instant::now();
    let route = engine
        .compute_route(origin, &stops, request.algorithm)
        .with_context(|| format!("Failed to plan route from node {origin}"))?;
    tracing::info!(
        stops = route.stops.len(),
        total_distance = route.total_distance,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "route planned"
    );

    render_json(&route, pretty)
}

fn path(
    graph: &Path,
    from: NodeId,
    to: NodeId,
    algorithm: AlgorithmChoice,
    pretty: bool,
) -> Result<String> {
    let engine = RouteEngine::new(open_graph(graph)?);
    match engine.shortest_path(from, to, algorithm)? {
        Some(path) => render_json(&path, pretty),
        None => anyhow::bail!("No path from node {from} to node {to}"),
    }
}

fn snap_point(path: &Path, at: &str) -> Result<String> {
    let graph = open_graph(path)?;
    let id = snap(&graph, at)?;
    let node = graph.node(id)?;
    Ok(format!("{} ({}, {})", node.id, node.lat, node.lon))
}
