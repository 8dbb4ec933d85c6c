//! Shared value types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Stable node identifier as supplied by the graph loader
pub type NodeId = i64;

/// A point in WGS84 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    /// Parse "lat,lon"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(Error::Parse(format!(
                "Coordinate must be in format 'lat,lon', got '{s}'"
            )));
        }
        let parse = |p: &str| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| Error::Parse(format!("Invalid coordinate component '{p}': {e}")))
        };
        let coord = Coordinate::new(parse(parts[0])?, parse(parts[1])?);
        if !coord.is_valid() {
            return Err(Error::Parse(format!("Coordinate out of range: '{s}'")));
        }
        Ok(coord)
    }
}

/// Shortest-path strategy used to fill the distance matrix.
///
/// This only changes how pairwise distances are computed; the tour heuristic
/// is the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// One single-source search per point of interest
    #[default]
    Dijkstra,
    /// One all-pairs pass over the whole graph
    FloydWarshall,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::FloydWarshall => "floyd_warshall",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "floyd_warshall" | "floyd-warshall" => Ok(Algorithm::FloydWarshall),
            _ => Err(Error::Parse(format!(
                "Invalid algorithm: {s}. Use dijkstra or floyd_warshall."
            ))),
        }
    }
}
