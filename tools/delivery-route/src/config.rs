//! Engine configuration
//!
//! Loaded from a TOML file or built from defaults. Every key is optional.

use std::path::Path;
use std::str::FromStr;

use delivery_common::{Algorithm, Error, Result};
use serde::{Deserialize, Serialize};

/// Tunables for [`crate::engine::RouteEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// 2-opt pass cap; `None` means n² for n points
    #[serde(default)]
    pub max_two_opt_passes: Option<usize>,

    /// Allowed gap between the tour length and the summed leg weights
    #[serde(default = "default_tolerance")]
    pub distance_tolerance: f64,

    /// Run per-point Dijkstra searches on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// `auto` picks Floyd–Warshall once points >= ratio × node count
    #[serde(default = "default_fw_ratio")]
    pub floyd_warshall_ratio: f64,
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_true() -> bool {
    true
}

fn default_fw_ratio() -> f64 {
    0.5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_two_opt_passes: None,
            distance_tolerance: default_tolerance(),
            parallel: true,
            floyd_warshall_ratio: default_fw_ratio(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.distance_tolerance.is_finite() || self.distance_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "distance_tolerance must be finite and >= 0, got {}",
                self.distance_tolerance
            )));
        }
        if !(self.floyd_warshall_ratio > 0.0 && self.floyd_warshall_ratio <= 1.0) {
            return Err(Error::Config(format!(
                "floyd_warshall_ratio must be in (0, 1], got {}",
                self.floyd_warshall_ratio
            )));
        }
        if self.max_two_opt_passes == Some(0) {
            return Err(Error::Config("max_two_opt_passes must be at least 1".into()));
        }
        Ok(())
    }

    /// Pick a concrete algorithm for `points` points on a graph of `nodes` nodes
    pub fn resolve(&self, choice: AlgorithmChoice, points: usize, nodes: usize) -> Algorithm {
        match choice {
            AlgorithmChoice::Dijkstra => Algorithm::Dijkstra,
            AlgorithmChoice::FloydWarshall => Algorithm::FloydWarshall,
            AlgorithmChoice::Auto => {
                if nodes > 0 && points as f64 >= self.floyd_warshall_ratio * nodes as f64 {
                    Algorithm::FloydWarshall
                } else {
                    Algorithm::Dijkstra
                }
            }
        }
    }
}

impl FromStr for EngineConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Algorithm as requested by a caller, before resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmChoice {
    /// Let the engine decide from the point and node counts
    #[default]
    Auto,
    Dijkstra,
    FloydWarshall,
}

impl From<Algorithm> for AlgorithmChoice {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Dijkstra => AlgorithmChoice::Dijkstra,
            Algorithm::FloydWarshall => AlgorithmChoice::FloydWarshall,
        }
    }
}

impl FromStr for AlgorithmChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(AlgorithmChoice::Auto);
        }
        s.parse::<Algorithm>().map(AlgorithmChoice::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: EngineConfig = "".parse().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.distance_tolerance, 1e-6);
        assert!(config.parallel);
    }

    #[test]
    fn test_parse_all_keys() {
        let config: EngineConfig = r#"
            max_two_opt_passes = 50
            distance_tolerance = 0.001
            parallel = false
            floyd_warshall_ratio = 0.25
        "#
        .parse()
        .unwrap();
        assert_eq!(config.max_two_opt_passes, Some(50));
        assert_eq!(config.distance_tolerance, 0.001);
        assert!(!config.parallel);
        assert_eq!(config.floyd_warshall_ratio, 0.25);
    }

    #[test]
    fn test_rejects_unknown_and_invalid_values() {
        assert!(matches!(
            "max_passes = 3".parse::<EngineConfig>(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            "distance_tolerance = -1.0".parse::<EngineConfig>(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            "floyd_warshall_ratio = 0.0".parse::<EngineConfig>(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            "max_two_opt_passes = 0".parse::<EngineConfig>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "parallel = false\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert!(!config.parallel);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(EngineConfig::load(&missing), Err(Error::Io(_))));
    }

    #[test]
    fn test_resolve_algorithm_choice() {
        let config = EngineConfig::default();
        assert_eq!(
            config.resolve(AlgorithmChoice::Auto, 3, 100),
            Algorithm::Dijkstra
        );
        assert_eq!(
            config.resolve(AlgorithmChoice::Auto, 50, 100),
            Algorithm::FloydWarshall
        );
        assert_eq!(
            config.resolve(AlgorithmChoice::Dijkstra, 100, 100),
            Algorithm::Dijkstra
        );
        assert_eq!(
            config.resolve(AlgorithmChoice::FloydWarshall, 1, 100),
            Algorithm::FloydWarshall
        );
    }

    #[test]
    fn test_parse_algorithm_choice() {
        assert_eq!("AUTO".parse::<AlgorithmChoice>().unwrap(), AlgorithmChoice::Auto);
        assert_eq!(
            "floyd-warshall".parse::<AlgorithmChoice>().unwrap(),
            AlgorithmChoice::FloydWarshall
        );
        assert!("bellman".parse::<AlgorithmChoice>().is_err());
    }
}
