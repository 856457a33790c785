//! Search limits and heuristic choice, loaded from TOML.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::heuristic::HeuristicKind;

/// Solver configuration. Every field is optional in the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Stop after expanding this many nodes and report the search as aborted.
    /// Unlimited when absent.
    pub max_nodes: Option<usize>,

    /// Depth cap for depth-first search. When absent the cap is
    /// `width * height * max(1, boxes)`.
    pub dfs_max_depth: Option<usize>,

    /// Heuristic used by A*.
    pub heuristic: HeuristicKind,
}

impl SolverConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        tracing::info!(path = %path.display(), "Loaded solver config");
        Ok(config)
    }
}
