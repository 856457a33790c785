//! Request and response types of the solver service, independent of the
//! transport carrying them.
//!
//! Every handler returns a structured response; malformed input becomes an
//! `error` field, never a panic.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::game::Game;
use crate::levels::{Level, LevelCatalog};
use crate::solver::{Algorithm, Outcome, SolveResult, Solver};
use crate::validate::{ValidationReport, validate_map};

fn default_algorithm() -> String {
    "astar".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub map: Vec<String>,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    pub nodes_explored: usize,
    /// Search time in seconds.
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SolveResponse {
    fn failed(error: String) -> Self {
        SolveResponse {
            success: false,
            path: None,
            nodes_explored: 0,
            time: 0.0,
            algorithm: None,
            error: Some(error),
        }
    }
}

impl From<&SolveResult> for SolveResponse {
    fn from(result: &SolveResult) -> Self {
        let (success, path, error) = match &result.outcome {
            Outcome::Solved(path) => (
                true,
                Some(path.iter().map(|dir| dir.code().to_string()).collect()),
                None,
            ),
            Outcome::Exhausted => (false, None, None),
            Outcome::Aborted => (
                false,
                None,
                Some(format!(
                    "Search aborted after exploring {} nodes",
                    result.nodes_explored
                )),
            ),
        };
        SolveResponse {
            success,
            path,
            nodes_explored: result.nodes_explored,
            time: result.elapsed.as_secs_f64(),
            algorithm: Some(result.algorithm.label().to_string()),
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub map: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelResponse {
    pub success: bool,
    pub level: Vec<String>,
    /// 1-indexed position of `level` in its bucket.
    pub level_index: usize,
    pub total_levels: usize,
}

/// Every predefined level, keyed by difficulty bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllLevelsResponse {
    pub success: bool,
    pub levels: BTreeMap<String, Vec<Level>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// The service handlers, bound to an injected read-only level catalog.
pub struct Service<'a> {
    catalog: &'a LevelCatalog,
    solver: Solver,
}

impl<'a> Service<'a> {
    pub fn new(catalog: &'a LevelCatalog, config: SolverConfig) -> Self {
        Service {
            catalog,
            solver: Solver::new(config),
        }
    }

    /// Parse the map and run the requested search. Parse and algorithm
    /// errors are reported before any search state is built.
    pub fn solve(&self, request: &SolveRequest) -> SolveResponse {
        let algorithm: Algorithm = match request.algorithm.parse() {
            Ok(algorithm) => algorithm,
            Err(err) => return SolveResponse::failed(err.to_string()),
        };
        let (game, state) = match Game::from_rows(&request.map) {
            Ok(parsed) => parsed,
            Err(err) => return SolveResponse::failed(err.to_string()),
        };
        SolveResponse::from(&self.solver.solve(&game, &state, algorithm))
    }

    pub fn validate(&self, request: &ValidateRequest) -> ValidationReport {
        validate_map(&request.map)
    }

    pub fn levels(&self) -> AllLevelsResponse {
        let levels: BTreeMap<String, Vec<Level>> = self
            .catalog
            .buckets()
            .map(|(name, bucket)| {
                let rows: Vec<Level> = bucket.iter().map(<[String]>::to_vec).collect();
                (name.to_string(), rows)
            })
            .collect();
        AllLevelsResponse {
            success: true,
            levels,
        }
    }

    /// A level from bucket `name`: the one at `index` (1-indexed) when given,
    /// otherwise a random one other than `previous` (also 1-indexed).
    pub fn level<R: Rng>(
        &self,
        name: &str,
        index: Option<usize>,
        previous: Option<usize>,
        rng: &mut R,
    ) -> Result<LevelResponse> {
        let total_levels = self.catalog.count(name)?;
        let (index, level) = match index {
            Some(0) => {
                return Err(Error::LevelIndex {
                    name: name.to_string(),
                    level: 0,
                    total: total_levels,
                });
            }
            Some(index) => (index - 1, self.catalog.get(name, index - 1)?),
            None => {
                let avoid = previous.and_then(|prev| prev.checked_sub(1));
                self.catalog.random(name, avoid, rng)?
            }
        };
        Ok(LevelResponse {
            success: true,
            level: level.to_vec(),
            level_index: index + 1,
            total_levels,
        })
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            message: "Sokoban solver is running".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn request(map: &[&str], algorithm: &str) -> SolveRequest {
        SolveRequest {
            map: map.iter().map(|row| row.to_string()).collect(),
            algorithm: algorithm.to_string(),
        }
    }

    const LEVEL: [&str; 5] = ["######", "#    #", "# $@ #", "# .  #", "######"];

    #[test]
    fn test_solve_success() {
        let catalog = LevelCatalog::default();
        let service = Service::new(&catalog, SolverConfig::default());
        let response = service.solve(&request(&LEVEL, "astar"));
        assert!(response.success);
        let path: Vec<&str> = response.path.iter().flatten().map(String::as_str).collect();
        assert_eq!(path, ["U", "L", "D"]);
        assert_eq!(response.algorithm.as_deref(), Some("A*"));
        assert!(response.error.is_none());
        assert!(response.time >= 0.0);
    }

    #[test]
    fn test_solve_unknown_algorithm() {
        let catalog = LevelCatalog::default();
        let service = Service::new(&catalog, SolverConfig::default());
        let response = service.solve(&request(&LEVEL, "greedy"));
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Unknown algorithm: greedy"));
        assert_eq!(response.nodes_explored, 0);
    }

    #[test]
    fn test_solve_malformed_map() {
        let catalog = LevelCatalog::default();
        let service = Service::new(&catalog, SolverConfig::default());
        let response = service.solve(&request(&["#####", "#@$@#", "#####"], "bfs"));
        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("Malformed map"));
    }

    #[test]
    fn test_solve_no_solution_has_no_error() {
        let catalog = LevelCatalog::default();
        let service = Service::new(&catalog, SolverConfig::default());
        let map = ["#####", "#$  #", "#  .#", "# @ #", "#####"];
        let response = service.solve(&request(&map, "dfs"));
        assert!(!response.success);
        assert!(response.path.is_none());
        assert!(response.error.is_none());
        assert_eq!(response.algorithm.as_deref(), Some("DFS"));
    }

    #[test]
    fn test_solve_aborted_has_error() {
        let catalog = LevelCatalog::default();
        let config = SolverConfig {
            max_nodes: Some(1),
            ..Default::default()
        };
        let service = Service::new(&catalog, config);
        let response = service.solve(&request(&LEVEL, "bfs"));
        assert!(!response.success);
        assert!(response.error.unwrap().contains("aborted"));
    }

    #[test]
    fn test_solve_response_json_shape() {
        let catalog = LevelCatalog::default();
        let service = Service::new(&catalog, SolverConfig::default());
        let response = service.solve(&request(&LEVEL, "BFS"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["path"], serde_json::json!(["U", "L", "D"]));
        assert_eq!(json["algorithm"], "BFS");
        assert!(json.get("error").is_none());
        assert!(json["nodes_explored"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_request_default_algorithm() {
        let json = serde_json::json!({"map": ["#####", "#@$.#", "#####"]});
        let request: SolveRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.algorithm, "astar");
    }

    #[test]
    fn test_validate_two_players() {
        let catalog = LevelCatalog::default();
        let service = Service::new(&catalog, SolverConfig::default());
        let report = service.validate(&ValidateRequest {
            map: vec!["######".into(), "#@$.@#".into(), "######".into()],
        });
        assert!(!report.valid);
        assert!(!report.message.is_empty());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stats"]["player"], 2);
    }

    #[test]
    fn test_all_levels() {
        let catalog = LevelCatalog::builtin().unwrap();
        let service = Service::new(&catalog, SolverConfig::default());
        let response = service.levels();
        assert!(response.success);
        assert_eq!(response.levels.len(), 4);
        assert_eq!(response.levels["hard"].len(), 4);
        assert_eq!(response.levels["tutorial"][0], catalog.get("tutorial", 0).unwrap());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["levels"]["easy"].as_array().unwrap().len(), 4);
        assert_eq!(
            json["levels"]["medium"][1],
            serde_json::json!(catalog.get("medium", 1).unwrap())
        );
    }

    #[test]
    fn test_level_by_index() {
        let catalog = LevelCatalog::builtin().unwrap();
        let service = Service::new(&catalog, SolverConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let response = service.level("medium", Some(2), None, &mut rng).unwrap();
        assert_eq!(response.level_index, 2);
        assert_eq!(response.total_levels, 4);
        assert_eq!(response.level, catalog.get("medium", 1).unwrap());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["levelIndex"], 2);
        assert_eq!(json["totalLevels"], 4);
    }

    #[test]
    fn test_level_errors() {
        let catalog = LevelCatalog::builtin().unwrap();
        let service = Service::new(&catalog, SolverConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            service.level("impossible", None, None, &mut rng),
            Err(Error::UnknownDifficulty(_))
        ));
        let err = service.level("easy", Some(0), None, &mut rng).unwrap_err();
        assert!(matches!(err, Error::LevelIndex { level: 0, total: 4, .. }));
        assert_eq!(err.to_string(), "Level 0 not found (easy has 4 levels)");

        let err = service.level("easy", Some(5), None, &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "Level 5 not found (easy has 4 levels)");
        assert!(service.level("easy", Some(4), None, &mut rng).is_ok());
    }

    #[test]
    fn test_level_random_avoids_previous() {
        let catalog = LevelCatalog::builtin().unwrap();
        let service = Service::new(&catalog, SolverConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let response = service.level("tutorial", None, Some(1), &mut rng).unwrap();
            assert_ne!(response.level_index, 1);
        }
    }

    #[test]
    fn test_health() {
        let catalog = LevelCatalog::default();
        let service = Service::new(&catalog, SolverConfig::default());
        assert_eq!(service.health().status, "ok");
    }
}
