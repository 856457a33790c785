use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::config::SolverConfig;
use crate::error::Error;
use crate::frontier::{FifoFrontier, Frontier, LifoFrontier, NodeId, PriorityFrontier};
use crate::game::{Direction, Game, State};
use crate::heuristic::{
    Cost, Heuristic, HeuristicKind, ManhattanHeuristic, MatchingHeuristic, NullHeuristic,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    AStar,
    Bfs,
    Dfs,
}

impl Algorithm {
    /// Display name reported alongside results.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::AStar => "A*",
            Algorithm::Bfs => "BFS",
            Algorithm::Dfs => "DFS",
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "astar" | "a*" => Ok(Algorithm::AStar),
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Moves leading from the start state to a solved state.
    Solved(Vec<Direction>),
    /// The frontier ran dry without reaching a solved state.
    Exhausted,
    /// The configured node budget ran out first.
    Aborted,
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub outcome: Outcome,
    /// States taken off the frontier and goal-tested. A depth-first node cut
    /// off at the cap is counted each time it is reached.
    pub nodes_explored: usize,
    pub elapsed: Duration,
    pub algorithm: Algorithm,
    /// Set when depth-first search cut off at least one branch at its depth
    /// cap, in which case `Exhausted` does not prove the puzzle unsolvable.
    pub depth_limited: bool,
}

impl SolveResult {
    pub fn path(&self) -> Option<&[Direction]> {
        match &self.outcome {
            Outcome::Solved(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, Outcome::Solved(_))
    }
}

struct SearchNode {
    state: State,
    parent: Option<NodeId>,
    action: Option<Direction>,
    g: usize,
}

struct Exploration {
    outcome: Outcome,
    nodes_explored: usize,
    depth_limited: bool,
}

/// Runs one search per call. Holds no state between calls, so a single
/// solver can be shared by concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Search for a sequence of moves that puts every box on a goal.
    pub fn solve(&self, game: &Game, start: &State, algorithm: Algorithm) -> SolveResult {
        tracing::debug!(
            %algorithm,
            width = game.width(),
            height = game.height(),
            boxes = start.box_count(),
            "Starting search"
        );
        let start_time = Instant::now();

        let exploration = match algorithm {
            Algorithm::Bfs => self.explore(game, start, FifoFrontier::default(), &NullHeuristic, None),
            Algorithm::Dfs => {
                let cap = self.dfs_depth_cap(game, start);
                self.explore(game, start, LifoFrontier::default(), &NullHeuristic, Some(cap))
            }
            Algorithm::AStar => match self.config.heuristic {
                HeuristicKind::Manhattan => {
                    self.explore(game, start, PriorityFrontier::new(), &ManhattanHeuristic, None)
                }
                HeuristicKind::Matching => {
                    self.explore(game, start, PriorityFrontier::new(), &MatchingHeuristic, None)
                }
            },
        };

        let elapsed = start_time.elapsed();

        match &exploration.outcome {
            Outcome::Solved(path) => tracing::debug!(
                %algorithm,
                moves = path.len(),
                nodes_explored = exploration.nodes_explored,
                elapsed_ms = elapsed.as_millis() as u64,
                "Search solved"
            ),
            Outcome::Exhausted => tracing::debug!(
                %algorithm,
                nodes_explored = exploration.nodes_explored,
                depth_limited = exploration.depth_limited,
                elapsed_ms = elapsed.as_millis() as u64,
                "Search exhausted"
            ),
            Outcome::Aborted => tracing::warn!(
                %algorithm,
                nodes_explored = exploration.nodes_explored,
                elapsed_ms = elapsed.as_millis() as u64,
                "Search aborted: node budget reached"
            ),
        }

        SolveResult {
            outcome: exploration.outcome,
            nodes_explored: exploration.nodes_explored,
            elapsed,
            algorithm,
            depth_limited: exploration.depth_limited,
        }
    }

    fn dfs_depth_cap(&self, game: &Game, start: &State) -> usize {
        self.config.dfs_max_depth.unwrap_or_else(|| {
            game.width() as usize * game.height() as usize * start.box_count().max(1)
        })
    }

    fn explore<F: Frontier, H: Heuristic>(
        &self,
        game: &Game,
        start: &State,
        mut frontier: F,
        heuristic: &H,
        depth_cap: Option<usize>,
    ) -> Exploration {
        let mut arena: Vec<SearchNode> = Vec::new();
        let mut visited: HashSet<State> = HashSet::new();
        let mut nodes_explored = 0;
        let mut depth_limited = false;

        if let Cost::Solvable(h) = heuristic.estimate(game, start) {
            arena.push(SearchNode {
                state: start.clone(),
                parent: None,
                action: None,
                g: 0,
            });
            frontier.insert(0, h);
        }

        while let Some(id) = frontier.remove_next() {
            // Duplicates are dropped when popped rather than when pushed
            if visited.contains(&arena[id].state) {
                continue;
            }

            if self.config.max_nodes.is_some_and(|max| nodes_explored >= max) {
                return Exploration {
                    outcome: Outcome::Aborted,
                    nodes_explored,
                    depth_limited,
                };
            }

            nodes_explored += 1;

            let node = &arena[id];
            tracing::trace!(
                node = id,
                g = node.g,
                frontier = frontier.len(),
                "Expanding node"
            );

            if game.is_solved(&node.state) {
                return Exploration {
                    outcome: Outcome::Solved(reconstruct_path(&arena, id)),
                    nodes_explored,
                    depth_limited,
                };
            }

            // A capped node stays unvisited so a shallower path can still expand it
            if depth_cap.is_some_and(|cap| node.g >= cap) {
                depth_limited = true;
                continue;
            }
            visited.insert(node.state.clone());

            let g = node.g + 1;
            let children: Vec<(Direction, State)> = game
                .successors(&node.state)
                .filter(|(_, next)| !visited.contains(next))
                .collect();

            for (direction, state) in children {
                let priority = match heuristic.estimate(game, &state) {
                    Cost::Solvable(h) => g + h,
                    Cost::Impossible => continue,
                };
                let child = arena.len();
                arena.push(SearchNode {
                    state,
                    parent: Some(id),
                    action: Some(direction),
                    g,
                });
                frontier.insert(child, priority);
            }
        }

        Exploration {
            outcome: Outcome::Exhausted,
            nodes_explored,
            depth_limited,
        }
    }
}

/// Walk parent links from `id` back to the root, returning the actions in
/// the order they were played.
fn reconstruct_path(arena: &[SearchNode], id: NodeId) -> Vec<Direction> {
    let mut path = Vec::new();
    let mut current = Some(id);
    while let Some(idx) = current {
        let node = &arena[idx];
        if let Some(action) = node.action {
            path.push(action);
        }
        current = node.parent;
    }
    path.reverse();
    path
}
