use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use sokoban_search::api::{Service, SolveResponse, ValidateRequest};
use sokoban_search::config::SolverConfig;
use sokoban_search::game::{Direction, Game, State};
use sokoban_search::heuristic::HeuristicKind;
use sokoban_search::levels::{LevelCatalog, Levels};
use sokoban_search::validate::map_rows;
use sokoban_search::solver::{Algorithm, Outcome, SolveResult, Solver};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeuristicType {
    Manhattan,
    Matching,
}

impl From<HeuristicType> for HeuristicKind {
    fn from(heuristic: HeuristicType) -> Self {
        match heuristic {
            HeuristicType::Manhattan => HeuristicKind::Manhattan,
            HeuristicType::Matching => HeuristicKind::Matching,
        }
    }
}

fn print_solution(game: &Game, start: &State, solution: &[Direction]) {
    println!("\nStarting position:\n{}", game.display(start));
    let mut state = start.clone();
    let total = solution.len();
    for (count, &direction) in solution.iter().enumerate() {
        let Some(next) = game.apply(&state, direction) else {
            eprintln!("Illegal move {} at step {}", direction, count + 1);
            return;
        };
        state = next;
        println!(
            "Move {} ({}/{}):\n{}",
            direction,
            count + 1,
            total,
            game.display(&state)
        );
    }
}

struct LevelStats {
    solved: bool,
    steps: usize,
    states_explored: usize,
    elapsed_ms: u128,
}

fn report_level(level_num: usize, result: &SolveResult) -> LevelStats {
    let (solved_char, solution_len, solved) = match &result.outcome {
        Outcome::Solved(solution) => ('Y', solution.len(), true),
        Outcome::Aborted => ('N', 0, false),
        Outcome::Exhausted => ('X', 0, false),
    };
    let elapsed_ms = result.elapsed.as_millis();

    println!(
        "level: {:<3}  algorithm: {:<3}  solved: {}  steps: {:<5}  states: {:<12}  elapsed: {} ms",
        level_num, result.algorithm, solved_char, solution_len, result.nodes_explored, elapsed_ms
    );

    LevelStats {
        solved,
        steps: solution_len,
        states_explored: result.nodes_explored,
        elapsed_ms,
    }
}

/// Search limits shared by `solve` and `bench`.
#[derive(Args)]
struct LimitArgs {
    /// Path to a solver config TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of nodes to explore before giving up
    #[arg(short = 'n', long)]
    max_nodes: Option<usize>,

    /// Depth cap for depth-first search
    #[arg(long)]
    dfs_max_depth: Option<usize>,

    /// Heuristic to use for A*
    #[arg(short = 'H', long, value_enum)]
    heuristic: Option<HeuristicType>,
}

impl LimitArgs {
    /// Config file values, overridden by any flags given on the command line.
    fn solver_config(&self) -> anyhow::Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::from_file(path)?,
            None => SolverConfig::default(),
        };
        if self.max_nodes.is_some() {
            config.max_nodes = self.max_nodes;
        }
        if self.dfs_max_depth.is_some() {
            config.dfs_max_depth = self.dfs_max_depth;
        }
        if let Some(heuristic) = self.heuristic {
            config.heuristic = heuristic.into();
        }
        Ok(config)
    }
}

#[derive(Parser)]
#[command(name = "sokoban-search", version)]
#[command(about = "A Sokoban solver using BFS, DFS or A* search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve one level from an XSB file or from the built-in catalog.
    Solve {
        /// Path to the levels file (XSB format)
        #[arg(value_name = "FILE", required_unless_present = "difficulty")]
        levels_file: Option<PathBuf>,

        /// Take the level from this built-in difficulty instead of a file
        #[arg(short, long, conflicts_with = "levels_file")]
        difficulty: Option<String>,

        /// Level number to solve (1-indexed)
        #[arg(short, long, default_value_t = 1)]
        level: usize,

        /// Search algorithm: astar, bfs or dfs
        #[arg(short, long, default_value = "astar")]
        algorithm: String,

        #[command(flatten)]
        limits: LimitArgs,

        /// Print the solution step-by-step
        #[arg(short, long)]
        print_solution: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Solve a range of levels from an XSB file and print a summary.
    Bench {
        /// Path to the levels file (XSB format)
        #[arg(value_name = "FILE")]
        levels_file: PathBuf,

        /// Level number to solve (1-indexed), or start of range
        #[arg(value_name = "LEVEL")]
        level_start: usize,

        /// Optional end of level range (inclusive, 1-indexed)
        #[arg(value_name = "LEVEL_END")]
        level_end: Option<usize>,

        /// Search algorithm: astar, bfs or dfs
        #[arg(short, long, default_value = "astar")]
        algorithm: String,

        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Check a map file without solving it.
    Validate {
        /// Path to a file holding a single map
        #[arg(value_name = "FILE")]
        map_file: PathBuf,
    },
    /// List the level buckets and how many levels each holds.
    Levels {
        /// Directory of `<name>.xsb` files to use instead of the built-in levels
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Print every level of every bucket as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one level of a difficulty bucket as JSON.
    Level {
        /// Difficulty bucket, e.g. tutorial, easy, medium, hard
        name: String,

        /// Level number (1-indexed); a random level when omitted
        #[arg(short, long)]
        index: Option<usize>,

        /// Level number served last time, skipped by the random pick
        #[arg(long)]
        previous: Option<usize>,

        /// Seed for the random pick
        #[arg(long)]
        seed: Option<u64>,

        /// Directory of `<name>.xsb` files to use instead of the built-in levels
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Report that the solver is available.
    Health,
}

fn load_catalog(dir: Option<&Path>) -> anyhow::Result<LevelCatalog> {
    Ok(match dir {
        Some(dir) => LevelCatalog::from_dir(dir)
            .with_context(|| format!("loading levels from {}", dir.display()))?,
        None => LevelCatalog::builtin()?,
    })
}

fn load_level(
    levels_file: Option<&Path>,
    difficulty: Option<&str>,
    level: usize,
) -> anyhow::Result<Vec<String>> {
    if level == 0 {
        bail!("level numbers must be at least 1");
    }
    if let Some(name) = difficulty {
        return Ok(LevelCatalog::builtin()?.get(name, level - 1)?.to_vec());
    }
    let Some(path) = levels_file else {
        bail!("either a levels file or --difficulty is required");
    };
    let levels = Levels::from_file(path)
        .with_context(|| format!("loading levels from {}", path.display()))?;
    match levels.get(level - 1) {
        Some(rows) => Ok(rows.to_vec()),
        None => bail!(
            "level {} not found (file contains {} levels)",
            level,
            levels.len()
        ),
    }
}

fn run_bench(
    levels_file: &Path,
    level_start: usize,
    level_end: Option<usize>,
    algorithm: Algorithm,
    config: SolverConfig,
) -> anyhow::Result<()> {
    let levels = Levels::from_file(levels_file)
        .with_context(|| format!("loading levels from {}", levels_file.display()))?;

    // Determine the range of levels to solve
    let level_end = level_end.unwrap_or(level_start);
    if level_start == 0 {
        bail!("level numbers must be at least 1");
    }
    if level_end < level_start {
        bail!("level end must be >= level start");
    }
    if level_end > levels.len() {
        bail!(
            "level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
    }
    let num_levels = level_end - level_start + 1;

    let solver = Solver::new(config);
    let mut total_solved = 0;
    let mut total_steps = 0;
    let mut total_states = 0;
    let mut total_time_ms = 0;

    for level_num in level_start..=level_end {
        let Some(rows) = levels.get(level_num - 1) else {
            continue;
        };
        let (game, state) = Game::from_rows(rows)?;
        let result = solver.solve(&game, &state, algorithm);
        let stats = report_level(level_num, &result);

        if stats.solved {
            total_solved += 1;
        }
        total_steps += stats.steps;
        total_states += stats.states_explored;
        total_time_ms += stats.elapsed_ms;
    }

    // Print summary statistics if multiple levels were solved
    if num_levels > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        steps: {:<5}  states: {:<12}  elapsed: {} ms",
            total_solved, num_levels, total_steps, total_states, total_time_ms
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Solve {
            levels_file,
            difficulty,
            level,
            algorithm,
            limits,
            print_solution: show_solution,
            json,
        } => {
            let algorithm: Algorithm = algorithm.parse()?;
            let config = limits.solver_config()?;
            let rows = load_level(levels_file.as_deref(), difficulty.as_deref(), level)?;
            let (game, state) = Game::from_rows(&rows)?;

            let result = Solver::new(config).solve(&game, &state, algorithm);
            if json {
                let response = SolveResponse::from(&result);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                report_level(level, &result);
                if show_solution {
                    if let Some(path) = result.path() {
                        print_solution(&game, &state, path);
                    }
                }
            }
        }
        Command::Bench {
            levels_file,
            level_start,
            level_end,
            algorithm,
            limits,
        } => {
            let algorithm: Algorithm = algorithm.parse()?;
            run_bench(
                &levels_file,
                level_start,
                level_end,
                algorithm,
                limits.solver_config()?,
            )?;
        }
        Command::Validate { map_file } => {
            let contents = std::fs::read_to_string(&map_file)
                .with_context(|| format!("reading {}", map_file.display()))?;
            let map = map_rows(&contents);
            let catalog = LevelCatalog::default();
            let service = Service::new(&catalog, SolverConfig::default());
            let report = service.validate(&ValidateRequest { map });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Levels { dir, json } => {
            let catalog = load_catalog(dir.as_deref())?;
            if json {
                let service = Service::new(&catalog, SolverConfig::default());
                println!("{}", serde_json::to_string_pretty(&service.levels())?);
            } else {
                for (name, levels) in catalog.buckets() {
                    println!("{:<12} {} levels", name, levels.len());
                }
            }
        }
        Command::Level {
            name,
            index,
            previous,
            seed,
            dir,
        } => {
            let catalog = load_catalog(dir.as_deref())?;
            let service = Service::new(&catalog, SolverConfig::default());
            let mut rng = match seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let response = service.level(&name, index, previous, &mut rng)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Health => {
            let catalog = LevelCatalog::default();
            let service = Service::new(&catalog, SolverConfig::default());
            println!("{}", serde_json::to_string_pretty(&service.health())?);
        }
    }

    Ok(())
}
