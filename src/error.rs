use std::io;

/// Errors surfaced before a search starts. Running out of states is not an
/// error; see [`crate::solver::Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The map could not be turned into a puzzle (mover count, symbols, size).
    #[error("Malformed map: {0}")]
    MalformedMap(String),
    /// The requested search strategy is not one of `astar`, `bfs`, `dfs`.
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    /// No level bucket with this name exists in the catalog.
    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),
    /// A level number (1-indexed) outside its bucket.
    #[error("Level {level} not found ({name} has {total} levels)")]
    LevelIndex {
        name: String,
        level: usize,
        total: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
