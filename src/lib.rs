//! Search engine for Sokoban-style warehouse puzzles.
//!
//! A map is parsed into a static [`game::Game`] and an initial
//! [`game::State`]; [`solver::Solver`] then searches the state space
//! breadth-first, depth-first or with A* and reports the moves found together
//! with search statistics. [`api`] wraps this in the request/response shapes
//! of the solver service.

pub mod api;
pub mod config;
pub mod error;
pub mod frontier;
pub mod game;
pub mod heuristic;
pub mod hungarian;
pub mod levels;
pub mod solver;
pub mod validate;

pub use error::{Error, Result};
