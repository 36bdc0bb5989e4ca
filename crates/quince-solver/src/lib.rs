//! Optimal sliding-tile solving.
//!
//! This crate layers an optimal solver on top of [`quince_core`]:
//!
//! - [`manhattan`]: the Manhattan-distance lower bound, usable on its own
//! - [`pattern`]: additive disjoint pattern databases, built once with a
//!   breadth-first enumeration, persisted to disk, then consulted as the
//!   search heuristic
//! - [`search`]: iterative-deepening A* over boards, returning a
//!   shortest move sequence
//! - [`testing`]: assertion harness used by the solver's own tests
//!
//! The seam between search and heuristics is the [`Heuristic`] trait; any
//! admissible estimator plugs in, and the search then guarantees optimal
//! solution lengths.
//!
//! # Examples
//!
//! ```
//! use quince_core::Board;
//! use quince_solver::{Manhattan, SolveOptions, solve};
//!
//! let board: Board = "1 2 3 4 5 6 7 8 9 10 11 12 13 14 0 15".parse().unwrap();
//! let solution = solve(&board, &Manhattan::new(4), &SolveOptions::default())?;
//! assert_eq!(solution.moves.len(), 1);
//! # Ok::<(), quince_solver::SolveError>(())
//! ```

pub use self::{
    manhattan::Manhattan,
    pattern::{Partition, PatternDb, PatternGroup, PdbError},
    search::{CancelToken, Solution, SolveError, SolveOptions, SolveStats, solve},
};

pub mod manhattan;
pub mod pattern;
pub mod search;
pub mod testing;

use quince_core::Board;

/// A lower bound on the number of moves from a board to the goal.
///
/// Implementations must be *admissible*: the estimate never exceeds the
/// true optimal distance. The search relies on this to prove the
/// minimality of the solutions it returns.
pub trait Heuristic {
    /// Estimates the remaining number of moves for `board`.
    ///
    /// The goal must estimate `0`.
    fn estimate(&self, board: &Board) -> u32;
}
