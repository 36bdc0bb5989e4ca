//! Test utilities for the solver.
//!
//! [`SolveTester`] drives a solve and asserts on the outcome with chained,
//! `#[track_caller]` assertions; [`optimal_distances`] enumerates the exact
//! distance of every reachable board on small sides, serving as the oracle
//! the heuristics and the search are checked against.
//!
//! # Example
//!
//! ```
//! use quince_solver::{Manhattan, testing::SolveTester};
//!
//! SolveTester::from_str("1 2 3 4 5 6 7 8 9 10 11 12 13 14 0 15")
//!     .solve_with(&Manhattan::new(4))
//!     .assert_len(1)
//!     .assert_symbols("R");
//! ```

use std::collections::{HashMap, VecDeque};

use quince_core::Board;

use crate::{
    Heuristic,
    search::{Solution, SolveError, SolveOptions, solve},
};

/// A test harness that solves one board and asserts on the result.
#[derive(Debug)]
pub struct SolveTester {
    board: Board,
}

impl SolveTester {
    /// Creates a tester for the given board.
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    /// Creates a tester from the whitespace-separated board format.
    ///
    /// # Panics
    ///
    /// Panics when the text is not a valid board.
    #[track_caller]
    pub fn from_str(s: &str) -> Self {
        Self::new(s.parse().unwrap())
    }

    /// Solves the board, panicking on any error.
    #[track_caller]
    pub fn solve_with(self, heuristic: &dyn Heuristic) -> SolvedTester {
        match solve(&self.board, heuristic, &SolveOptions::default()) {
            Ok(solution) => SolvedTester {
                initial: self.board,
                solution,
            },
            Err(err) => panic!("expected a solution for {}, got: {err}", self.board),
        }
    }

    /// Solves the board, panicking unless an error comes back.
    #[track_caller]
    pub fn expect_error(self, heuristic: &dyn Heuristic) -> SolveError {
        match solve(&self.board, heuristic, &SolveOptions::default()) {
            Err(err) => err,
            Ok(solution) => panic!(
                "expected an error for {}, got a {}-move solution",
                self.board,
                solution.moves.len()
            ),
        }
    }
}

/// The solved half of [`SolveTester`], asserting on the found solution.
#[derive(Debug)]
pub struct SolvedTester {
    initial: Board,
    solution: Solution,
}

impl SolvedTester {
    /// Asserts the solution has exactly `expected` moves.
    #[track_caller]
    pub fn assert_len(self, expected: usize) -> Self {
        assert_eq!(
            self.solution.moves.len(),
            expected,
            "expected a {expected}-move solution for {}, got {:?}",
            self.initial,
            self.solution.moves
        );
        self
    }

    /// Asserts the solution's move symbols spell `expected`.
    #[track_caller]
    pub fn assert_symbols(self, expected: &str) -> Self {
        let symbols: String = self.solution.moves.iter().map(|m| m.symbol()).collect();
        assert_eq!(
            symbols, expected,
            "unexpected move sequence for {}",
            self.initial
        );
        self
    }

    /// Replays the solution on the initial board and asserts it ends at
    /// the goal, with every intermediate move legal.
    #[track_caller]
    pub fn assert_reaches_goal(self) -> Self {
        let mut board = self.initial.clone();
        for &direction in &self.solution.moves {
            board = board
                .try_apply(direction)
                .unwrap_or_else(|| panic!("illegal move {direction} while replaying {}", self.initial));
        }
        assert!(
            board.is_solved(),
            "replaying the solution left {board}, not the goal"
        );
        self
    }

    /// Hands back the underlying solution.
    pub fn into_solution(self) -> Solution {
        self.solution
    }
}

/// Optimal distance of every board reachable from the goal, by
/// breadth-first enumeration.
///
/// Only practical for small sides: side 3 has 181 440 reachable boards,
/// side 4 is far beyond exhaustive reach.
#[must_use]
pub fn optimal_distances(side: u8) -> Vec<(Board, u32)> {
    let goal = Board::solved(side);
    let mut seen: HashMap<u128, u32> = HashMap::new();
    let mut out = Vec::new();
    let mut queue = VecDeque::new();
    seen.insert(goal.packed(), 0);
    queue.push_back((goal, 0u32));
    while let Some((board, distance)) = queue.pop_front() {
        for direction in board.legal_moves(None) {
            let next = board.apply(direction);
            if !seen.contains_key(&next.packed()) {
                seen.insert(next.packed(), distance + 1);
                queue.push_back((next, distance + 1));
            }
        }
        out.push((board, distance));
    }
    out
}
