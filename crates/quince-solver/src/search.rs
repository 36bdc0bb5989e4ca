//! Iterative-deepening A* search.
//!
//! The driver runs depth-first searches under a growing cost bound. Each
//! pass prunes any node whose path cost plus heuristic exceeds the bound
//! and remembers the smallest value that did; that value becomes the next
//! bound. With an admissible heuristic the first pass that reaches the
//! goal has done so along a shortest path.
//!
//! Memory stays proportional to the solution depth: the only state besides
//! the recursion is the move stack and the packed keys of the boards on
//! the current path, kept to skip cycles.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use quince_core::{Board, Direction};
use thiserror::Error;

use crate::Heuristic;

const INFINITE: u32 = u32::MAX;

/// How many node expansions pass between cancellation checks.
const CANCEL_CHECK_MASK: u64 = 0xFFF;

/// Error returned by [`solve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The goal is unreachable from the initial board.
    #[error("puzzle is unsolvable")]
    Unsolvable,
    /// The cancellation token fired before a solution was found.
    #[error("solve was cancelled")]
    Cancelled,
}

/// Cooperative cancellation flag, shared with the party that may fire it.
///
/// The search polls the token at node-expansion boundaries, so a solve
/// returns [`SolveError::Cancelled`] shortly after [`cancel`] is called on
/// any clone of its token.
///
/// [`cancel`]: CancelToken::cancel
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an unfired token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the token; every holder observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether the token has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Options for [`solve`].
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Token checked cooperatively during the search.
    pub cancel: Option<CancelToken>,
}

/// Counters describing a finished search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveStats {
    /// Nodes expanded across all deepening passes.
    pub nodes: u64,
    /// Number of depth-first passes run.
    pub iterations: u32,
    /// Bound of the successful pass, which equals the solution length.
    pub final_bound: u32,
}

/// A shortest move sequence together with search counters.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Moves from the initial board to the goal.
    pub moves: Vec<Direction>,
    /// Search counters.
    pub stats: SolveStats,
}

/// Finds a shortest move sequence from `initial` to the goal.
///
/// `heuristic` must be admissible for the returned length to be optimal.
/// Already-solved boards return an empty sequence without consulting the
/// heuristic. Unsolvable boards are rejected by the parity test up front,
/// so the search itself only ever runs on solvable input.
///
/// # Errors
///
/// Returns [`SolveError::Unsolvable`] when the goal is unreachable and
/// [`SolveError::Cancelled`] when the options' token fires mid-search.
pub fn solve(
    initial: &Board,
    heuristic: &dyn Heuristic,
    options: &SolveOptions,
) -> Result<Solution, SolveError> {
    if initial.is_solved() {
        return Ok(Solution {
            moves: Vec::new(),
            stats: SolveStats {
                nodes: 0,
                iterations: 0,
                final_bound: 0,
            },
        });
    }
    if !initial.solvable() {
        return Err(SolveError::Unsolvable);
    }

    let mut searcher = Searcher {
        heuristic,
        cancel: options.cancel.clone(),
        nodes: 0,
        path_keys: vec![initial.packed()],
        moves: Vec::new(),
    };
    let mut bound = heuristic.estimate(initial);
    let mut iterations = 0;
    loop {
        iterations += 1;
        log::debug!("pass {iterations} with bound {bound}");
        match searcher.dfs(initial, 0, None, bound)? {
            Dfs::Found => {
                log::info!(
                    "solved in {} moves after {} nodes",
                    searcher.moves.len(),
                    searcher.nodes
                );
                return Ok(Solution {
                    moves: searcher.moves,
                    stats: SolveStats {
                        nodes: searcher.nodes,
                        iterations,
                        final_bound: bound,
                    },
                });
            }
            Dfs::Min(INFINITE) => return Err(SolveError::Unsolvable),
            Dfs::Min(next) => {
                log::info!("bound {bound} exhausted, raising to {next}");
                bound = next;
            }
        }
    }
}

enum Dfs {
    /// The goal was reached; the move stack holds the solution.
    Found,
    /// Smallest cost that exceeded the bound, or [`INFINITE`] when the
    /// subtree was exhausted outright.
    Min(u32),
}

struct Searcher<'a> {
    heuristic: &'a dyn Heuristic,
    cancel: Option<CancelToken>,
    nodes: u64,
    path_keys: Vec<u128>,
    moves: Vec<Direction>,
}

impl Searcher<'_> {
    fn dfs(
        &mut self,
        board: &Board,
        depth: u32,
        prev: Option<Direction>,
        bound: u32,
    ) -> Result<Dfs, SolveError> {
        self.nodes += 1;
        if self.nodes & CANCEL_CHECK_MASK == 0
            && self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
        {
            return Err(SolveError::Cancelled);
        }

        let cost = depth + self.heuristic.estimate(board);
        if cost > bound {
            return Ok(Dfs::Min(cost));
        }
        if board.is_solved() {
            return Ok(Dfs::Found);
        }

        let mut min = INFINITE;
        for direction in board.legal_moves(prev) {
            let child = board.apply(direction);
            let key = child.packed();
            // Revisiting a board on the current path can never shorten it.
            if self.path_keys.contains(&key) {
                continue;
            }
            self.path_keys.push(key);
            self.moves.push(direction);
            match self.dfs(&child, depth + 1, Some(direction), bound)? {
                Dfs::Found => return Ok(Dfs::Found),
                Dfs::Min(value) => min = min.min(value),
            }
            self.moves.pop();
            self.path_keys.pop();
        }
        Ok(Dfs::Min(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        manhattan::Manhattan,
        pattern::{Partition, PatternDb, PatternGroup},
        testing::{SolveTester, optimal_distances},
    };

    #[test]
    fn test_already_solved_returns_empty() {
        let solution = SolveTester::from_str("1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 0")
            .solve_with(&Manhattan::new(4))
            .assert_len(0)
            .into_solution();
        assert_eq!(solution.stats.final_bound, 0);
        assert_eq!(solution.stats.nodes, 0);
    }

    #[test]
    fn test_single_move_right() {
        SolveTester::from_str("1 2 3 4 5 6 7 8 9 10 11 12 13 14 0 15")
            .solve_with(&Manhattan::new(4))
            .assert_len(1)
            .assert_symbols("R");
    }

    #[test]
    fn test_single_move_down() {
        SolveTester::from_str("1 2 3 4 5 6 7 8 9 10 11 0 13 14 15 12")
            .solve_with(&Manhattan::new(4))
            .assert_len(1)
            .assert_symbols("D");
    }

    #[test]
    fn test_eight_move_scramble() {
        SolveTester::from_str("5 1 2 4 9 6 3 8 0 10 7 11 13 14 15 12")
            .solve_with(&Manhattan::new(4))
            .assert_len(8)
            .assert_reaches_goal();
    }

    #[test]
    fn test_solution_replays_to_goal() {
        SolveTester::from_str("1 2 3 4 5 6 7 8 9 10 0 12 13 14 11 15")
            .solve_with(&Manhattan::new(4))
            .assert_reaches_goal();
    }

    #[test]
    fn test_unsolvable_parity() {
        let err = SolveTester::from_str("2 1 3 4 5 6 7 8 9 10 11 12 13 14 15 0")
            .expect_error(&Manhattan::new(4));
        assert_eq!(err, SolveError::Unsolvable);
    }

    #[test]
    fn test_pdb_solves_scramble() {
        // A deliberately weak partition of many small groups keeps the
        // build instant while still exercising the full lookup path.
        let partition = Partition::new(
            4,
            vec![
                PatternGroup::new([1, 2, 3]),
                PatternGroup::new([4, 7, 8]),
                PatternGroup::new([5, 6, 9]),
                PatternGroup::new([10, 11, 12]),
                PatternGroup::new([13, 14, 15]),
            ],
        )
        .unwrap();
        let db = PatternDb::build(partition, Some(2)).unwrap();
        SolveTester::from_str("5 1 2 4 9 6 3 8 0 10 7 11 13 14 15 12")
            .solve_with(&db)
            .assert_len(8)
            .assert_reaches_goal();
    }

    #[test]
    fn test_cancelled_token_stops_search() {
        // A trivial heuristic never prunes, so on a well-scrambled board
        // the search is guaranteed to hit a cancellation check.
        struct Zero;
        impl crate::Heuristic for Zero {
            fn estimate(&self, _board: &quince_core::Board) -> u32 {
                0
            }
        }

        let mut seed = 0x9E37_79B9_7F4A_7C15u64;
        let mut board = quince_core::Board::solved(4);
        let mut prev = None;
        for _ in 0..300 {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let moves: Vec<_> = board.legal_moves(prev).collect();
            let dir = moves[usize::try_from(seed >> 33).unwrap() % moves.len()];
            board = board.apply(dir);
            prev = Some(dir);
        }

        let token = CancelToken::new();
        token.cancel();
        let options = SolveOptions {
            cancel: Some(token),
        };
        let err = solve(&board, &Zero, &options).unwrap_err();
        assert_eq!(err, SolveError::Cancelled);
    }

    #[test]
    fn test_matches_breadth_first_lengths_on_3x3() {
        // Spot-check optimality against exhaustive distances, sampling the
        // state space evenly.
        let db = PatternDb::build(Partition::default_for(3).unwrap(), Some(2)).unwrap();
        let options = SolveOptions::default();
        for (board, distance) in optimal_distances(3)
            .into_iter()
            .step_by(997)
        {
            let solution = solve(&board, &db, &options).unwrap();
            assert_eq!(
                u32::try_from(solution.moves.len()).unwrap(),
                distance,
                "wrong length for {board}"
            );
        }
    }

    #[test]
    fn test_deterministic_given_identical_input() {
        let manhattan = Manhattan::new(4);
        let first = SolveTester::from_str("5 1 2 4 9 6 3 8 0 10 7 11 13 14 15 12")
            .solve_with(&manhattan)
            .into_solution();
        let second = SolveTester::from_str("5 1 2 4 9 6 3 8 0 10 7 11 13 14 15 12")
            .solve_with(&manhattan)
            .into_solution();
        assert_eq!(first.moves, second.moves);
        assert_eq!(first.stats, second.stats);
    }
}
