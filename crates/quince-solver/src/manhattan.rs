//! Manhattan-distance heuristic.
//!
//! Each tile needs at least as many moves as its Manhattan distance to its
//! goal cell, and distinct tiles never share a move, so the sum over all
//! tiles is an admissible lower bound. It is far weaker than a pattern
//! database but needs no precomputation, which makes it the fallback
//! heuristic and the reference point for database sanity checks.

use quince_core::{Board, Direction, Pos};

use crate::Heuristic;

/// Precomputed Manhattan distances for one board side.
///
/// The table holds the distance between every pair of cells, so an
/// estimate is a sum of lookups with no coordinate arithmetic per tile.
///
/// # Examples
///
/// ```
/// use quince_core::Board;
/// use quince_solver::{Heuristic as _, Manhattan};
///
/// let manhattan = Manhattan::new(4);
/// let board: Board = "1 2 3 4 5 6 7 8 9 10 0 12 13 14 11 15".parse().unwrap();
/// assert_eq!(manhattan.estimate(&board), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Manhattan {
    side: u8,
    metric: Vec<u8>,
}

impl Manhattan {
    /// Builds the distance table for boards of the given side.
    ///
    /// # Panics
    ///
    /// Panics when `side` is not in `2..=quince_core::MAX_SIDE`.
    #[must_use]
    pub fn new(side: u8) -> Self {
        assert!(
            (2..=quince_core::MAX_SIDE).contains(&side),
            "unsupported board side {side}"
        );
        let area = side * side;
        let mut metric = vec![0; usize::from(area) * usize::from(area)];
        for from in 0..area {
            for to in 0..area {
                metric[usize::from(from) * usize::from(area) + usize::from(to)] =
                    Pos::from_index(from, side).manhattan(Pos::from_index(to, side));
            }
        }
        Self { side, metric }
    }

    #[inline]
    fn distance(&self, from: u8, to: u8) -> u8 {
        let area = usize::from(self.side) * usize::from(self.side);
        self.metric[usize::from(from) * area + usize::from(to)]
    }

    /// Change in the estimate caused by applying `direction` to `board`,
    /// or `None` when the move is illegal.
    ///
    /// Only the tile that slides into the blank changes its contribution,
    /// so the update is two table lookups regardless of board size:
    /// `estimate(board.apply(direction))` equals `estimate(board)` plus
    /// this delta.
    #[must_use]
    pub fn delta(&self, board: &Board, direction: Direction) -> Option<i32> {
        let blank = board.blank_pos();
        let target = blank.step(direction, self.side)?;
        let tile = board.label_at(target);
        let old = self.distance(target.index(self.side), tile - 1);
        let new = self.distance(blank.index(self.side), tile - 1);
        Some(i32::from(new) - i32::from(old))
    }

    /// Sum of Manhattan distances for the given labels only.
    ///
    /// Restricting the sum to a tile group gives the bound a pattern
    /// database must dominate on the same tiles.
    ///
    /// # Panics
    ///
    /// Panics when the board side does not match this table.
    #[must_use]
    pub fn estimate_labels(&self, board: &Board, labels: &[u8]) -> u32 {
        assert_eq!(board.side(), self.side, "board side mismatch");
        let positions = board.positions();
        labels
            .iter()
            .filter(|&&label| label != 0)
            .map(|&label| u32::from(self.distance(positions[usize::from(label)], label - 1)))
            .sum()
    }
}

impl Heuristic for Manhattan {
    /// Sums each non-blank tile's distance to its goal cell.
    ///
    /// # Panics
    ///
    /// Panics when the board side does not match this table.
    fn estimate(&self, board: &Board) -> u32 {
        assert_eq!(board.side(), self.side, "board side mismatch");
        board
            .cells()
            .iter()
            .zip(0u8..)
            .filter(|&(&label, _)| label != 0)
            .map(|(&label, cell)| u32::from(self.distance(cell, label - 1)))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use quince_core::Direction;

    use super::*;

    #[test]
    fn test_goal_estimates_zero() {
        for side in 2..=5 {
            let manhattan = Manhattan::new(side);
            assert_eq!(manhattan.estimate(&Board::solved(side)), 0);
        }
    }

    #[test]
    fn test_single_move_estimates_one() {
        let manhattan = Manhattan::new(4);
        let board = Board::solved(4).apply(Direction::Left);
        assert_eq!(manhattan.estimate(&board), 1);
    }

    #[test]
    fn test_known_distance() {
        // Eight tiles displaced by one cell each; the optimal solution is
        // also eight moves, so the bound is tight here.
        let manhattan = Manhattan::new(4);
        let board: Board = "5 1 2 4 9 6 3 8 0 10 7 11 13 14 15 12".parse().unwrap();
        assert_eq!(manhattan.estimate(&board), 8);
    }

    #[test]
    fn test_never_decreases_by_more_than_one_per_move() {
        // A single move changes one tile's distance by exactly one, so the
        // estimate can drop by at most one per step.
        let manhattan = Manhattan::new(4);
        let mut board: Board = "5 1 2 4 9 6 3 8 0 10 7 11 13 14 15 12".parse().unwrap();
        let mut previous = manhattan.estimate(&board);
        for dir in [Direction::Down, Direction::Right, Direction::Up] {
            board = board.apply(dir);
            let current = manhattan.estimate(&board);
            assert!(previous.abs_diff(current) == 1);
            previous = current;
        }
    }

    #[test]
    fn test_delta_tracks_estimate() {
        let manhattan = Manhattan::new(4);
        let mut board: Board = "5 1 2 4 9 6 3 8 0 10 7 11 13 14 15 12".parse().unwrap();
        for step in 0..60usize {
            let moves: Vec<_> = board.legal_moves(None).collect();
            let dir = moves[step % moves.len()];
            let delta = manhattan.delta(&board, dir).unwrap();
            let next = board.apply(dir);
            assert_eq!(
                i64::from(manhattan.estimate(&next)),
                i64::from(manhattan.estimate(&board)) + i64::from(delta)
            );
            board = next;
        }
        // Off-board moves have no delta.
        let solved = Board::solved(4);
        assert_eq!(manhattan.delta(&solved, Direction::Down), None);
    }

    #[test]
    fn test_restricted_sums_to_full() {
        let manhattan = Manhattan::new(4);
        let board: Board = "5 1 2 4 9 6 3 8 0 10 7 11 13 14 15 12".parse().unwrap();
        let low: Vec<u8> = (1..=7).collect();
        let high: Vec<u8> = (8..=15).collect();
        assert_eq!(
            manhattan.estimate_labels(&board, &low) + manhattan.estimate_labels(&board, &high),
            manhattan.estimate(&board)
        );
    }
}
