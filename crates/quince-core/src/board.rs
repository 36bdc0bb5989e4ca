use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{Direction, MAX_SIDE, Pos};

/// Error constructing a board from raw labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The requested side is outside the supported range.
    #[error("unsupported board side {side}; supported sides are 2 through {MAX_SIDE}")]
    UnsupportedSide {
        /// The rejected side.
        side: u8,
    },
    /// The labels are not a permutation of `0..side²`.
    #[error("labels are not a permutation of 0..{label_count}")]
    NotAPermutation {
        /// Number of labels a board of the requested side holds.
        label_count: u16,
    },
}

/// Error parsing a board from its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseBoardError {
    /// A token was not a small non-negative integer.
    #[error("board text contains an invalid token {token:?}")]
    InvalidToken {
        /// The offending token.
        token: String,
    },
    /// The number of labels is not a square of a supported side.
    #[error("{count} labels do not form a square board")]
    NotSquare {
        /// Number of labels found.
        count: usize,
    },
    /// The labels were well-formed but not a valid board.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// A sliding-tile board.
///
/// Cells are stored flat in row-major order. Label `0` is the blank; its
/// index is cached so move generation never scans the board. The goal
/// arrangement holds label `k` at cell `k - 1` with the blank last.
///
/// Boards are value objects: [`apply`](Board::apply) returns a fresh board
/// and never mutates the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    side: u8,
    cells: Vec<u8>,
    blank: u8,
}

impl Board {
    /// Creates a board from a flat, row-major label sequence.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnsupportedSide`] when `side` is not in
    /// `2..=MAX_SIDE`, and [`BoardError::NotAPermutation`] when `labels` is
    /// not a permutation of `0..side²`.
    pub fn new(side: u8, labels: Vec<u8>) -> Result<Self, BoardError> {
        if !(2..=MAX_SIDE).contains(&side) {
            return Err(BoardError::UnsupportedSide { side });
        }
        let label_count = u16::from(side) * u16::from(side);
        let permutation_err = BoardError::NotAPermutation { label_count };
        if labels.len() != usize::from(label_count) {
            return Err(permutation_err);
        }
        let mut seen = 0u32;
        for &label in &labels {
            if u16::from(label) >= label_count || seen & (1 << label) != 0 {
                return Err(permutation_err);
            }
            seen |= 1 << label;
        }
        #[expect(clippy::cast_possible_truncation)]
        let blank = labels.iter().position(|&label| label == 0).unwrap() as u8;
        Ok(Self {
            side,
            cells: labels,
            blank,
        })
    }

    /// Returns the solved board of the given side.
    ///
    /// # Panics
    ///
    /// Panics when `side` is not in `2..=MAX_SIDE`.
    #[must_use]
    pub fn solved(side: u8) -> Self {
        assert!(
            (2..=MAX_SIDE).contains(&side),
            "unsupported board side {side}"
        );
        let area = side * side;
        let cells = (1..area).chain([0]).collect();
        Self {
            side,
            cells,
            blank: area - 1,
        }
    }

    /// Board side.
    #[must_use]
    #[inline]
    pub const fn side(&self) -> u8 {
        self.side
    }

    /// Number of cells (`side²`).
    #[must_use]
    #[inline]
    pub const fn area(&self) -> u8 {
        self.side * self.side
    }

    /// Flat row-major label sequence.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Position of the blank.
    #[must_use]
    #[inline]
    pub fn blank_pos(&self) -> Pos {
        Pos::from_index(self.blank, self.side)
    }

    /// Label at the given position.
    #[must_use]
    #[inline]
    pub fn label_at(&self, pos: Pos) -> u8 {
        self.cells[usize::from(pos.index(self.side))]
    }

    /// Cell index of every label, indexed by label.
    ///
    /// `positions()[0]` is the blank cell; `positions()[k]` the cell of
    /// tile `k`. The heuristic layers project boards onto tile groups
    /// through this view.
    #[must_use]
    pub fn positions(&self) -> Vec<u8> {
        let mut positions = vec![0; self.cells.len()];
        #[expect(clippy::cast_possible_truncation)]
        for (cell, &label) in self.cells.iter().enumerate() {
            positions[usize::from(label)] = cell as u8;
        }
        positions
    }

    /// Whether this board is the goal arrangement.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        let area = u16::from(self.area());
        self.cells
            .iter()
            .zip(1u16..)
            .all(|(&label, expected)| u16::from(label) == expected % area)
    }

    /// Whether the goal is reachable from this board.
    ///
    /// On odd sides a board is solvable iff its inversion count is even.
    /// On even sides the inversion count plus the blank's row (from the
    /// top) must be odd.
    #[must_use]
    pub fn solvable(&self) -> bool {
        let inversions = self.inversions();
        if self.side % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + usize::from(self.blank_pos().row())) % 2 == 1
        }
    }

    fn inversions(&self) -> usize {
        let mut inversions = 0;
        for (i, &label) in self.cells.iter().enumerate() {
            if label == 0 {
                continue;
            }
            inversions += self.cells[i + 1..]
                .iter()
                .filter(|&&later| later != 0 && later < label)
                .count();
        }
        inversions
    }

    /// Directions the blank may legally move, in fixed enumeration order.
    ///
    /// When `prev_move` is given, its opposite is excluded so a search
    /// never immediately undoes the move that produced this board.
    pub fn legal_moves(
        &self,
        prev_move: Option<Direction>,
    ) -> impl Iterator<Item = Direction> + use<> {
        let blank = self.blank_pos();
        let side = self.side;
        Direction::ALL.into_iter().filter(move |&dir| {
            prev_move.is_none_or(|prev| prev.opposite() != dir) && blank.step(dir, side).is_some()
        })
    }

    /// Applies a move, returning the resulting board, or `None` when the
    /// blank would leave the board.
    #[must_use]
    pub fn try_apply(&self, direction: Direction) -> Option<Self> {
        let target = self.blank_pos().step(direction, self.side)?;
        let target = target.index(self.side);
        let mut cells = self.cells.clone();
        cells.swap(usize::from(self.blank), usize::from(target));
        Some(Self {
            side: self.side,
            cells,
            blank: target,
        })
    }

    /// Applies a legal move, returning the resulting board.
    ///
    /// # Panics
    ///
    /// Panics when the move is illegal; callers choose moves from
    /// [`legal_moves`](Board::legal_moves).
    #[must_use]
    pub fn apply(&self, direction: Direction) -> Self {
        self.try_apply(direction)
            .unwrap_or_else(|| panic!("illegal move {direction} from blank at {:?}", self.blank_pos()))
    }

    /// Packs the board into an integer key.
    ///
    /// Each cell takes the minimum number of bits that holds the largest
    /// label, so boards up to side 5 fit a `u128`. Two boards of the same
    /// side are equal iff their keys are equal, which makes the key a
    /// compact stand-in for the board in path sets.
    #[must_use]
    pub fn packed(&self) -> u128 {
        let bits = u32::from(self.area() - 1).ilog2() + 1;
        self.cells
            .iter()
            .fold(0u128, |acc, &label| (acc << bits) | u128::from(label))
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Parses the whitespace-separated label format, inferring the side
    /// from the label count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let labels = s
            .split_whitespace()
            .map(|token| {
                token.parse::<u8>().map_err(|_| ParseBoardError::InvalidToken {
                    token: token.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let side = (1..=MAX_SIDE)
            .find(|side| usize::from(side * side) == labels.len())
            .ok_or(ParseBoardError::NotSquare {
                count: labels.len(),
            })?;
        Ok(Self::new(side, labels)?)
    }
}

impl fmt::Display for Board {
    /// Renders the board as rows of aligned labels.
    ///
    /// The plain form round-trips through [`FromStr`] and prints the blank
    /// as `0`. The alternate form (`{:#}`) draws the bordered grid used by
    /// the console front-end, leaving the blank cell empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.area() - 1).to_string().len();
        if f.alternate() {
            let cell_width = width + 2;
            let inner = (cell_width + 1) * usize::from(self.side) - 1;
            writeln!(f, "+{}+", "-".repeat(inner))?;
            for row in 0..self.side {
                write!(f, "|")?;
                for col in 0..self.side {
                    let label = self.label_at(Pos::new(row, col));
                    if label == 0 {
                        write!(f, "{:cell_width$}", "")?;
                    } else {
                        write!(f, "{label:^cell_width$}")?;
                    }
                    write!(f, "|")?;
                }
                writeln!(f)?;
                if row + 1 < self.side {
                    writeln!(f, "|{}|", "-".repeat(inner))?;
                }
            }
            write!(f, "+{}+", "-".repeat(inner))
        } else {
            for row in 0..self.side {
                if row > 0 {
                    writeln!(f)?;
                }
                for col in 0..self.side {
                    if col > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{:>width$}", self.label_at(Pos::new(row, col)))?;
                }
            }
            Ok(())
        }
    }
}
