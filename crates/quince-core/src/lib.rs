//! Board model for square sliding-tile puzzles.
//!
//! This crate provides the value types shared by every layer of the solver:
//!
//! - [`Board`]: a flat, row-major arrangement of tile labels with a cached
//!   blank position
//! - [`Direction`]: the four moves, named for the direction the blank travels
//! - [`Pos`]: a row/column coordinate on the board
//!
//! Boards are immutable values. Applying a move produces a fresh board, so
//! search code can expand children freely and discard them on backtrack.
//!
//! # Examples
//!
//! ```
//! use quince_core::{Board, Direction};
//!
//! let board: Board = "1 2 3 4 5 6 7 8 9 10 11 12 13 14 0 15".parse()?;
//! assert!(!board.is_solved());
//!
//! let next = board.apply(Direction::Right);
//! assert!(next.is_solved());
//! # Ok::<(), quince_core::ParseBoardError>(())
//! ```

pub use self::{
    board::{Board, BoardError, ParseBoardError},
    direction::Direction,
    pos::Pos,
};

mod board;
mod direction;
mod pos;

/// Largest supported board side.
///
/// Sides up to 5 keep every packed board key within a `u128` and every
/// pattern rank within a `u64`, which the solver layers rely on.
pub const MAX_SIDE: u8 = 5;
