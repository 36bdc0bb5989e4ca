use crate::Direction;

/// A cell coordinate on a square board.
///
/// `Pos` carries only the row and column; the board side is passed to the
/// conversions that need it, mirroring how cell indices are stored as plain
/// integers throughout the hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    row: u8,
    col: u8,
}

impl Pos {
    /// Creates a position from row and column.
    #[must_use]
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Converts a row-major cell index into a position.
    #[must_use]
    #[inline]
    pub const fn from_index(index: u8, side: u8) -> Self {
        Self {
            row: index / side,
            col: index % side,
        }
    }

    /// Converts this position into a row-major cell index.
    #[must_use]
    #[inline]
    pub const fn index(self, side: u8) -> u8 {
        self.row * side + self.col
    }

    /// Row of this position, counted from the top.
    #[must_use]
    #[inline]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Column of this position, counted from the left.
    #[must_use]
    #[inline]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// Moves one step in `direction`, or `None` when that would leave the
    /// board.
    #[must_use]
    #[inline]
    pub fn step(self, direction: Direction, side: u8) -> Option<Self> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < side && col < side).then_some(Self { row, col })
    }

    /// Manhattan distance to `other`.
    #[must_use]
    #[inline]
    pub const fn manhattan(self, other: Self) -> u8 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}
