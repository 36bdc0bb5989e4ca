use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write as _},
    path::Path,
};

use quince_core::Board;

use super::{MAX_GROUP, Partition, PdbError, builder, file, ranking};
use crate::Heuristic;

/// An additive disjoint pattern database.
///
/// Holds one dense cost table per group of its [`Partition`]. The
/// heuristic value of a board is the sum over groups of the cost stored
/// for that group's current tile placement; the per-group costs count
/// only the group's own moves, so the sum never exceeds the true optimum.
///
/// Databases are immutable once built or loaded and may be shared freely
/// across concurrent solves.
///
/// # Examples
///
/// ```
/// use quince_core::Board;
/// use quince_solver::{Heuristic as _, Partition, PatternDb};
///
/// let db = PatternDb::build(Partition::default_for(3).unwrap(), None)?;
/// assert_eq!(db.estimate(&Board::solved(3)), 0);
/// # Ok::<(), quince_solver::PdbError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PatternDb {
    partition: Partition,
    tables: Vec<Box<[u8]>>,
}

impl PatternDb {
    /// Builds the database by enumerating every group of `partition`.
    ///
    /// Groups build in parallel; `workers` caps the worker pool, `None`
    /// uses one worker per core. Building the 15-puzzle's standard
    /// partitions takes minutes and is meant to happen once, with the
    /// result persisted via [`save`](PatternDb::save).
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::WorkerPool`] when the worker pool cannot start.
    pub fn build(partition: Partition, workers: Option<usize>) -> Result<Self, PdbError> {
        let tables = builder::build_tables(&partition, workers)?
            .into_iter()
            .map(Vec::into_boxed_slice)
            .collect();
        Ok(Self { partition, tables })
    }

    /// Reads a database from disk, validating the whole container.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::Missing`] when no file exists at `path`,
    /// [`PdbError::Corrupt`] when validation fails, and [`PdbError::Io`]
    /// for other I/O failures.
    pub fn load(path: &Path) -> Result<Self, PdbError> {
        let file = File::open(path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                PdbError::Missing {
                    path: path.to_owned(),
                }
            } else {
                PdbError::Io(err)
            }
        })?;
        let (partition, tables) = file::read_from(&mut BufReader::new(file))?;
        let db = Self { partition, tables };
        log::info!(
            "loaded pattern database: side {}, {} groups, {} entries",
            db.side(),
            db.partition.groups().len(),
            db.entry_count()
        );
        Ok(db)
    }

    /// Writes the database to disk in the container format.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::Io`] when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), PdbError> {
        let mut writer = BufWriter::new(File::create(path)?);
        file::write_to(&mut writer, &self.partition, &self.tables)?;
        writer.flush()?;
        Ok(())
    }

    /// Board side this database was built for.
    #[must_use]
    #[inline]
    pub const fn side(&self) -> u8 {
        self.partition.side()
    }

    /// The partition the tables were built from.
    #[must_use]
    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Total number of stored entries across all groups.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.tables.iter().map(|table| table.len()).sum()
    }

    /// Checks that `board` has the side this database was built for.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::IncompatibleSide`] on mismatch.
    pub fn check_board(&self, board: &Board) -> Result<(), PdbError> {
        if board.side() == self.side() {
            Ok(())
        } else {
            Err(PdbError::IncompatibleSide {
                db_side: self.side(),
                board_side: board.side(),
            })
        }
    }

    /// Cost of one group's current placement on `board`.
    ///
    /// # Panics
    ///
    /// Panics when the board side does not match or `group_index` is out
    /// of range.
    #[must_use]
    pub fn group_cost(&self, board: &Board, group_index: usize) -> u32 {
        assert_eq!(board.side(), self.side(), "board side mismatch");
        let positions = positions_by_label(board);
        self.lookup(&positions, group_index)
    }

    fn lookup(&self, positions: &[u8], group_index: usize) -> u32 {
        let group = &self.partition.groups()[group_index];
        let mut cells = [0u8; MAX_GROUP];
        for (slot, &label) in cells.iter_mut().zip(group.labels()) {
            *slot = positions[usize::from(label)];
        }
        let rank = ranking::rank(&cells[..group.len()], self.side() * self.side());
        u32::from(self.tables[group_index][usize::try_from(rank).expect("rank out of range")])
    }
}

impl Heuristic for PatternDb {
    /// Sums the per-group costs of the board's current tile placement.
    ///
    /// # Panics
    ///
    /// Panics when the board side does not match; callers pair boards and
    /// databases through [`check_board`](PatternDb::check_board).
    fn estimate(&self, board: &Board) -> u32 {
        assert_eq!(board.side(), self.side(), "board side mismatch");
        let positions = positions_by_label(board);
        (0..self.partition.groups().len())
            .map(|group_index| self.lookup(&positions, group_index))
            .sum()
    }
}

/// Cell of every label, on the stack; index by label.
fn positions_by_label(board: &Board) -> [u8; 25] {
    let mut positions = [0u8; 25];
    #[expect(clippy::cast_possible_truncation)]
    for (cell, &label) in board.cells().iter().enumerate() {
        positions[usize::from(label)] = cell as u8;
    }
    positions
}

#[cfg(test)]
mod tests {
    use quince_core::Direction;

    use super::*;
    use crate::{manhattan::Manhattan, testing::optimal_distances};

    fn small_db() -> PatternDb {
        PatternDb::build(Partition::default_for(3).unwrap(), Some(2)).unwrap()
    }

    #[test]
    fn test_goal_estimates_zero() {
        assert_eq!(small_db().estimate(&Board::solved(3)), 0);
    }

    #[test]
    fn test_single_move_estimates_one() {
        let db = small_db();
        let board = Board::solved(3).apply(Direction::Left);
        assert_eq!(db.estimate(&board), 1);
    }

    #[test]
    fn test_admissible_and_dominates_manhattan_on_3x3() {
        // Check the database against the exact distances of every
        // reachable 3×3 board: never above the optimum, never below the
        // Manhattan bound restricted to each group's tiles.
        let db = small_db();
        let manhattan = Manhattan::new(3);
        for (board, distance) in optimal_distances(3) {
            let estimate = db.estimate(&board);
            assert!(
                estimate <= distance,
                "estimate {estimate} exceeds optimum {distance} for {board}"
            );
            let restricted: u32 = db
                .partition()
                .groups()
                .iter()
                .enumerate()
                .map(|(index, group)| {
                    assert!(
                        db.group_cost(&board, index)
                            >= manhattan.estimate_labels(&board, group.labels())
                    );
                    db.group_cost(&board, index)
                })
                .sum();
            assert_eq!(restricted, estimate);
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let db = small_db();
        let path = std::env::temp_dir().join(format!("quince-db-{}.qpdb", std::process::id()));
        db.save(&path).unwrap();
        let loaded = PatternDb::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.partition(), db.partition());
        assert_eq!(loaded.estimate(&Board::solved(3)), 0);
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let encode = |db: &PatternDb| {
            let mut bytes = Vec::new();
            file::write_to(&mut bytes, &db.partition, &db.tables).unwrap();
            bytes
        };
        assert_eq!(encode(&small_db()), encode(&small_db()));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("quince-no-such-db.qpdb");
        let err = PatternDb::load(&path).unwrap_err();
        assert!(matches!(err, PdbError::Missing { .. }));
    }

    #[test]
    fn test_check_board_side() {
        let db = small_db();
        assert!(db.check_board(&Board::solved(3)).is_ok());
        let err = db.check_board(&Board::solved(4)).unwrap_err();
        assert!(matches!(
            err,
            PdbError::IncompatibleSide {
                db_side: 3,
                board_side: 4
            }
        ));
    }
}
