//! Additive disjoint pattern databases.
//!
//! A pattern database records, for one group of tiles, the minimum number
//! of moves *of that group's own tiles* needed to bring them to their goal
//! cells, for every placement of the group on the board. Because the
//! groups of a [`Partition`] are disjoint and each move is charged to at
//! most one group, the per-group costs may be summed, giving a much
//! stronger admissible bound than Manhattan distance.
//!
//! Tables are built once with [`PatternDb::build`], persisted with
//! [`PatternDb::save`], and from then on consulted read-only.

pub use self::{
    db::PatternDb,
    group::{Partition, PatternGroup},
};

mod builder;
mod db;
mod file;
mod group;
mod ranking;

use std::path::PathBuf;

use thiserror::Error;

/// Largest supported group size.
///
/// Eight tiles is the biggest group of the classic 7-8 split; anything
/// larger would neither fit the build budget nor the one-byte cost entries
/// the container stores.
pub(crate) const MAX_GROUP: usize = 8;

/// Error building, loading, or consulting a pattern database.
#[derive(Debug, Error)]
pub enum PdbError {
    /// No database file exists at the given path.
    #[error("pattern database not found at {}", path.display())]
    Missing {
        /// The path that was probed.
        path: PathBuf,
    },
    /// The file exists but is not a valid database.
    #[error("corrupt pattern database: {reason}")]
    Corrupt {
        /// What the validation found.
        reason: String,
    },
    /// The database was built for a different board side.
    #[error("pattern database built for side {db_side}, board side is {board_side}")]
    IncompatibleSide {
        /// Side recorded in the database.
        db_side: u8,
        /// Side of the board being estimated.
        board_side: u8,
    },
    /// The tile groups do not form a valid partition.
    #[error("invalid partition: {reason}")]
    InvalidPartition {
        /// What the validation found.
        reason: String,
    },
    /// The build worker pool could not be started.
    #[error("failed to start build workers")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    /// An underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
