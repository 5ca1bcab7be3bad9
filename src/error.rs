//! Errors reported by the board model and the search layer.
//!
//! Every condition here is recoverable: the search never aborts the process,
//! it reports the problem to the caller (usually [`crate::Session`]) which is
//! responsible for presenting it.

use thiserror::Error;

use crate::board::{Player, WIDTH};

/// Problems detected before or while running a search.
#[derive(Debug, Error)]
pub enum Error {
    /// The column index is outside of `[0, WIDTH)`.
    #[error("column {0} is out of range, expected 0..{WIDTH}")]
    InvalidColumn(usize),
    /// The column has no empty cells left.
    #[error("column {0} is full")]
    ColumnFull(usize),
    /// Every column is full, there is nothing to search.
    #[error("no legal move: the board is full")]
    NoLegalMove,
    /// The position is already decided.
    #[error("the game is over: {0} has four in a row")]
    GameOver(Player),
    /// Size mismatch, floating pieces or unbalanced piece counts.
    #[error("malformed board: {0}")]
    MalformedBoard(String),
    /// Search parameters that can not produce a move.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),
    /// The worker pool for parallel strategies could not be started.
    #[error("failed to start the worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Shorthand for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
