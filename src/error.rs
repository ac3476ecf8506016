//! Error type shared by every part of the puzzle core.

use crate::pieces::PieceTypes;

/// Errors raised while building, indexing or solving a puzzle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PuzzleError {
    /// Malformed constructor input, e.g. a side with fewer than two points.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No integral, consistent width and height exist for the given counts.
    #[error("no {perimeter}/{area} puzzle exists: {reason}")]
    InvalidDimensions {
        perimeter: usize,
        area: usize,
        reason: String,
    },

    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A single type was requested from a piece that has zero or several candidates.
    #[error("piece has no single definite type (candidates: {0})")]
    NoDefiniteType(PieceTypes),

    /// The solver could not find any unplaced piece for the cell at `(x, y)`.
    #[error("no piece fits at ({x}, {y})")]
    PieceNotFound { x: usize, y: usize },

    #[error("solver has not been initialized")]
    NotInitialized,
}

pub type Result<T, E = PuzzleError> = std::result::Result<T, E>;
