//! Jigsaw Puzzle Library
//!
//! Generates jigsaw puzzles whose pieces carry polyline sides, and solves them
//! by matching side geometry alone. Pieces are looked up through a sorted
//! [`PieceIndex`](index::PieceIndex) and placed row by row.

pub mod error;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod index;
pub mod pieces;
pub mod search;
pub mod solver;

use error::Result;
use grid::Grid;
use index::PieceIndex;
use pieces::Piece;
use solver::SolverState;

/// Step-wise solver interface, usable as a trait object.
///
/// Callers drive a solver one placement at a time, which lets front ends show
/// the grid filling up.
pub trait Solver {
    /// Indexes `pieces` and infers the grid size, discarding any previous run.
    fn init(&mut self, pieces: Vec<Piece>) -> Result<()>;

    /// Places one piece. Returns `Ok(true)` once the grid is full.
    fn next_step(&mut self) -> Result<bool>;

    fn solution(&self) -> &Grid;

    fn unplaced_pieces(&self) -> &PieceIndex;

    /// The cell the next step fills.
    fn cursor(&self) -> (usize, usize);

    fn state(&self) -> SolverState;

    /// Steps until the grid is full or a cell cannot be filled.
    fn run(&mut self) -> Result<()> {
        while !self.next_step()? {}
        Ok(())
    }
}
