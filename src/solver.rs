//! Row-major placement solvers.
//!
//! A solver fills the grid one cell per [`Solver::next_step`], west to east and
//! north to south. The first cell takes the top-left corner. Every later cell
//! is described by a *signature* piece built from its surroundings: a flat side
//! towards the border, the inverse of the facing side of each placed
//! neighbour, and an unknown side towards each empty cell. Because the walk is
//! row-major the north and west neighbours are always placed, so the signature
//! is never empty.
//!
//! Neither solver backtracks: a cell without a matching piece fails the run.

use tracing::{debug, info, warn};

use crate::error::{PuzzleError, Result};
use crate::geometry::Side;
use crate::grid::{infer_dimensions, Grid, Neighbor};
use crate::index::{PieceId, PieceIndex};
use crate::pieces::{Direction, Piece, PieceType, PieceTypes};
use crate::Solver;

/// Lifecycle of a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverState {
    #[default]
    Uninitialized,
    Running,
    Complete,
    /// A cell had no matching piece; the run cannot continue.
    Failed,
}

/// Which placement strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    /// Pieces arrive facing the right way.
    #[default]
    Simple,
    /// Pieces arrive turned by unknown quarter turns.
    Rotation,
}

impl SolverKind {
    pub fn build(self) -> Box<dyn Solver> {
        match self {
            SolverKind::Simple => Box::new(SimpleSolver::new()),
            SolverKind::Rotation => Box::new(RotationSolver::new()),
        }
    }
}

/// Loads `pieces` into an index and infers the grid size from them.
fn load(pieces: Vec<Piece>) -> Result<(PieceIndex, usize, usize)> {
    if pieces.is_empty() {
        return Err(PuzzleError::InvalidArgument(
            "cannot solve a puzzle without pieces".to_string(),
        ));
    }

    let area = pieces.len();
    let perimeter = pieces
        .iter()
        .filter(|piece| {
            piece
                .piece_types()
                .single()
                .is_some_and(|piece_type| PieceTypes::BORDER.contains(piece_type))
        })
        .count();
    let (width, height) = infer_dimensions(perimeter, area)?;

    Ok((PieceIndex::from_pieces(pieces), width, height))
}

/// Grid, unplaced pieces and cursor, shared by both solvers.
#[derive(Debug, Clone)]
struct Board {
    grid: Grid,
    unplaced: PieceIndex,
    x: usize,
    y: usize,
    state: SolverState,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            grid: Grid::new(0, 0),
            unplaced: PieceIndex::new(),
            x: 0,
            y: 0,
            state: SolverState::Uninitialized,
        }
    }
}

impl Board {
    fn start(&mut self, unplaced: PieceIndex, width: usize, height: usize) {
        info!(width, height, pieces = unplaced.len(), "solver initialized");
        *self = Self {
            grid: Grid::new(width, height),
            unplaced,
            x: 0,
            y: 0,
            state: SolverState::Running,
        };
    }

    /// `Some(done)` when no step should be taken.
    fn check_state(&self) -> Result<Option<bool>> {
        match self.state {
            SolverState::Uninitialized => Err(PuzzleError::NotInitialized),
            SolverState::Running => Ok(None),
            SolverState::Complete => Ok(Some(true)),
            SolverState::Failed => Err(self.not_found()),
        }
    }

    fn at_origin(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    fn not_found(&self) -> PuzzleError {
        PuzzleError::PieceNotFound {
            x: self.x,
            y: self.y,
        }
    }

    fn fail(&mut self) -> PuzzleError {
        warn!(x = self.x, y = self.y, "no piece fits, giving up");
        self.state = SolverState::Failed;
        self.not_found()
    }

    /// The piece the cursor cell needs, as far as its surroundings tell.
    fn signature(&self) -> Result<Piece> {
        let mut builder = Piece::builder();
        for dir in Direction::ALL {
            match self.grid.neighbor(self.x, self.y, dir) {
                Neighbor::Border => builder.set_side(dir, Side::border()),
                Neighbor::Placed(neighbor) => {
                    if let Some(side) = neighbor.side(dir.opposite()) {
                        builder.set_side(dir, side.inverse());
                    }
                }
                Neighbor::Empty => {}
            }
        }
        builder.build()
    }

    fn take(&mut self, id: PieceId) -> Result<Piece> {
        match self.unplaced.remove(id) {
            Some(piece) => Ok(piece),
            None => Err(self.fail()),
        }
    }

    fn place(&mut self, id: PieceId, piece: Piece) {
        debug!(x = self.x, y = self.y, %id, "placed piece");
        self.grid.set(self.x, self.y, piece);
    }

    /// Moves the cursor to the next cell; true once the grid is full.
    fn advance(&mut self) -> bool {
        self.x += 1;
        if self.x >= self.grid.width() {
            self.x = 0;
            self.y += 1;
        }
        if self.y >= self.grid.height() {
            self.state = SolverState::Complete;
            true
        } else {
            false
        }
    }

    /// Swaps width and height, keeping the pieces of the first row.
    fn transpose(&mut self) {
        let (width, height) = (self.grid.height(), self.grid.width());
        warn!(width, height, "first row ended early, transposing grid");
        self.grid = self.grid.with_first_row(width, height);
    }
}

/// Solver for pieces that arrive facing the right way.
#[derive(Debug, Clone, Default)]
pub struct SimpleSolver {
    board: Board,
}

impl SimpleSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first definite corner whose north and west sides are flat.
    fn top_left_corner(&self) -> Option<PieceId> {
        let unplaced = &self.board.unplaced;
        unplaced
            .iter(Direction::North)
            .find(|(_, piece)| {
                piece.is_definitely(PieceType::Corner)
                    && piece.is_flat(Direction::North)
                    && piece.is_flat(Direction::West)
            })
            .map(|(id, _)| id)
            // a lone piece is flat all round and has no type
            .or_else(|| {
                let signature = self.board.signature().ok()?;
                unplaced.find(&signature)
            })
    }
}

impl Solver for SimpleSolver {
    fn init(&mut self, pieces: Vec<Piece>) -> Result<()> {
        let (unplaced, mut width, mut height) = load(pieces)?;

        // only the top row has flat north sides
        let flat_north = unplaced
            .iter(Direction::North)
            .filter(|(_, piece)| piece.is_flat(Direction::North))
            .count();
        if width != height && flat_north == height {
            std::mem::swap(&mut width, &mut height);
        }

        self.board.start(unplaced, width, height);
        Ok(())
    }

    fn next_step(&mut self) -> Result<bool> {
        if let Some(done) = self.board.check_state()? {
            return Ok(done);
        }

        let found = if self.board.at_origin() {
            self.top_left_corner()
        } else {
            let signature = self.board.signature()?;
            self.board.unplaced.find(&signature)
        };
        let Some(id) = found else {
            return Err(self.board.fail());
        };

        let piece = self.board.take(id)?;
        self.board.place(id, piece);
        Ok(self.board.advance())
    }

    fn solution(&self) -> &Grid {
        &self.board.grid
    }

    fn unplaced_pieces(&self) -> &PieceIndex {
        &self.board.unplaced
    }

    fn cursor(&self) -> (usize, usize) {
        (self.board.x, self.board.y)
    }

    fn state(&self) -> SolverState {
        self.board.state
    }
}

/// Solver for pieces turned by unknown quarter turns.
///
/// Every found piece is turned back into place before it is put on the grid.
/// A rotated puzzle has no intrinsic orientation, so the first corner decides
/// it: if the first row meets the east border early, the grid is transposed.
#[derive(Debug, Clone, Default)]
pub struct RotationSolver {
    board: Board,
}

impl RotationSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first definite corner, with the direction its flat west-to-be side
    /// currently faces.
    fn any_corner(&self) -> Option<(PieceId, Direction)> {
        self.board
            .unplaced
            .iter(Direction::North)
            .filter(|(_, piece)| piece.is_definitely(PieceType::Corner))
            .find_map(|(id, piece)| {
                Direction::ALL
                    .into_iter()
                    .find(|&dir| piece.is_flat(dir) && piece.is_flat(dir.turned(1)))
                    .map(|dir| (id, dir))
            })
    }

    /// Tries the signature under every rotation.
    fn find_turned(&self, signature: &Piece) -> Option<(PieceId, Direction)> {
        Direction::ALL.into_iter().find_map(|facing| {
            let query = signature.clone().rotated(Direction::North, facing);
            self.board.unplaced.find(&query).map(|id| (id, facing))
        })
    }
}

impl Solver for RotationSolver {
    fn init(&mut self, pieces: Vec<Piece>) -> Result<()> {
        let (unplaced, width, height) = load(pieces)?;
        self.board.start(unplaced, width, height);
        Ok(())
    }

    fn next_step(&mut self) -> Result<bool> {
        if let Some(done) = self.board.check_state()? {
            return Ok(done);
        }

        let (id, piece) = if self.board.at_origin() {
            let Some((id, west)) = self.any_corner() else {
                return Err(self.board.fail());
            };
            (id, self.board.take(id)?.rotated(west, Direction::West))
        } else {
            let signature = self.board.signature()?;
            let Some((id, north)) = self.find_turned(&signature) else {
                return Err(self.board.fail());
            };
            (id, self.board.take(id)?.rotated(north, Direction::North))
        };

        let (x, y) = (self.board.x, self.board.y);
        let row_ends_early = y == 0
            && x + 1 < self.board.grid.width()
            && x + 1 == self.board.grid.height()
            && piece.is_flat(Direction::East);

        self.board.place(id, piece);
        if row_ends_early {
            self.board.transpose();
        }
        Ok(self.board.advance())
    }

    fn solution(&self) -> &Grid {
        &self.board.grid
    }

    fn unplaced_pieces(&self) -> &PieceIndex {
        &self.board.unplaced
    }

    fn cursor(&self) -> (usize, usize) {
        (self.board.x, self.board.y)
    }

    fn state(&self) -> SolverState {
        self.board.state
    }
}
