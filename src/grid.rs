//! The solution grid, dimension inference and text rendering.
//!
//! Cells are addressed by `(x, y)` with `x` growing eastwards and `y` growing
//! southwards. Storage is row-major: `idx = y * width + x`.

use crate::error::{PuzzleError, Result};
use crate::geometry::SideType;
use crate::pieces::{Direction, Piece};

/// Largest distance allowed between the exact root and its rounding.
const ROOT_TOLERANCE: f64 = 0.1;

/// Recovers `(width, height)` of a rectangular puzzle, with `width >= height`.
///
/// `perimeter` counts the pieces with at least one flat side and `area` counts
/// all pieces. For a `w`x`h` grid `perimeter = 2w + 2h - 4` and `area = w * h`,
/// so `w` is the larger root of `w^2 - ((perimeter + 4) / 2) w + area = 0`.
pub fn infer_dimensions(perimeter: usize, area: usize) -> Result<(usize, usize)> {
    let invalid = |reason: String| PuzzleError::InvalidDimensions {
        perimeter,
        area,
        reason,
    };

    if area == 0 {
        return Err(invalid("a puzzle needs at least one piece".to_string()));
    }

    let half_sum = (perimeter as f64 + 4.0) / 2.0;
    let discriminant = half_sum * half_sum - 4.0 * area as f64;
    if discriminant < 0.0 {
        return Err(invalid(format!("discriminant {discriminant} is negative")));
    }

    let exact = (half_sum + discriminant.sqrt()) / 2.0;
    let width = exact.round() as usize;
    let error = (exact - width as f64).abs();
    if width == 0 || error > ROOT_TOLERANCE {
        return Err(invalid(format!("width {exact} is not integral")));
    }
    if area % width != 0 {
        return Err(invalid(format!(
            "area {area} is not divisible by width {width}"
        )));
    }

    let height = area / width;
    // compared wide so huge counts cannot overflow
    let reconstructed = 2 * (width as u128 + height as u128);
    if reconstructed != perimeter as u128 + 4 {
        return Err(invalid(format!(
            "a {width}x{height} grid has a perimeter of {}",
            reconstructed - 4
        )));
    }

    Ok(if width >= height {
        (width, height)
    } else {
        (height, width)
    })
}

/// Is `(x, y)` inside a `width`x`height` grid?
#[inline]
pub fn in_bounds(width: usize, height: usize, x: isize, y: isize) -> bool {
    0 <= x && (x as usize) < width && 0 <= y && (y as usize) < height
}

/// What lies next to a cell in some direction.
#[derive(Debug, Clone, Copy)]
pub enum Neighbor<'a> {
    /// Outside the grid.
    Border,
    Empty,
    Placed(&'a Piece),
}

/// A `width`x`height` grid of placed pieces.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<Piece>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Builds a full grid from row-major cells.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Piece>) -> Result<Self> {
        if cells.len() != width * height {
            return Err(PuzzleError::InvalidArgument(format!(
                "{} cells cannot fill a {width}x{height} grid",
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells: cells.into_iter().map(Some).collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The piece at `(x, y)`, if one is placed there.
    pub fn get(&self, x: usize, y: usize) -> Option<&Piece> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x].as_ref()
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, piece: Piece) {
        self.cells[y * self.width + x] = Some(piece);
    }

    pub fn neighbor(&self, x: usize, y: usize, dir: Direction) -> Neighbor<'_> {
        let (dx, dy) = dir.offset();
        let (nx, ny) = (x as isize + dx, y as isize + dy);
        if !in_bounds(self.width, self.height, nx, ny) {
            return Neighbor::Border;
        }
        match self.get(nx as usize, ny as usize) {
            Some(piece) => Neighbor::Placed(piece),
            None => Neighbor::Empty,
        }
    }

    pub fn placed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Cells of row `y`, west to east.
    pub fn row(&self, y: usize) -> &[Option<Piece>] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// All placed pieces with their coordinates, row by row.
    pub fn placed(&self) -> impl Iterator<Item = (usize, usize, &Piece)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.as_ref()
                .map(|piece| (idx % self.width, idx / self.width, piece))
        })
    }

    /// Consumes the grid, yielding its cells row by row.
    pub fn into_cells(self) -> Vec<Option<Piece>> {
        self.cells
    }

    /// A grid of the given size holding only this grid's first row.
    ///
    /// Cells that do not fit the new width are dropped.
    pub(crate) fn with_first_row(&self, width: usize, height: usize) -> Self {
        let mut reshaped = Self::new(width, height);
        for (x, cell) in self.row(0).iter().take(width).enumerate() {
            reshaped.cells[x] = cell.clone();
        }
        reshaped
    }
}

/// Renders one character per cell under a size header.
///
/// `C`, `E` and `M` mark corner, edge and middle pieces, `?` a piece without
/// a definite type and `.` an empty cell.
pub fn format_solution(grid: &Grid) -> String {
    let mut lines = vec![format!(
        "Puzzle {}x{} ({}/{} placed)",
        grid.width(),
        grid.height(),
        grid.placed_count(),
        grid.width() * grid.height()
    )];

    for y in 0..grid.height() {
        let line = grid
            .row(y)
            .iter()
            .map(|cell| match cell {
                Some(piece) => type_symbol(piece),
                None => '.',
            })
            .collect();
        lines.push(line);
    }

    lines.join("\n")
}

/// Renders every cell as a 3x3 block that shows the shape of each side.
///
/// Flat sides are drawn as `-` or `|`, tabs as arrows pointing the way the
/// side bulges; the block centre holds the piece type.
pub fn format_solution_detailed(grid: &Grid) -> String {
    let mut lines = Vec::with_capacity(grid.height() * 3);

    for y in 0..grid.height() {
        let mut top = String::new();
        let mut middle = String::new();
        let mut bottom = String::new();

        for cell in grid.row(y) {
            match cell {
                Some(piece) => {
                    let glyph = |dir| side_glyph(piece, dir);
                    let centre = type_symbol(piece);
                    top.extend(['+', glyph(Direction::North), '+']);
                    middle.extend([glyph(Direction::West), centre, glyph(Direction::East)]);
                    bottom.extend(['+', glyph(Direction::South), '+']);
                }
                None => {
                    top.push_str("   ");
                    middle.push_str(" . ");
                    bottom.push_str("   ");
                }
            }
        }

        lines.extend([top, middle, bottom]);
    }

    lines.join("\n")
}

fn type_symbol(piece: &Piece) -> char {
    piece
        .piece_type()
        .map_or('?', |piece_type| piece_type.symbol())
}

/// Glyph for the side of `piece` facing `dir`, drawn in grid orientation.
fn side_glyph(piece: &Piece, dir: Direction) -> char {
    let Some(side) = piece.side(dir) else {
        return ' ';
    };

    // an outward tab points in `dir`, an inward tab points back at the centre
    let facing = match side.side_type() {
        SideType::Flat => {
            return match dir {
                Direction::North | Direction::South => '-',
                Direction::East | Direction::West => '|',
            };
        }
        SideType::Out => dir,
        SideType::In => dir.opposite(),
    };

    match facing {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}
