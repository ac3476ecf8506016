//! Random puzzle generation.
//!
//! Interior edges are random polylines: starting at `x = 0`, x advances by a
//! random step and each new point deviates up or down by a random amount until
//! the far corner at `SIDE_LENGTH` is reached. The piece on the far side of an
//! edge receives the [`Side::inverse`] of the curve; border edges are the
//! canonical [`Side::border`].

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{PuzzleError, Result};
use crate::geometry::{Point, Side, SIDE_LENGTH};
use crate::grid::Grid;
use crate::pieces::{Direction, Piece, NUM_SIDES};

/// Shape parameters of generated sides, as fractions of [`SIDE_LENGTH`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Smallest horizontal distance between consecutive points.
    pub min_step: f64,
    pub max_step: f64,
    /// Smallest vertical deviation of an interior point from the baseline.
    pub min_deviation: f64,
    pub max_deviation: f64,
    /// Turn every piece by a random number of quarter turns.
    pub rotate: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_step: 0.1,
            max_step: 0.2,
            min_deviation: 0.02,
            max_deviation: 0.2,
            rotate: false,
        }
    }
}

impl GeneratorConfig {
    /// Default shapes, with pieces turned randomly.
    pub fn rotated() -> Self {
        Self {
            rotate: true,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        let ranges = [
            ("step", self.min_step, self.max_step),
            ("deviation", self.min_deviation, self.max_deviation),
        ];
        for (name, min, max) in ranges {
            if !(min > 0.0 && min <= max) {
                return Err(PuzzleError::InvalidArgument(format!(
                    "{name} range {min}..={max} must be positive and non-empty"
                )));
            }
        }
        // a step of a whole side leaves no room for a tab
        if self.min_step >= 1.0 {
            return Err(PuzzleError::InvalidArgument(format!(
                "min_step {} must be below 1 to leave room for a tab",
                self.min_step
            )));
        }
        Ok(())
    }
}

/// Produces random puzzles from a seeded generator.
#[derive(Debug, Clone)]
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(seed: u64, config: GeneratorConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// A generator with the default configuration.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, GeneratorConfig::default())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a solved `width`x`height` puzzle with pre-aligned pieces.
    pub fn generate_grid(&mut self, width: usize, height: usize) -> Result<Grid> {
        if width == 0 || height == 0 {
            return Err(PuzzleError::InvalidArgument(format!(
                "cannot generate a {width}x{height} puzzle"
            )));
        }
        self.config.validate()?;

        // sides[y * width + x][dir]
        let mut sides: Vec<[Option<Side>; NUM_SIDES]> = vec![Default::default(); width * height];
        for y in 0..height {
            for x in 0..width {
                let cell = y * width + x;
                if x + 1 < width {
                    let edge = self.interior_side();
                    sides[cell + 1][Direction::West.index()] = Some(edge.inverse());
                    sides[cell][Direction::East.index()] = Some(edge);
                }
                if y + 1 < height {
                    let edge = self.interior_side();
                    sides[cell + width][Direction::North.index()] = Some(edge.inverse());
                    sides[cell][Direction::South.index()] = Some(edge);
                }
            }
        }

        let pieces = sides
            .into_iter()
            .map(|[north, east, south, west]| {
                Piece::from_sides(
                    north.unwrap_or_else(Side::border),
                    east.unwrap_or_else(Side::border),
                    south.unwrap_or_else(Side::border),
                    west.unwrap_or_else(Side::border),
                )
            })
            .collect();

        debug!(width, height, "generated puzzle layout");
        Grid::from_cells(width, height, pieces)
    }

    /// Generates the pieces of a `width`x`height` puzzle in random order.
    ///
    /// Pieces are turned randomly when the configuration asks for it.
    pub fn generate(&mut self, width: usize, height: usize) -> Result<Vec<Piece>> {
        let mut pieces: Vec<Piece> = self
            .generate_grid(width, height)?
            .into_cells()
            .into_iter()
            .flatten()
            .collect();
        pieces.shuffle(&mut self.rng);

        if self.config.rotate {
            for piece in &mut pieces {
                let to = Direction::from_index(self.rng.gen_range(0..NUM_SIDES));
                piece.rotate(Direction::North, to);
            }
        }

        Ok(pieces)
    }

    /// A random non-flat side.
    fn interior_side(&mut self) -> Side {
        loop {
            let mut points = vec![Point::new(0.0, 0.0)];
            let mut x = self.step();
            while x < SIDE_LENGTH {
                let deviation = self.range(self.config.min_deviation, self.config.max_deviation);
                let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                points.push(Point::new(x, sign * deviation));
                x += self.step();
            }
            points.push(Point::new(SIDE_LENGTH, 0.0));

            // the mean-height classifier must see a tab, or the edge reads as border
            if let Ok(side) = Side::new(points) {
                if !side.is_flat() {
                    return side;
                }
            }
        }
    }

    fn step(&mut self) -> f64 {
        self.range(self.config.min_step, self.config.max_step)
    }

    fn range(&mut self, min: f64, max: f64) -> f64 {
        self.rng.gen_range(min..=max) * SIDE_LENGTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceType;

    #[test]
    fn test_generated_grid_is_consistent() {
        let grid = Generator::with_seed(11).generate_grid(5, 3).unwrap();
        assert!(grid.is_complete());

        for (x, y, piece) in grid.placed() {
            assert!(piece.is_fully_specified());
            for dir in Direction::ALL {
                let side = piece.side(dir).unwrap();
                let (dx, dy) = dir.offset();
                let (nx, ny) = (x as isize + dx, y as isize + dy);
                // negative coordinates wrap to huge values and miss the grid
                match grid.get(nx as usize, ny as usize) {
                    Some(neighbor) => {
                        assert!(!side.is_flat(), "interior side at ({x}, {y}) {dir} is flat");
                        assert_eq!(
                            neighbor.side(dir.opposite()),
                            Some(&side.inverse()),
                            "({x}, {y}) {dir} does not meet its neighbour"
                        );
                    }
                    _ => assert_eq!(side, &Side::border(), "({x}, {y}) {dir} is not a border"),
                }
            }
        }
    }

    #[test]
    fn test_piece_type_counts() {
        let pieces = Generator::with_seed(3).generate(6, 4).unwrap();
        let count = |piece_type| {
            pieces
                .iter()
                .filter(|piece| piece.is_definitely(piece_type))
                .count()
        };
        assert_eq!(pieces.len(), 24);
        assert_eq!(count(PieceType::Corner), 4);
        assert_eq!(count(PieceType::Edge), 2 * (6 - 2) + 2 * (4 - 2));
        assert_eq!(count(PieceType::Middle), 4 * 2);
    }

    #[test]
    fn test_same_seed_same_puzzle() {
        let first = Generator::with_seed(99).generate(4, 4).unwrap();
        let second = Generator::with_seed(99).generate(4, 4).unwrap();
        let other = Generator::with_seed(100).generate(4, 4).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_rotation_only_turns_pieces() {
        // the layout and shuffle consume the same random numbers either way
        let aligned = Generator::with_seed(5).generate(4, 4).unwrap();
        let rotated = Generator::new(5, GeneratorConfig::rotated())
            .generate(4, 4)
            .unwrap();

        for (original, turned) in aligned.iter().zip(&rotated) {
            assert_eq!(original.piece_types(), turned.piece_types());
            assert!(
                Direction::ALL
                    .into_iter()
                    .any(|to| turned.clone().rotated(to, Direction::North) == *original),
                "no rotation restores {original:?}"
            );
        }
        assert_ne!(aligned, rotated);
    }

    #[test]
    fn test_rejects_empty_puzzles() {
        let mut generator = Generator::with_seed(1);
        assert!(matches!(
            generator.generate(0, 3),
            Err(PuzzleError::InvalidArgument(_))
        ));
        assert!(matches!(
            generator.generate_grid(3, 0),
            Err(PuzzleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = GeneratorConfig {
            min_step: 0.0,
            ..GeneratorConfig::default()
        };
        assert!(Generator::new(1, config).generate(2, 2).is_err());
    }

    #[test]
    fn test_rejects_steps_spanning_the_whole_side() {
        for min_step in [1.0, 1.5] {
            let config = GeneratorConfig {
                min_step,
                max_step: 2.0,
                ..GeneratorConfig::default()
            };
            assert!(
                matches!(
                    Generator::new(1, config).generate(2, 2),
                    Err(PuzzleError::InvalidArgument(_))
                ),
                "min_step {min_step} should be rejected"
            );
        }

        // a step just short of the side still fits one interior point
        let config = GeneratorConfig {
            min_step: 0.9,
            max_step: 0.95,
            ..GeneratorConfig::default()
        };
        assert_eq!(Generator::new(1, config).generate(2, 2).unwrap().len(), 4);
    }
}
