//! Puzzle pieces, compass directions and piece types.
//!
//! A piece has one side slot per [`Direction`]. A slot may be unknown (`None`),
//! which is how the solver describes the piece it is looking for: a cell's
//! placed neighbours constrain some sides and leave the rest open.

use std::fmt;

use crate::error::{PuzzleError, Result};
use crate::geometry::Side;

/// Number of sides on every piece.
pub const NUM_SIDES: usize = 4;

/// Compass direction of a side slot, in clockwise order.
///
/// The grid's y-axis grows southwards, so row 0 is the northern border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; NUM_SIDES] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The direction at `index`, wrapping modulo four.
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % NUM_SIDES]
    }

    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Grid offset `(dx, dy)` of the neighbour in this direction.
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Number of clockwise quarter turns from `self` to `to`.
    pub const fn turns_to(self, to: Direction) -> usize {
        (to.index() + NUM_SIDES - self.index()) % NUM_SIDES
    }

    /// This direction after `turns` clockwise quarter turns.
    pub const fn turned(self, turns: usize) -> Self {
        Self::from_index(self.index() + turns)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Classification of a piece by the pattern of its flat sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PieceType {
    /// Two adjacent flat sides.
    Corner,
    /// Exactly one flat side.
    Edge,
    /// No flat side.
    Middle,
}

impl PieceType {
    pub const ALL: [PieceType; 3] = [PieceType::Corner, PieceType::Edge, PieceType::Middle];

    /// Could a piece with these sides be of this type?
    ///
    /// An unknown side may be flat or shaped, whichever the type needs.
    pub fn admits(self, sides: &[Option<Side>; NUM_SIDES]) -> bool {
        let can_be_flat = |index: usize| {
            sides[index % NUM_SIDES]
                .as_ref()
                .map_or(true, Side::is_flat)
        };
        let can_be_shaped = |index: usize| {
            sides[index % NUM_SIDES]
                .as_ref()
                .map_or(true, |side| !side.is_flat())
        };

        match self {
            PieceType::Corner => (0..NUM_SIDES).any(|first| {
                can_be_flat(first)
                    && can_be_flat(first + 1)
                    && can_be_shaped(first + 2)
                    && can_be_shaped(first + 3)
            }),
            PieceType::Edge => (0..NUM_SIDES).any(|flat| {
                can_be_flat(flat) && (1..NUM_SIDES).all(|step| can_be_shaped(flat + step))
            }),
            PieceType::Middle => (0..NUM_SIDES).all(can_be_shaped),
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Single-letter tag used by the text renderers.
    pub const fn symbol(self) -> char {
        match self {
            PieceType::Corner => 'C',
            PieceType::Edge => 'E',
            PieceType::Middle => 'M',
        }
    }
}

/// A set of piece types, stored as a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PieceTypes(u8);

impl PieceTypes {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self =
        Self(PieceType::Corner.bit() | PieceType::Edge.bit() | PieceType::Middle.bit());
    /// Corners and edges: every piece on the puzzle's border.
    pub const BORDER: Self = Self(PieceType::Corner.bit() | PieceType::Edge.bit());

    pub const fn only(piece_type: PieceType) -> Self {
        Self(piece_type.bit())
    }

    pub const fn contains(self, piece_type: PieceType) -> bool {
        self.0 & piece_type.bit() != 0
    }

    pub fn insert(&mut self, piece_type: PieceType) {
        self.0 |= piece_type.bit();
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The only member, if there is exactly one.
    pub fn single(self) -> Option<PieceType> {
        if self.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    pub fn iter(self) -> impl Iterator<Item = PieceType> {
        PieceType::ALL
            .into_iter()
            .filter(move |piece_type| self.contains(*piece_type))
    }
}

impl From<PieceType> for PieceTypes {
    fn from(piece_type: PieceType) -> Self {
        Self::only(piece_type)
    }
}

impl FromIterator<PieceType> for PieceTypes {
    fn from_iter<I: IntoIterator<Item = PieceType>>(iter: I) -> Self {
        let mut types = Self::EMPTY;
        for piece_type in iter {
            types.insert(piece_type);
        }
        types
    }
}

impl fmt::Debug for PieceTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for PieceTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, piece_type) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{piece_type:?}")?;
        }
        Ok(())
    }
}

/// A four-sided puzzle piece, possibly with unknown sides.
///
/// At least one side is always known. The candidate type set is derived from
/// the known sides on construction; rotation cannot change it.
#[derive(Debug, Clone)]
pub struct Piece {
    sides: [Option<Side>; NUM_SIDES],
    piece_types: PieceTypes,
}

impl Piece {
    /// Creates a piece from its sides, indexed by [`Direction::index`].
    pub fn new(sides: [Option<Side>; NUM_SIDES]) -> Result<Self> {
        if sides.iter().all(Option::is_none) {
            return Err(PuzzleError::InvalidArgument(
                "a piece needs at least one known side".to_string(),
            ));
        }

        let piece_types = PieceType::ALL
            .into_iter()
            .filter(|piece_type| piece_type.admits(&sides))
            .collect();

        Ok(Self { sides, piece_types })
    }

    /// Creates a fully specified piece.
    pub fn from_sides(north: Side, east: Side, south: Side, west: Side) -> Self {
        let sides = [Some(north), Some(east), Some(south), Some(west)];
        let piece_types = PieceType::ALL
            .into_iter()
            .filter(|piece_type| piece_type.admits(&sides))
            .collect();
        Self { sides, piece_types }
    }

    pub fn builder() -> PieceBuilder {
        PieceBuilder::default()
    }

    /// The side in `dir`, or `None` if it is unknown.
    #[inline]
    pub fn side(&self, dir: Direction) -> Option<&Side> {
        self.sides[dir.index()].as_ref()
    }

    pub fn is_side_unknown(&self, dir: Direction) -> bool {
        self.sides[dir.index()].is_none()
    }

    /// Is the side in `dir` known and flat?
    pub fn is_flat(&self, dir: Direction) -> bool {
        self.side(dir).is_some_and(Side::is_flat)
    }

    pub fn is_fully_specified(&self) -> bool {
        self.sides.iter().all(Option::is_some)
    }

    /// Every type consistent with the known sides.
    pub fn piece_types(&self) -> PieceTypes {
        self.piece_types
    }

    /// The single definite type of this piece.
    pub fn piece_type(&self) -> Result<PieceType> {
        self.piece_types
            .single()
            .ok_or(PuzzleError::NoDefiniteType(self.piece_types))
    }

    /// Is `piece_type` the only type this piece can be?
    pub fn is_definitely(&self, piece_type: PieceType) -> bool {
        self.piece_types.single() == Some(piece_type)
    }

    /// Could this piece be `other`? An unknown side on either piece matches
    /// anything; known sides must be equal.
    pub fn maybe_equals(&self, other: &Piece) -> bool {
        self.sides
            .iter()
            .zip(&other.sides)
            .all(|pair| match pair {
                (Some(mine), Some(theirs)) => mine == theirs,
                _ => true,
            })
    }

    /// Rotates the side slots so that the side facing `from` ends up facing `to`.
    ///
    /// `rotate(North, East)` turns the piece one quarter clockwise.
    pub fn rotate(&mut self, from: Direction, to: Direction) {
        self.sides.rotate_right(from.turns_to(to));
    }

    /// By-value form of [`Piece::rotate`].
    pub fn rotated(mut self, from: Direction, to: Direction) -> Self {
        self.rotate(from, to);
        self
    }
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.sides == other.sides
    }
}

/// Incremental construction of a [`Piece`], one side at a time.
#[derive(Debug, Clone, Default)]
pub struct PieceBuilder {
    sides: [Option<Side>; NUM_SIDES],
}

impl PieceBuilder {
    pub fn side(mut self, dir: Direction, side: Side) -> Self {
        self.sides[dir.index()] = Some(side);
        self
    }

    pub fn set_side(&mut self, dir: Direction, side: Side) {
        self.sides[dir.index()] = Some(side);
    }

    /// Fails with `InvalidArgument` if no side was set.
    pub fn build(self) -> Result<Piece> {
        Piece::new(self.sides)
    }
}
