//! The set of unplaced pieces, sorted four ways.
//!
//! Pieces live in one arena keyed by [`PieceId`]. For every direction the index
//! keeps a vector of ids sorted by the fit order of the piece's side in that
//! direction, with the id as the final tiebreak. All four orderings always
//! hold the same ids.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{PuzzleError, Result};
use crate::geometry::Side;
use crate::pieces::{Direction, Piece, PieceTypes, NUM_SIDES};
use crate::search::run_bounds;

/// Stable identity of a piece inside a [`PieceIndex`] and its sublists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(usize);

impl PieceId {
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Orders optional sides: unknown sides sort before every known side.
fn cmp_sides(a: Option<&Side>, b: Option<&Side>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.fit_cmp(b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

#[derive(Debug, Clone, Default)]
pub struct PieceIndex {
    pieces: FxHashMap<PieceId, Piece>,
    orderings: [Vec<PieceId>; NUM_SIDES],
    next_id: usize,
}

impl PieceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pieces: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            orderings: std::array::from_fn(|_| Vec::with_capacity(capacity)),
            next_id: 0,
        }
    }

    /// Builds an index holding every piece of `pieces`, in iteration order.
    pub fn from_pieces<I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = Piece>,
    {
        let pieces = pieces.into_iter();
        let mut index = Self::with_capacity(pieces.size_hint().0);
        for piece in pieces {
            index.add(piece);
        }
        index
    }

    /// Inserts `piece` into all four orderings and returns its new id.
    pub fn add(&mut self, piece: Piece) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id += 1;

        let pieces = &self.pieces;
        for dir in Direction::ALL {
            let side = piece.side(dir);
            let ordering = &mut self.orderings[dir.index()];
            let position = ordering
                .binary_search_by(|&probe| {
                    cmp_sides(pieces[&probe].side(dir), side).then(probe.cmp(&id))
                })
                .unwrap_or_else(|position| position);
            ordering.insert(position, id);
        }

        self.pieces.insert(id, piece);
        id
    }

    /// Removes the piece with `id` from every ordering and hands it back.
    ///
    /// Removing an absent id does nothing.
    pub fn remove(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.remove(&id)?;

        let pieces = &self.pieces;
        for dir in Direction::ALL {
            let side = piece.side(dir);
            let ordering = &mut self.orderings[dir.index()];
            let found = ordering.binary_search_by(|&probe| {
                if probe == id {
                    Ordering::Equal
                } else {
                    cmp_sides(pieces[&probe].side(dir), side).then(probe.cmp(&id))
                }
            });
            if let Ok(position) = found {
                ordering.remove(position);
            }
        }

        Some(piece)
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
        for ordering in &mut self.orderings {
            ordering.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.pieces.contains_key(&id)
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// Ids in the order of their `dir` sides.
    pub fn ids(&self, dir: Direction) -> &[PieceId] {
        &self.orderings[dir.index()]
    }

    /// Pieces in the order of their `dir` sides.
    pub fn iter(&self, dir: Direction) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.orderings[dir.index()]
            .iter()
            .map(move |id| (*id, &self.pieces[id]))
    }

    /// The id at position `i` of the `dir` ordering.
    pub fn id_at(&self, dir: Direction, i: usize) -> Result<PieceId> {
        let ordering = &self.orderings[dir.index()];
        ordering
            .get(i)
            .copied()
            .ok_or(PuzzleError::IndexOutOfBounds {
                index: i,
                len: ordering.len(),
            })
    }

    /// The piece at position `i` of the `dir` ordering.
    pub fn get(&self, dir: Direction, i: usize) -> Result<&Piece> {
        self.id_at(dir, i).map(|id| &self.pieces[&id])
    }

    pub fn first(&self, dir: Direction) -> Result<&Piece> {
        self.get(dir, 0)
    }

    /// Looks for `side` among the `dir` sides of the pieces matching `filter`.
    ///
    /// Positions refer to the `dir` ordering restricted to `filter`. `Ok` holds
    /// the position of some fit-equal side; `Err` holds the position where such
    /// a side would be inserted.
    pub fn binary_search(
        &self,
        dir: Direction,
        side: &Side,
        filter: Option<PieceTypes>,
    ) -> std::result::Result<usize, usize> {
        self.view(dir, filter)
            .binary_search_by(|id| cmp_sides(self.pieces[id].side(dir), Some(side)))
    }

    /// Finds a piece matching `filter` whose `dir` side is exactly `side`.
    pub fn search(
        &self,
        dir: Direction,
        side: &Side,
        filter: Option<PieceTypes>,
    ) -> Option<PieceId> {
        let view = self.view(dir, filter);
        let hit = view
            .binary_search_by(|id| cmp_sides(self.pieces[id].side(dir), Some(side)))
            .ok()?;
        let run = run_bounds(&*view, hit, |a, b| self.cmp_in(dir, *a, *b)).ok()?;

        view[run]
            .iter()
            .copied()
            .find(|id| self.pieces[id].side(dir) == Some(side))
    }

    /// Finds a piece that [`Piece::maybe_equals`] `query`.
    ///
    /// The search runs over the ordering of the query's most selective known
    /// side (a shaped side if there is one) and only inspects the run of pieces
    /// whose side there is fit-equal. Ties go to the lowest id.
    pub fn find(&self, query: &Piece) -> Option<PieceId> {
        let dir = Direction::ALL
            .into_iter()
            .filter(|&dir| !query.is_side_unknown(dir))
            .max_by_key(|&dir| !query.is_flat(dir))?;
        let side = query.side(dir)?;

        let ordering = &self.orderings[dir.index()];
        let hit = ordering
            .binary_search_by(|id| cmp_sides(self.pieces[id].side(dir), Some(side)))
            .ok()?;
        let run = run_bounds(ordering, hit, |a, b| self.cmp_in(dir, *a, *b)).ok()?;
        trace!(%dir, run_start = *run.start(), run_end = *run.end(), "scanning run");

        ordering[run]
            .iter()
            .copied()
            .find(|id| self.pieces[id].maybe_equals(query))
    }

    /// Does any piece have `side` in any direction?
    pub fn contains_side(&self, side: &Side) -> bool {
        Direction::ALL
            .into_iter()
            .any(|dir| self.search(dir, side, None).is_some())
    }

    /// A new index with only the pieces whose candidate types meet `filter`.
    ///
    /// The matching pieces are cloned into the sublist; only the ids are
    /// shared, so a piece found in the sublist can be removed from this index
    /// by the same id. Changes to either index do not show in the other.
    pub fn sublist(&self, filter: PieceTypes) -> PieceIndex {
        let pieces: FxHashMap<PieceId, Piece> = self
            .pieces
            .iter()
            .filter(|(_, piece)| piece.piece_types().intersects(filter))
            .map(|(id, piece)| (*id, piece.clone()))
            .collect();
        let orderings = std::array::from_fn(|dir| {
            self.orderings[dir]
                .iter()
                .copied()
                .filter(|id| pieces.contains_key(id))
                .collect()
        });

        PieceIndex {
            pieces,
            orderings,
            next_id: self.next_id,
        }
    }

    fn cmp_in(&self, dir: Direction, a: PieceId, b: PieceId) -> Ordering {
        cmp_sides(self.pieces[&a].side(dir), self.pieces[&b].side(dir))
    }

    fn view(&self, dir: Direction, filter: Option<PieceTypes>) -> Cow<'_, [PieceId]> {
        let ordering = &self.orderings[dir.index()];
        match filter {
            None => Cow::Borrowed(ordering.as_slice()),
            Some(types) => Cow::Owned(
                ordering
                    .iter()
                    .copied()
                    .filter(|id| self.pieces[id].piece_types().intersects(types))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::geometry::Point;
    use crate::pieces::PieceType;

    fn tab(height: f64) -> Side {
        Side::new(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, height),
            Point::new(100.0, 0.0),
        ])
        .unwrap()
    }

    fn assert_consistent(index: &PieceIndex) {
        let mut reference: Vec<PieceId> = index.ids(Direction::North).to_vec();
        reference.sort_unstable();
        for dir in Direction::ALL {
            let ids = index.ids(dir);
            assert_eq!(ids.len(), index.len(), "{dir} ordering has the wrong length");
            for pair in ids.windows(2) {
                let ordering = cmp_sides(
                    index.piece(pair[0]).unwrap().side(dir),
                    index.piece(pair[1]).unwrap().side(dir),
                )
                .then(pair[0].cmp(&pair[1]));
                assert_eq!(ordering, Ordering::Less, "{dir} ordering is not sorted");
            }
            let mut sorted = ids.to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, reference, "{dir} ordering holds different pieces");
        }
    }

    fn sample_pieces() -> Vec<Piece> {
        Generator::with_seed(7).generate(4, 3).unwrap()
    }

    #[test]
    fn test_add_keeps_orderings_sorted() {
        let index = PieceIndex::from_pieces(sample_pieces());
        assert_eq!(index.len(), 12);
        assert_consistent(&index);
    }

    #[test]
    fn test_interleaved_add_remove_restores_membership() {
        let mut pieces = sample_pieces().into_iter();
        let mut index = PieceIndex::new();
        let mut kept = Vec::new();

        for (step, piece) in pieces.by_ref().take(8).enumerate() {
            let id = index.add(piece);
            if step % 3 == 0 {
                kept.push(id);
            }
        }
        let before: Vec<Vec<PieceId>> = Direction::ALL
            .iter()
            .map(|&dir| index.ids(dir).to_vec())
            .collect();

        for piece in pieces {
            let id = index.add(piece);
            assert_consistent(&index);
            let removed = index.remove(id);
            assert!(removed.is_some());
            assert!(!index.contains(id));
        }

        let after: Vec<Vec<PieceId>> = Direction::ALL
            .iter()
            .map(|&dir| index.ids(dir).to_vec())
            .collect();
        assert_eq!(before, after);
        assert_eq!(index.len(), 8);
        assert!(kept.iter().all(|&id| index.contains(id)));
        assert_consistent(&index);
    }

    #[test]
    fn test_remove_absent_is_a_no_op() {
        let mut index = PieceIndex::from_pieces(sample_pieces());
        let id = index.id_at(Direction::East, 3).unwrap();
        assert!(index.remove(id).is_some());
        assert!(index.remove(id).is_none());
        assert_eq!(index.len(), 11);
        assert_consistent(&index);
    }

    #[test]
    fn test_positions_out_of_bounds() {
        let index = PieceIndex::from_pieces(sample_pieces());
        assert!(index.get(Direction::South, 11).is_ok());
        assert_eq!(
            index.get(Direction::South, 12).err(),
            Some(PuzzleError::IndexOutOfBounds { index: 12, len: 12 })
        );
        assert!(PieceIndex::new().first(Direction::North).is_err());
    }

    #[test]
    fn test_flat_sides_sort_first() {
        let index = PieceIndex::from_pieces(sample_pieces());
        // 4 pieces in the top row of a 4x3 puzzle have a flat north side
        let flat_north = index
            .iter(Direction::North)
            .take_while(|(_, piece)| piece.is_flat(Direction::North))
            .count();
        assert_eq!(flat_north, 4);
        assert!(index.first(Direction::North).unwrap().is_flat(Direction::North));
    }

    #[test]
    fn test_search_picks_exact_side_from_run() {
        let pieces = vec![
            Piece::from_sides(tab(1.0), tab(2.0), tab(3.0), tab(4.0)),
            Piece::from_sides(tab(5.0), tab(6.0), tab(7.0), tab(8.0)),
            Piece::from_sides(tab(9.0), tab(10.0), tab(11.0), tab(12.0)),
        ];
        let index = PieceIndex::from_pieces(pieces);

        // every north side is fit-equal, so the binary search hits the run
        assert!(index.binary_search(Direction::North, &tab(42.0), None).is_ok());
        assert_eq!(index.search(Direction::North, &tab(42.0), None), None);

        let id = index.search(Direction::North, &tab(5.0), None).unwrap();
        assert_eq!(index.piece(id).unwrap().side(Direction::North), Some(&tab(5.0)));
        assert_eq!(
            index.search(Direction::West, &tab(12.0), None).map(PieceId::get),
            Some(2)
        );
    }

    #[test]
    fn test_binary_search_reports_insertion_point() {
        let pieces = vec![Piece::from_sides(tab(1.0), tab(2.0), tab(3.0), tab(4.0))];
        let index = PieceIndex::from_pieces(pieces);

        // Flat < Out
        assert_eq!(
            index.binary_search(Direction::North, &Side::border(), None),
            Err(0)
        );
        // In < Out
        assert_eq!(
            index.binary_search(Direction::North, &tab(1.0).inverse(), None),
            Err(0)
        );
        assert_eq!(index.binary_search(Direction::North, &tab(-1.0), None), Err(0));
        assert_eq!(index.binary_search(Direction::North, &tab(9.0), None), Ok(0));
    }

    #[test]
    fn test_type_filter_restricts_search() {
        let index = PieceIndex::from_pieces(sample_pieces());
        let (_, corner) = index
            .iter(Direction::North)
            .find(|(_, piece)| piece.is_definitely(PieceType::Corner))
            .unwrap();
        let side = corner.side(Direction::South).unwrap().clone();

        assert!(index
            .search(Direction::South, &side, Some(PieceTypes::only(PieceType::Corner)))
            .is_some());
        assert!(index
            .search(Direction::South, &side, Some(PieceTypes::only(PieceType::Middle)))
            .is_none());
        assert!(index.contains_side(&side));
        assert!(!index.contains_side(&tab(123.0)));
    }

    #[test]
    fn test_find_matches_partial_query() {
        let pieces = sample_pieces();
        let target = pieces
            .iter()
            .find(|piece| !piece.is_flat(Direction::East))
            .unwrap()
            .clone();
        let index = PieceIndex::from_pieces(pieces);

        let query = Piece::builder()
            .side(Direction::East, target.side(Direction::East).unwrap().clone())
            .build()
            .unwrap();
        let id = index.find(&query).unwrap();
        assert_eq!(index.piece(id), Some(&target));

        let unknown = Piece::builder()
            .side(Direction::East, tab(77.0))
            .build()
            .unwrap();
        assert_eq!(index.find(&unknown), None);
    }

    #[test]
    fn test_sublist_partitions_by_type() {
        let index = PieceIndex::from_pieces(sample_pieces());
        let border = index.sublist(PieceTypes::BORDER);
        let middle = index.sublist(PieceTypes::only(PieceType::Middle));

        // a 4x3 puzzle has 10 border pieces and 2 middle pieces
        assert_eq!(border.len(), 10);
        assert_eq!(middle.len(), 2);
        assert_consistent(&border);
        assert_consistent(&middle);

        for dir in Direction::ALL {
            for id in border.ids(dir) {
                assert!(!middle.contains(*id));
                assert_eq!(border.piece(*id), index.piece(*id));
            }
        }
        assert_eq!(index.len(), 12);
    }

    #[test]
    fn test_sublist_is_independent_of_its_parent() {
        let mut index = PieceIndex::from_pieces(sample_pieces());
        let mut border = index.sublist(PieceTypes::BORDER);
        let id = border.ids(Direction::North)[0];

        let removed = border.remove(id).unwrap();
        assert!(index.contains(id), "removing from the sublist touched the parent");
        assert_eq!(index.piece(id), Some(&removed));

        // the shared id still addresses the same piece in the parent
        assert_eq!(index.remove(id), Some(removed));
        assert_eq!(border.len(), 9);
        assert_eq!(index.len(), 11);
        assert_consistent(&border);
        assert_consistent(&index);
    }
}
