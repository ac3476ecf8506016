//! Points and side curves.
//!
//! A side is expressed in its own local frame: the x-axis runs between the two
//! endpoints of the side and +y points away from the centre of the piece. Two
//! pieces share an edge when one side is the [`Side::inverse`] of the other.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{PuzzleError, Result};

/// Nominal length of every generated side, in local units.
pub const SIDE_LENGTH: f64 = 100.0;

/// An immutable 2D point.
///
/// Points order by `y` first, then by `x`. Equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.y.partial_cmp(&other.y)? {
            Ordering::Equal => self.x.partial_cmp(&other.x),
            ordering => Some(ordering),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Coarse shape of a side.
///
/// The declaration order is the primary key of [`Side::fit_cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SideType {
    Flat,
    /// The side bends into the piece.
    In,
    /// The side bulges out of the piece.
    Out,
}

/// One edge curve of a piece, as a polyline of at least two points.
///
/// The side type and corner distance are derived once at construction; the
/// points never change afterwards.
#[derive(Debug, Clone)]
pub struct Side {
    points: Vec<Point>,
    side_type: SideType,
    corner_distance: f64,
}

impl Side {
    /// Creates a side from its points, ordered along the edge.
    ///
    /// The first and last points are taken to be the endpoints; this is not
    /// re-validated.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < 2 {
            return Err(PuzzleError::InvalidArgument(format!(
                "a side needs at least 2 points, {} found",
                points.len()
            )));
        }

        let side_type = classify(&points);
        let corner_distance = (points[points.len() - 1].x - points[0].x).abs();

        Ok(Self {
            points,
            side_type,
            corner_distance,
        })
    }

    /// A straight side of the given length.
    pub fn flat(length: f64) -> Self {
        Self {
            points: vec![Point::new(0.0, 0.0), Point::new(length, 0.0)],
            side_type: SideType::Flat,
            corner_distance: length.abs(),
        }
    }

    /// The canonical side along the outer border of a puzzle.
    pub fn border() -> Self {
        Self::flat(SIDE_LENGTH)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn side_type(&self) -> SideType {
        self.side_type
    }

    /// Straight-line span between the two endpoints.
    pub fn corner_distance(&self) -> f64 {
        self.corner_distance
    }

    pub fn is_flat(&self) -> bool {
        self.side_type == SideType::Flat
    }

    /// The same side as seen from the adjoining piece: x is kept, y is negated.
    pub fn inverse(&self) -> Self {
        let points: Vec<Point> = self
            .points
            .iter()
            .map(|point| Point::new(point.x, -point.y))
            .collect();

        Self {
            side_type: classify(&points),
            corner_distance: self.corner_distance,
            points,
        }
    }

    /// Orders sides by type, then corner distance, then point count.
    ///
    /// This is coarser than `==`: two sides with different points can compare
    /// `Equal`, which is what produces runs in a sorted piece index.
    pub fn fit_cmp(&self, other: &Self) -> Ordering {
        self.side_type
            .cmp(&other.side_type)
            .then_with(|| self.corner_distance.total_cmp(&other.corner_distance))
            .then_with(|| self.points.len().cmp(&other.points.len()))
    }
}

impl PartialEq for Side {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

/// Classifies a side by comparing its mean height with the endpoint baseline.
///
/// Every point, endpoints included, contributes to the mean. An asymmetric
/// curve can therefore average out to `Flat`.
fn classify(points: &[Point]) -> SideType {
    if points.len() == 2 {
        return SideType::Flat;
    }

    let average_height = points.iter().map(|point| point.y).sum::<f64>() / points.len() as f64;
    let baseline = (points[0].y + points[points.len() - 1].y) / 2.0;

    if average_height > baseline {
        SideType::Out
    } else if average_height == baseline {
        SideType::Flat
    } else {
        SideType::In
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump() -> Side {
        Side::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 1.0),
            Point::new(10.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_side_requires_two_points() {
        assert!(matches!(
            Side::new(vec![Point::new(0.0, 0.0)]),
            Err(PuzzleError::InvalidArgument(_))
        ));
        assert!(matches!(
            Side::new(Vec::new()),
            Err(PuzzleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_corner_distance() {
        assert_eq!(bump().corner_distance(), 10.0);
        let straight = Side::new(vec![Point::new(0.0, 0.0), Point::new(8.1, 0.0)]).unwrap();
        assert!((straight.corner_distance() - 8.1).abs() < 1e-9);
    }

    #[test]
    fn test_side_type_classification() {
        assert_eq!(bump().side_type(), SideType::Out);
        assert_eq!(bump().inverse().side_type(), SideType::In);
        assert_eq!(Side::border().side_type(), SideType::Flat);

        let level = Side::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(10.0, 0.0),
        ])
        .unwrap();
        assert_eq!(level.side_type(), SideType::Flat);
    }

    #[test]
    fn test_asymmetric_curve_averages_to_flat() {
        // visibly wavy, but the heights cancel out
        let wave = Side::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 2.0),
            Point::new(6.0, -2.0),
            Point::new(10.0, 0.0),
        ])
        .unwrap();
        assert_eq!(wave.side_type(), SideType::Flat);
    }

    #[test]
    fn test_inverse_is_an_involution() {
        let side = bump();
        assert_eq!(side.inverse().inverse(), side);
        assert_ne!(side.inverse(), side);
        assert_eq!(side.inverse().corner_distance(), side.corner_distance());
    }

    #[test]
    fn test_fit_order() {
        let out = bump();
        let same = bump();
        let short = Side::new(vec![Point::new(0.0, 0.0), Point::new(8.1, 0.0)]).unwrap();

        assert_eq!(out.fit_cmp(&out), Ordering::Equal);
        assert_eq!(out.fit_cmp(&same), Ordering::Equal);
        assert_ne!(out.fit_cmp(&short), Ordering::Equal);
        assert_eq!(short.fit_cmp(&out), out.fit_cmp(&short).reverse());

        // Flat < In < Out regardless of distance
        let inward = out.inverse();
        assert_eq!(short.fit_cmp(&inward), Ordering::Less);
        assert_eq!(inward.fit_cmp(&out), Ordering::Less);
        assert_eq!(short.fit_cmp(&out), Ordering::Less);

        // fit-equal sides need not be the same side
        let other_bump = Side::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 3.0),
            Point::new(10.0, 0.0),
        ])
        .unwrap();
        assert_eq!(out.fit_cmp(&other_bump), Ordering::Equal);
        assert_ne!(out, other_bump);
    }

    #[test]
    fn test_fit_order_breaks_ties_by_point_count() {
        let three = bump();
        let four = Side::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 1.0),
            Point::new(6.0, 1.0),
            Point::new(10.0, 0.0),
        ])
        .unwrap();
        assert_eq!(three.fit_cmp(&four), Ordering::Less);
        assert_eq!(four.fit_cmp(&three), Ordering::Greater);
    }

    #[test]
    fn test_point_order_is_y_then_x() {
        assert!(Point::new(5.0, 0.0) < Point::new(0.0, 1.0));
        assert!(Point::new(0.0, 1.0) < Point::new(1.0, 1.0));
        assert_eq!(
            Point::new(2.0, 2.0).partial_cmp(&Point::new(2.0, 2.0)),
            Some(Ordering::Equal)
        );
    }
}
