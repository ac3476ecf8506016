//! Exponential search for the edges of a run of equal elements.
//!
//! A binary search over a sorted slice with duplicate keys lands on *some*
//! element of the run of equal keys. Walking outwards one element at a time
//! costs O(k) for a run of length k. Probing at doubling distances instead
//! (1, 2, 4, ...) and restarting at distance 1 from the last confirmed match
//! whenever a probe misses converges on the edge in O(log k) probes.

use std::cmp::Ordering;
use std::ops::RangeInclusive;

use crate::error::{PuzzleError, Result};

/// Which end of the run to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Towards {
    /// The first element of the run.
    Start,
    /// The last element of the run.
    End,
}

/// Returns the index of the outermost element, in direction `towards`, of the
/// run of elements that `compare` as equal to `items[index]`.
///
/// `items` must be sorted consistently with `compare`. Fails with
/// `IndexOutOfBounds` if `index` is not a valid position.
pub fn run_boundary<T, F>(
    items: &[T],
    index: usize,
    towards: Towards,
    mut compare: F,
) -> Result<usize>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if index >= items.len() {
        return Err(PuzzleError::IndexOutOfBounds {
            index,
            len: items.len(),
        });
    }

    let mut anchor = index;
    let mut exponent = 0u32;
    loop {
        let step = 1usize << exponent;
        let probe = match towards {
            Towards::Start => anchor.checked_sub(step),
            Towards::End => anchor.checked_add(step).filter(|&next| next < items.len()),
        };

        match probe {
            Some(next) if compare(&items[anchor], &items[next]) == Ordering::Equal => {
                anchor = next;
                exponent += 1;
            }
            // a miss on a single step means anchor is the edge
            _ if exponent == 0 => return Ok(anchor),
            _ => exponent = 0,
        }
    }
}

/// Both ends of the run containing `index`.
pub fn run_bounds<T, F>(
    items: &[T],
    index: usize,
    mut compare: F,
) -> Result<RangeInclusive<usize>>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let start = run_boundary(items, index, Towards::Start, &mut compare)?;
    let end = run_boundary(items, index, Towards::End, &mut compare)?;
    Ok(start..=end)
}
