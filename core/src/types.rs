use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board size, rows and columns.
pub type Coord = u8;

/// Count type used for cell counts over the whole board.
pub type CellCount = u16;

/// Board position `(row, col)`, row 0 is the top row.
pub type Pos = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Pos {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

pub const fn manhattan((r1, c1): Pos, (r2, c2): Pos) -> CellCount {
    (r1.abs_diff(r2) as CellCount) + (c1.abs_diff(c2) as CellCount)
}

/// Two positions are adjacent when they share an edge.
pub const fn are_adjacent(a: Pos, b: Pos) -> bool {
    manhattan(a, b) == 1
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Up, down, left, right.
const DISPLACEMENTS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Applies `delta` to `pos`, returning a value only when it remains inside a `size`×`size` board.
fn apply_delta(pos: Pos, delta: (isize, isize), size: Coord) -> Option<Pos> {
    let (row, col) = pos;
    let (dr, dc) = delta;

    let next_row = row.checked_add_signed(dr.try_into().ok()?)?;
    if next_row >= size {
        return None;
    }

    let next_col = col.checked_add_signed(dc.try_into().ok()?)?;
    if next_col >= size {
        return None;
    }

    Some((next_row, next_col))
}

/// Orthogonal neighbors of a cell, in up/down/left/right order.
#[derive(Debug)]
pub struct NeighborIter {
    center: Pos,
    size: Coord,
    index: u8,
}

impl NeighborIter {
    pub(crate) fn new(center: Pos, size: Coord) -> Self {
        Self {
            center,
            size,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item = apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.size);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn adjacency_requires_manhattan_distance_one() {
        assert!(are_adjacent((3, 3), (3, 4)));
        assert!(are_adjacent((3, 3), (2, 3)));
        assert!(!are_adjacent((3, 3), (3, 3)));
        assert!(!are_adjacent((3, 3), (4, 4)));
        assert!(!are_adjacent((0, 0), (0, 2)));
    }

    #[test]
    fn corner_has_two_neighbors() {
        let neighbors: Vec<_> = NeighborIter::new((0, 0), 5).collect();
        assert_eq!(neighbors, [(1, 0), (0, 1)]);

        let neighbors: Vec<_> = NeighborIter::new((4, 4), 5).collect();
        assert_eq!(neighbors, [(3, 4), (4, 3)]);
    }

    #[test]
    fn interior_has_four_neighbors_in_fixed_order() {
        let neighbors: Vec<_> = NeighborIter::new((2, 2), 5).collect();
        assert_eq!(neighbors, [(1, 2), (3, 2), (2, 1), (2, 3)]);
    }
}
