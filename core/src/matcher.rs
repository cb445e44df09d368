use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Minimum straight run length that counts as a match.
pub const MIN_RUN: usize = 3;

/// Positions matched during one pass. Ordered so that every consumer walks it deterministically.
pub type MatchSet = BTreeSet<Pos>;

/// Maximal straight sequence of same-colored cells along one row or column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub axis: Axis,
    pub color: Color,
    pub cells: SmallVec<[Pos; 8]>,
}

impl Run {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn start(&self) -> Pos {
        self.cells[0]
    }
}

/// Splits `line` into maximal runs of equal keys, skipping cells whose key is `None`.
pub(crate) fn line_runs(
    line: &[Pos],
    axis: Axis,
    mut key: impl FnMut(Pos) -> Option<Color>,
) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current: Option<Run> = None;

    for &pos in line {
        let color = key(pos);
        if let (Some(run), Some(color)) = (current.as_mut(), color) {
            if run.color == color {
                run.cells.push(pos);
                continue;
            }
        }
        runs.extend(current.take());
        current = color.map(|color| Run {
            axis,
            color,
            cells: SmallVec::from_elem(pos, 1),
        });
    }
    runs.extend(current);

    runs
}

/// Every straight run of at least [`MIN_RUN`] ordinary tiles, rows first then columns.
pub fn find_runs(grid: &Grid) -> Vec<Run> {
    grid.lines()
        .flat_map(|(axis, line)| line_runs(&line, axis, |pos| grid.payload(pos).match_color()))
        .filter(|run| run.len() >= MIN_RUN)
        .collect()
}

/// All tiles that currently belong to a horizontal or vertical run of three or more.
///
/// Boostered cells and empty cells never take part in a run.
pub fn find_matches(grid: &Grid) -> MatchSet {
    find_runs(grid)
        .into_iter()
        .flat_map(|run| run.cells)
        .collect()
}

/// Checks only the row and column through `(row, col)`.
pub fn is_match_at(grid: &Grid, row: Coord, col: Coord) -> bool {
    let Some(color) = grid.get(row, col).payload().match_color() else {
        return false;
    };
    let same = |pos: Pos| grid.payload(pos).match_color() == Some(color);

    let left = (0..col).rev().take_while(|&c| same((row, c))).count();
    let right = (col + 1..grid.size())
        .take_while(|&c| same((row, c)))
        .count();
    if left + right + 1 >= MIN_RUN {
        return true;
    }

    let up = (0..row).rev().take_while(|&r| same((r, col))).count();
    let down = (row + 1..grid.size())
        .take_while(|&r| same((r, col)))
        .count();
    up + down + 1 >= MIN_RUN
}
