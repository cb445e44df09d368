use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::vec::Vec;

use crate::matcher::line_runs;
use crate::*;

/// Cells that turn into boosters this pass instead of being cleared.
///
/// Never maps to `BoosterKind::None`.
pub type BoosterAssignment = BTreeMap<Pos, BoosterKind>;

/// Straight run length that yields a row or column clear.
pub const LINE_BOOSTER_RUN: usize = 4;

/// Straight run length, or cluster size, that yields a color bomb.
pub const COLOR_BOMB_SIZE: usize = 5;

/// Booster earned by a straight run on its own, and the cell it lands on.
///
/// Four in a row lands center-left (offset 1); five or more lands on offset `len / 2`.
pub fn run_booster(run: &Run) -> Option<(Pos, BoosterKind)> {
    match run.len() {
        LINE_BOOSTER_RUN => {
            let kind = match run.axis {
                Axis::Horizontal => BoosterKind::RowClear,
                Axis::Vertical => BoosterKind::ColumnClear,
            };
            Some((run.cells[1], kind))
        }
        len if len >= COLOR_BOMB_SIZE => Some((run.cells[len / 2], BoosterKind::ColorBomb)),
        _ => None,
    }
}

/// Decides which matched cells become boosters. Must run before anything in `matches` is cleared.
///
/// Horizontal runs are considered first, then vertical runs, then connected clusters; the first
/// booster given to a cell sticks.
pub fn classify(grid: &Grid, matches: &MatchSet) -> BoosterAssignment {
    let mut assignment = BoosterAssignment::new();
    let matched_color = |pos: Pos| {
        if matches.contains(&pos) {
            grid.payload(pos).match_color()
        } else {
            None
        }
    };

    for (axis, line) in grid.lines() {
        for run in line_runs(&line, axis, matched_color) {
            if let Some((pos, kind)) = run_booster(&run) {
                assign(&mut assignment, pos, kind);
            }
        }
    }

    for cluster in find_clusters(grid, matches) {
        let explained = cluster.iter().any(|pos| assignment.contains_key(pos));
        if cluster.len() >= COLOR_BOMB_SIZE && !explained {
            assign(&mut assignment, cluster[0], BoosterKind::ColorBomb);
        }
    }

    assignment
}

fn assign(assignment: &mut BoosterAssignment, pos: Pos, kind: BoosterKind) {
    let current = *assignment.entry(pos).or_insert(kind);
    if current != kind {
        log::trace!("{pos:?} keeps {current:?}, dropping {kind:?}");
    }
}

/// Groups `matches` into 4-connected same-color clusters.
///
/// Seeds are taken in ascending position order and each cluster lists its cells in breadth-first
/// visiting order, so the seed always comes first.
pub fn find_clusters(grid: &Grid, matches: &MatchSet) -> Vec<Vec<Pos>> {
    let mut visited = BTreeSet::new();
    let mut clusters = Vec::new();

    for &seed in matches {
        let Some(color) = grid.payload(seed).match_color() else {
            continue;
        };
        if !visited.insert(seed) {
            continue;
        }

        let mut cluster = Vec::new();
        let mut to_visit = VecDeque::from([seed]);
        while let Some(pos) = to_visit.pop_front() {
            cluster.push(pos);
            for next in grid.neighbors(pos) {
                let same_color = grid.payload(next).match_color() == Some(color);
                if same_color && matches.contains(&next) && visited.insert(next) {
                    to_visit.push_back(next);
                }
            }
        }
        clusters.push(cluster);
    }

    clusters
}
