use alloc::vec::Vec;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CascadeState {
    Idle,
    Resolving,
    Clearing,
    Settling,
    Rechecking,
}

impl CascadeState {
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl Default for CascadeState {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaKind {
    Swap,
    Clear,
    BoosterAssign,
    BoosterSpawn,
    /// The payload now at `pos` fell from `from`, which is left empty.
    Drop { from: Pos },
    Refill,
}

/// One cell-level change, in the order it was committed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDelta {
    pub pos: Pos,
    pub old: Payload,
    pub new: Payload,
    pub kind: DeltaKind,
}

impl CellDelta {
    pub const fn new(pos: Pos, old: Payload, new: Payload, kind: DeltaKind) -> Self {
        Self {
            pos,
            old,
            new,
            kind,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassKind {
    /// The player's swap, committed before the first match pass.
    Swap,
    /// A booster popped directly.
    Activation,
    /// A swap involving at least one booster.
    Combo,
    /// A regular clear/settle pass driven by matches on the board.
    Match,
}

/// Everything committed by one pass, for an observer to replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadePass {
    pub kind: PassKind,
    pub score: Score,
    pub boosters: Vec<(Pos, BoosterKind)>,
    pub deltas: Vec<CellDelta>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub passes: Vec<CascadePass>,
    pub score: Score,
    /// Set when the pass limit stopped the loop while matches were still on the board.
    pub capped: bool,
}

/// Drives clear → settle → recheck passes until the board has no match left.
#[derive(Debug)]
pub struct CascadeResolver<'a> {
    grid: &'a mut Grid,
    rng: &'a mut SmallRng,
    state: CascadeState,
    pass_limit: Option<u16>,
    passes_run: u16,
}

impl<'a> CascadeResolver<'a> {
    pub fn new(grid: &'a mut Grid, rng: &'a mut SmallRng) -> Self {
        Self {
            grid,
            rng,
            state: CascadeState::Idle,
            pass_limit: None,
            passes_run: 0,
        }
    }

    pub fn with_pass_limit(mut self, pass_limit: Option<u16>) -> Self {
        self.pass_limit = pass_limit;
        self
    }

    pub fn state(&self) -> CascadeState {
        self.state
    }

    pub fn passes_run(&self) -> u16 {
        self.passes_run
    }

    /// Runs a single pass. Returns `None`, and goes back to idle, once nothing matches.
    pub fn run_pass(&mut self) -> Option<CascadePass> {
        if self.state.is_idle() {
            self.transition(CascadeState::Resolving);
        }

        let matches = find_matches(self.grid);
        if matches.is_empty() {
            self.transition(CascadeState::Idle);
            return None;
        }

        if self.limit_reached() {
            log::warn!(
                "Cascade stopped after {} passes with {} tiles still matched",
                self.passes_run,
                matches.len()
            );
            self.transition(CascadeState::Idle);
            return None;
        }

        let boosters = classify(self.grid, &matches);

        self.transition(CascadeState::Clearing);
        let mut deltas = Vec::new();
        let score = clear_matches(self.grid, &matches, &boosters, &mut deltas);

        self.transition(CascadeState::Settling);
        settle(self.grid, self.rng, &mut deltas);

        self.transition(CascadeState::Rechecking);
        self.passes_run = self.passes_run.saturating_add(1);
        log::trace!(
            "Pass {} cleared {} tiles, {} boosters, +{score}",
            self.passes_run,
            matches.len() - boosters.len(),
            boosters.len()
        );

        Some(CascadePass {
            kind: PassKind::Match,
            score,
            boosters: boosters.into_iter().collect(),
            deltas,
        })
    }

    /// Runs passes until the board is stable.
    pub fn run(&mut self) -> CascadeReport {
        let mut report = CascadeReport::default();
        while let Some(pass) = self.run_pass() {
            report.score = report.score.saturating_add(pass.score);
            report.passes.push(pass);
        }
        report.capped = self.limit_reached() && !find_matches(self.grid).is_empty();
        report
    }

    fn limit_reached(&self) -> bool {
        self.pass_limit
            .is_some_and(|limit| self.passes_run >= limit)
    }

    fn transition(&mut self, next: CascadeState) {
        log::trace!("Cascade {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Clears every matched cell that is not becoming a booster, then stamps the boosters in place.
///
/// Returns the points earned for the cleared cells.
pub fn clear_matches(
    grid: &mut Grid,
    matches: &MatchSet,
    boosters: &BoosterAssignment,
    deltas: &mut Vec<CellDelta>,
) -> Score {
    let mut cleared = 0;
    for &pos in matches {
        if boosters.contains_key(&pos) {
            continue;
        }
        let old = grid.clear(pos);
        deltas.push(CellDelta::new(pos, old, Payload::EMPTY, DeltaKind::Clear));
        cleared += 1;
    }

    for (&pos, &kind) in boosters {
        let new = Payload::booster(kind);
        let old = grid.set_payload(pos, new);
        deltas.push(CellDelta::new(pos, old, new, DeltaKind::BoosterAssign));
    }

    clear_points(cleared)
}

/// Gravity: moves every column's payloads down over empty cells, keeping their order.
pub fn compact(grid: &mut Grid, deltas: &mut Vec<CellDelta>) {
    let size = grid.size();
    for col in 0..size {
        let before: Vec<Payload> = grid
            .column_positions(col)
            .map(|pos| grid.payload(pos))
            .collect();

        let mut write = size;
        for row in (0..size).rev() {
            let payload = before[usize::from(row)];
            if payload.is_empty() {
                continue;
            }
            write -= 1;
            if write != row {
                grid.clear((row, col));
                let old = grid.set_payload((write, col), payload);
                deltas.push(CellDelta::new(
                    (write, col),
                    old,
                    payload,
                    DeltaKind::Drop { from: (row, col) },
                ));
            }
        }
    }
}

/// Fills every empty cell with a fresh ordinary tile. Returns how many cells were filled.
pub fn refill(grid: &mut Grid, rng: &mut SmallRng, deltas: &mut Vec<CellDelta>) -> usize {
    let mut filled = 0;
    for pos in grid.positions() {
        if !grid[pos].is_empty() {
            continue;
        }
        let new = Payload::gem(random_color(rng));
        let old = grid.set_payload(pos, new);
        deltas.push(CellDelta::new(pos, old, new, DeltaKind::Refill));
        filled += 1;
    }
    filled
}

/// Compaction followed by refill; leaves no empty cell behind.
pub fn settle(grid: &mut Grid, rng: &mut SmallRng, deltas: &mut Vec<CellDelta>) {
    compact(grid, deltas);
    let filled = refill(grid, rng, deltas);
    log::trace!("Settled, refilled {filled} cells");
}
