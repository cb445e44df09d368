use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Result of popping a booster or resolving a combo, before the board settles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    /// Cells removed by the effect, in ascending order. Score is counted over these.
    pub affected: Vec<Pos>,
    /// Boosters placed on the board by the effect.
    pub spawned: Vec<(Pos, BoosterKind)>,
    pub score: Score,
    pub deltas: Vec<CellDelta>,
}

impl Activation {
    fn push_clear(&mut self, grid: &mut Grid, pos: Pos) {
        let old = grid.clear(pos);
        if !old.is_empty() {
            self.deltas
                .push(CellDelta::new(pos, old, Payload::EMPTY, DeltaKind::Clear));
        }
    }

    fn clear_all(grid: &mut Grid, cells: BTreeSet<Pos>) -> Self {
        let mut activation = Self::default();
        for &pos in &cells {
            activation.push_clear(grid, pos);
        }
        activation.score = clear_points(cells.len());
        activation.affected = cells.into_iter().collect();
        activation
    }
}

/// Color a color bomb sweeps when it is popped without a partner: the color of the first non-empty
/// tile in row-major order. That can be [`Color::Neutral`], which takes out every booster on the
/// board.
pub fn default_bomb_target(grid: &Grid) -> Option<Color> {
    grid.iter().find_map(Tile::color)
}

fn cells_of_color(grid: &Grid, color: Color) -> BTreeSet<Pos> {
    grid.positions()
        .filter(|&pos| grid[pos].color() == Some(color))
        .collect()
}

/// Pops the booster at `pos` and clears its area of effect.
///
/// The booster's own cell is emptied first so the effect cannot trigger it again. Boosters caught
/// in the area are removed without firing. The caller settles the board afterwards.
pub fn activate(grid: &mut Grid, pos: Pos, target: Option<Color>) -> Activation {
    let booster = grid[pos].booster();
    if !booster.is_booster() {
        return Activation::default();
    }

    let popped = grid.clear(pos);
    let mut cells = match booster {
        BoosterKind::RowClear => grid.row_positions(pos.0).collect(),
        BoosterKind::ColumnClear => grid.column_positions(pos.1).collect(),
        BoosterKind::ColorBomb => target
            .or_else(|| default_bomb_target(grid))
            .map(|color| cells_of_color(grid, color))
            .unwrap_or_default(),
        BoosterKind::None => BTreeSet::new(),
    };
    cells.insert(pos);
    log::trace!("{booster:?} at {pos:?} hits {} cells", cells.len());

    let mut activation = Activation::clear_all(grid, cells);
    activation
        .deltas
        .insert(0, CellDelta::new(pos, popped, Payload::EMPTY, DeltaKind::Clear));
    activation
}

/// Special resolution for a swap that involves at least one booster.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combo {
    /// Two color bombs: the whole board goes.
    DoubleBomb,
    /// Color bomb with a line booster: a shower of new line boosters.
    BoosterShower,
    /// Color bomb with an ordinary tile: every tile of that color goes.
    ColorSweep(Color),
    /// Two line boosters: the full row and column through the swap target.
    Cross,
    /// Line booster with an ordinary tile: the booster moves and fires.
    LineSwap,
}

impl Combo {
    pub fn detect(a: &Tile, b: &Tile) -> Option<Self> {
        use BoosterKind::{ColorBomb, None as Plain};

        match (a.booster(), b.booster()) {
            (ColorBomb, ColorBomb) => Some(Self::DoubleBomb),
            (ColorBomb, other) | (other, ColorBomb) if other.is_line() => Some(Self::BoosterShower),
            (ColorBomb, Plain) => b.payload().match_color().map(Self::ColorSweep),
            (Plain, ColorBomb) => a.payload().match_color().map(Self::ColorSweep),
            (x, y) if x.is_line() && y.is_line() => Some(Self::Cross),
            (x, Plain) | (Plain, x) if x.is_line() => Some(Self::LineSwap),
            _ => Option::None,
        }
    }
}

/// Resolves a swap of `a` onto `b` where at least one of the two holds a booster.
///
/// `b` is the triggering cell for effects centered on a position. Both trigger cells end up empty,
/// except for a line booster swapped with a plain tile: there the tiles trade places and the plain
/// tile stays unless the line covers it. The caller settles the board afterwards.
pub fn resolve_combo(
    a: Pos,
    b: Pos,
    grid: &mut Grid,
    rng: &mut SmallRng,
    shower: (u8, u8),
) -> Activation {
    let Some(combo) = Combo::detect(&grid[a], &grid[b]) else {
        log::warn!("No combo between {a:?} and {b:?}");
        return Activation::default();
    };
    log::debug!("{combo:?} combo between {a:?} and {b:?}");

    let mut activation = match combo {
        Combo::DoubleBomb => {
            let cells = grid.positions().filter(|&pos| !grid[pos].is_empty()).collect();
            Activation::clear_all(grid, cells)
        }
        Combo::BoosterShower => spawn_shower(grid, rng, shower, [a, b]),
        Combo::ColorSweep(color) => {
            let cells = cells_of_color(grid, color);
            Activation::clear_all(grid, cells)
        }
        Combo::Cross => {
            let cells = grid
                .row_positions(b.0)
                .chain(grid.column_positions(b.1))
                .collect();
            Activation::clear_all(grid, cells)
        }
        Combo::LineSwap => {
            let target = if grid[a].booster().is_line() { b } else { a };
            let before = (grid.payload(a), grid.payload(b));
            grid.swap_payload(a, b);
            let mut activation = activate(grid, target, None);
            let mut deltas = alloc::vec![
                CellDelta::new(a, before.0, before.1, DeltaKind::Swap),
                CellDelta::new(b, before.1, before.0, DeltaKind::Swap),
            ];
            deltas.append(&mut activation.deltas);
            activation.deltas = deltas;
            activation
        }
    };

    if combo != Combo::LineSwap {
        for pos in [a, b] {
            activation.push_clear(grid, pos);
        }
    }
    activation
}

/// Scatters a random number of line boosters over distinct ordinary cells, avoiding `exclude`.
fn spawn_shower(
    grid: &mut Grid,
    rng: &mut SmallRng,
    (min, max): (u8, u8),
    exclude: [Pos; 2],
) -> Activation {
    use rand::prelude::*;

    let count = usize::from(rng.random_range(min.min(max)..=max.max(min)));
    let mut eligible: Vec<Pos> = grid
        .positions()
        .filter(|pos| !exclude.contains(pos))
        .filter(|&pos| grid.payload(pos).match_color().is_some())
        .collect();
    if eligible.len() < count {
        log::warn!(
            "Booster shower wanted {count} cells but only {} are free",
            eligible.len()
        );
    }

    let mut activation = Activation::default();
    while activation.spawned.len() < count && !eligible.is_empty() {
        let pos = eligible.swap_remove(rng.random_range(0..eligible.len()));
        let kind = if rng.random_bool(0.5) {
            BoosterKind::RowClear
        } else {
            BoosterKind::ColumnClear
        };
        let new = Payload::booster(kind);
        let old = grid.set_payload(pos, new);
        activation
            .deltas
            .push(CellDelta::new(pos, old, new, DeltaKind::BoosterSpawn));
        activation.spawned.push((pos, kind));
    }
    activation.spawned.sort();
    activation.score = spawn_points(activation.spawned.len());
    activation
}
