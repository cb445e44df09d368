use alloc::vec;
use alloc::vec::Vec;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    NotAdjacent,
    NoMatch,
}

/// Outcome of an accepted move, after the board has settled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    pub score: Score,
    pub snapshot: BoardSnapshot,
    pub passes: Vec<CascadePass>,
    pub capped: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapResult {
    Rejected(RejectReason),
    Accepted(MoveReport),
}

impl SwapResult {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn score(&self) -> Score {
        self.report().map_or(0, |report| report.score)
    }

    pub fn report(&self) -> Option<&MoveReport> {
        match self {
            Self::Accepted(report) => Some(report),
            Self::Rejected(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResult {
    pub score: Score,
    /// Cells cleared by the booster itself, not by the cascade that followed.
    pub affected: Vec<Pos>,
    pub snapshot: BoardSnapshot,
    pub passes: Vec<CascadePass>,
}

/// Owns the board and its random stream, and turns player input into settled boards.
///
/// Every public call leaves the board full and free of matches, unless a pass limit is configured
/// and was hit.
#[derive(Clone, Debug)]
pub struct Engine {
    config: EngineConfig,
    grid: Grid,
    rng: SmallRng,
}

impl Engine {
    /// New engine with a freshly generated board.
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self> {
        use rand::prelude::*;

        let mut engine = Self {
            config,
            grid: Grid::empty(config.size)?,
            rng: SmallRng::seed_from_u64(seed),
        };
        engine.reset(None);
        Ok(engine)
    }

    /// Engine over a prepared board. The board is taken as is, matches included.
    pub fn from_grid(grid: Grid, config: EngineConfig, seed: u64) -> Result<Self> {
        use rand::prelude::*;

        if grid.size() != config.size {
            return Err(EngineError::InvalidBoardShape);
        }
        Ok(Self {
            config,
            grid,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.grid.snapshot()
    }

    pub fn is_stable(&self) -> bool {
        self.grid.is_full() && find_matches(&self.grid).is_empty()
    }

    /// Swaps the payloads of two adjacent cells and resolves the consequences.
    ///
    /// A swap involving a booster resolves as a combo. Any other swap is kept only if one of the
    /// two cells ends up in a run; otherwise it is undone and the board is left untouched.
    pub fn propose_swap(&mut self, a: Pos, b: Pos) -> Result<SwapResult> {
        let a = self.grid.validate_pos(a)?;
        let b = self.grid.validate_pos(b)?;

        if !self.grid.are_adjacent(a, b) {
            log::trace!("Rejected swap {a:?} <-> {b:?}: not adjacent");
            return Ok(SwapResult::Rejected(RejectReason::NotAdjacent));
        }

        if Combo::detect(&self.grid[a], &self.grid[b]).is_some() {
            let activation = resolve_combo(a, b, &mut self.grid, &mut self.rng, self.config.shower);
            let pass = self.settle_pass(PassKind::Combo, activation);
            return Ok(SwapResult::Accepted(self.finish(vec![pass])));
        }

        self.grid.swap_payload(a, b);
        if !is_match_at(&self.grid, a.0, a.1) && !is_match_at(&self.grid, b.0, b.1) {
            self.grid.swap_payload(a, b);
            log::trace!("Rejected swap {a:?} <-> {b:?}: no match");
            return Ok(SwapResult::Rejected(RejectReason::NoMatch));
        }

        let (at_a, at_b) = (self.grid.payload(a), self.grid.payload(b));
        let swap = CascadePass {
            kind: PassKind::Swap,
            score: 0,
            boosters: Vec::new(),
            deltas: vec![
                CellDelta::new(a, at_b, at_a, DeltaKind::Swap),
                CellDelta::new(b, at_a, at_b, DeltaKind::Swap),
            ],
        };
        let report = self.finish(vec![swap]);
        log::debug!("Swap {a:?} <-> {b:?} scored {}", report.score);
        Ok(SwapResult::Accepted(report))
    }

    /// Pops the booster at `pos` and resolves the consequences.
    pub fn activate_at(&mut self, pos: Pos) -> Result<ActivationResult> {
        let pos = self.grid.validate_pos(pos)?;
        if !self.grid[pos].booster().is_booster() {
            return Err(EngineError::NotABooster);
        }

        let activation = activate(&mut self.grid, pos, None);
        let affected = activation.affected.clone();
        let pass = self.settle_pass(PassKind::Activation, activation);
        let report = self.finish(vec![pass]);
        log::debug!(
            "Activated {pos:?}: {} cells, scored {}",
            affected.len(),
            report.score
        );

        Ok(ActivationResult {
            score: report.score,
            affected,
            snapshot: report.snapshot,
            passes: report.passes,
        })
    }

    /// Regenerates the whole board. `Some(seed)` restarts the random stream first, so the same seed
    /// always yields the same board.
    pub fn reset(&mut self, seed: Option<u64>) -> BoardSnapshot {
        use rand::prelude::*;

        if let Some(seed) = seed {
            self.rng = SmallRng::seed_from_u64(seed);
        }
        let board_seed: u64 = self.rng.random();
        RandomBoardGenerator::new(board_seed).fill(&mut self.grid);
        log::debug!("New {0}x{0} board", self.grid.size());

        self.grid.snapshot()
    }

    fn settle_pass(&mut self, kind: PassKind, activation: Activation) -> CascadePass {
        let Activation {
            spawned,
            score,
            mut deltas,
            ..
        } = activation;
        settle(&mut self.grid, &mut self.rng, &mut deltas);
        CascadePass {
            kind,
            score,
            boosters: spawned,
            deltas,
        }
    }

    fn finish(&mut self, mut passes: Vec<CascadePass>) -> MoveReport {
        let report = CascadeResolver::new(&mut self.grid, &mut self.rng)
            .with_pass_limit(self.config.max_cascade_passes)
            .run();
        passes.extend(report.passes);

        MoveReport {
            score: passes
                .iter()
                .fold(0, |total: Score, pass| total.saturating_add(pass.score)),
            snapshot: self.grid.snapshot(),
            passes,
            capped: report.capped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn engine_with(cells: &[(Pos, char)]) -> Engine {
        Engine::from_grid(quiet_with(cells), EngineConfig::default(), 11).unwrap()
    }

    #[test]
    fn swap_without_match_is_rejected_and_undone() {
        let mut engine = engine_with(&[]);
        let before = engine.snapshot();

        let result = engine.propose_swap((0, 0), (0, 1)).unwrap();

        assert_eq!(result, SwapResult::Rejected(RejectReason::NoMatch));
        assert_eq!(result.score(), 0);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn non_adjacent_swap_is_rejected() {
        let mut engine = engine_with(&[]);
        let before = engine.snapshot();

        let far = engine.propose_swap((0, 0), (0, 2)).unwrap();
        let diagonal = engine.propose_swap((0, 0), (1, 1)).unwrap();

        assert_eq!(far, SwapResult::Rejected(RejectReason::NotAdjacent));
        assert_eq!(diagonal, SwapResult::Rejected(RejectReason::NotAdjacent));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn out_of_bounds_positions_are_errors() {
        let mut engine = engine_with(&[]);

        assert_eq!(
            engine.propose_swap((8, 0), (7, 0)),
            Err(EngineError::OutOfBounds)
        );
        assert_eq!(engine.activate_at((0, 8)), Err(EngineError::OutOfBounds));
    }

    #[test]
    fn matching_swap_commits_and_cascades() {
        let mut engine = engine_with(&[((3, 0), 'R'), ((3, 1), 'R'), ((4, 2), 'R')]);

        let result = engine.propose_swap((4, 2), (3, 2)).unwrap();

        let report = result.report().unwrap();
        assert_eq!(report.passes[0].kind, PassKind::Swap);
        assert_eq!(report.passes[0].deltas.len(), 2);
        assert_eq!(report.passes[1].kind, PassKind::Match);
        assert_eq!(report.passes[1].score, 30);
        assert!(report.score >= 30);
        assert!(!report.capped);
        assert!(engine.is_stable());
        assert_eq!(engine.snapshot(), report.snapshot);
    }

    #[test]
    fn double_color_bomb_clears_everything() {
        let mut engine = engine_with(&[((3, 3), '*'), ((3, 4), '*')]);

        let result = engine.propose_swap((3, 3), (3, 4)).unwrap();

        let report = result.report().unwrap();
        assert_eq!(report.passes[0].kind, PassKind::Combo);
        assert_eq!(report.passes[0].score, 640);
        assert!(report.snapshot.is_full());
        assert!(engine.is_stable());
    }

    #[test]
    fn color_bomb_with_neutral_tile_is_a_plain_rejected_swap() {
        let mut engine = engine_with(&[((3, 3), '*'), ((3, 4), '#')]);
        let before = engine.snapshot();

        let result = engine.propose_swap((3, 3), (3, 4)).unwrap();

        assert_eq!(result, SwapResult::Rejected(RejectReason::NoMatch));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn row_clear_activation_clears_its_row() {
        let mut engine = engine_with(&[((2, 5), '-')]);

        let result = engine.activate_at((2, 5)).unwrap();

        let row: Vec<Pos> = (0..8).map(|col| (2, col)).collect();
        assert_eq!(result.affected, row);
        assert_eq!(result.passes[0].kind, PassKind::Activation);
        assert_eq!(result.passes[0].score, 80);
        assert!(result.score >= 80);
        assert!(engine.is_stable());
    }

    #[test]
    fn activating_plain_tile_is_an_error() {
        let mut engine = engine_with(&[]);

        assert_eq!(engine.activate_at((0, 0)), Err(EngineError::NotABooster));
    }

    #[test]
    fn new_board_is_full_stable_and_booster_free() {
        let engine = Engine::new(EngineConfig::default(), 1).unwrap();
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.size(), 8);
        assert!(engine.is_stable());
        assert_eq!(snapshot.booster_count(), 0);
    }

    #[test]
    fn same_seed_same_game() {
        let mut first = Engine::new(EngineConfig::default(), 99).unwrap();
        let mut second = Engine::new(EngineConfig::default(), 99).unwrap();

        assert_eq!(first.snapshot(), second.snapshot());
        assert_eq!(first.reset(None), second.reset(None));
    }

    #[test]
    fn reset_with_seed_is_reproducible() {
        let mut engine = Engine::new(EngineConfig::default(), 5).unwrap();

        let first = engine.reset(Some(42));
        engine.reset(None);
        let again = engine.reset(Some(42));

        assert_eq!(first, again);
    }

    #[test]
    fn pass_cap_leaves_settled_board_with_matches() {
        let grid = quiet_with(&[((3, 0), 'R'), ((3, 1), 'R'), ((3, 2), 'R'), ((2, 7), '-')]);
        let config = EngineConfig::default().with_max_cascade_passes(Some(0));
        let mut engine = Engine::from_grid(grid, config, 1).unwrap();

        let result = engine.activate_at((2, 7)).unwrap();

        assert_eq!(result.passes.len(), 1);
        assert!(engine.snapshot().is_full());
        // Row 3 sits below the cleared row, so its run survives the settle untouched.
        assert!(find_matches(engine.grid()).contains(&(3, 0)));
    }

    #[test]
    fn from_grid_rejects_size_mismatch() {
        let grid = Grid::empty(6).unwrap();

        assert_eq!(
            Engine::from_grid(grid, EngineConfig::default(), 0).err(),
            Some(EngineError::InvalidBoardShape)
        );
    }
}
