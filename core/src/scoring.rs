/// Score delta reported by a single engine call. Callers own the running total.
pub type Score = u32;

/// Awarded for each ordinary tile removed by a match or an activation.
pub const POINTS_PER_CLEAR: Score = 10;

/// Awarded for each booster spawned by a color bomb and line booster combo.
pub const POINTS_PER_SPAWN: Score = 5;

pub fn clear_points(cleared: usize) -> Score {
    Score::try_from(cleared)
        .unwrap_or(Score::MAX)
        .saturating_mul(POINTS_PER_CLEAR)
}

pub fn spawn_points(spawned: usize) -> Score {
    Score::try_from(spawned)
        .unwrap_or(Score::MAX)
        .saturating_mul(POINTS_PER_SPAWN)
}
