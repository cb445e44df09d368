use super::*;

/// Fills every cell with a random playable color, then rerolls matched cells until the board has
/// no match. Boosters are never placed.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn fill(self, grid: &mut Grid) {
        use rand::prelude::*;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        for pos in grid.positions() {
            grid.set_payload(pos, Payload::gem(random_color(&mut rng)));
        }

        let mut rerolls = 0usize;
        loop {
            let matches = find_matches(grid);
            if matches.is_empty() {
                break;
            }
            rerolls += matches.len();
            for pos in matches {
                grid.set_payload(pos, Payload::gem(random_color(&mut rng)));
            }
        }
        log::debug!(
            "Generated {0}x{0} board from seed {1}, rerolled {rerolls} tiles",
            grid.size(),
            self.seed
        );
    }
}
