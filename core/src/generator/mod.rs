use rand::rngs::SmallRng;

use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    fn fill(self, grid: &mut Grid);
}

/// Uniform pick from the playable palette. Never yields [`Color::Neutral`].
pub fn random_color(rng: &mut SmallRng) -> Color {
    use rand::prelude::*;

    Color::PALETTE[rng.random_range(0..Color::PALETTE.len())]
}
