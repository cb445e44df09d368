#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use activator::*;
pub use cascade::*;
pub use classifier::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use matcher::*;
pub use scoring::*;
pub use tile::*;
pub use types::*;

mod activator;
mod cascade;
mod classifier;
mod engine;
mod error;
mod generator;
mod grid;
mod matcher;
mod scoring;
#[cfg(test)]
mod testing;
mod tile;
mod types;

/// Smallest supported board edge.
pub const MIN_SIZE: Coord = 5;

pub const DEFAULT_SIZE: Coord = 8;

/// Inclusive range of line boosters spawned by a color bomb and line booster combo.
pub const DEFAULT_SHOWER: (u8, u8) = (5, 15);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub size: Coord,
    pub shower: (u8, u8),
    /// Stops a cascade after this many match passes. `None` runs until the board is stable.
    pub max_cascade_passes: Option<u16>,
}

impl EngineConfig {
    pub const fn new_unchecked(size: Coord) -> Self {
        Self {
            size,
            shower: DEFAULT_SHOWER,
            max_cascade_passes: None,
        }
    }

    pub fn new(size: Coord) -> Self {
        Self::new_unchecked(size.clamp(MIN_SIZE, Coord::MAX))
    }

    pub fn with_shower(mut self, (min, max): (u8, u8)) -> Self {
        self.shower = (min.min(max), min.max(max));
        self
    }

    pub fn with_max_cascade_passes(mut self, limit: Option<u16>) -> Self {
        self.max_cascade_passes = limit;
        self
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new_unchecked(DEFAULT_SIZE)
    }
}
