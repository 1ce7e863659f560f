use alloc::vec::Vec;
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Uniformly random mine placement, optionally keeping the starting cell safe.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start: Cell,
    start_tile: StartTile,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start: Cell, start_tile: StartTile) -> Self {
        Self {
            seed,
            start,
            start_tile,
        }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> Minefield {
        let total_cells = config.total_cells();

        let start_tile = match self.start_tile {
            StartTile::SimpleSafe if config.mines + 1 > total_cells => {
                log::warn!("cannot keep start cell safe, falling back to random placement");
                StartTile::Random
            }
            other => other,
        };

        let (rows, cols) = config.size;
        let mut candidates: Vec<Cell> = Vec::with_capacity(total_cells as usize);
        for row in 0..rows {
            for col in 0..cols {
                let cell = (row, col);
                if start_tile == StartTile::SimpleSafe && cell == self.start {
                    continue;
                }
                candidates.push(cell);
            }
        }

        let mines = if config.mines as usize > candidates.len() {
            log::warn!(
                "requested {} mines but only {} cells fit, clamping",
                config.mines,
                candidates.len()
            );
            candidates.len()
        } else {
            config.mines as usize
        };

        // partial Fisher-Yates: the first `mines` entries end up uniform
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        for placed in 0..mines {
            let pick = rng.random_range(placed..candidates.len());
            candidates.swap(placed, pick);
            mine_mask[candidates[placed].to_nd_index()] = true;
        }

        Minefield::from_mine_mask(mine_mask)
    }
}
