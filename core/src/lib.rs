//! Knowledge-based Minesweeper agent and the board simulation that drives it.
//!
//! The interesting part lives in [`agent`]: sentences of the form "exactly
//! `count` of these cells are mines" plus a fixpoint deduction loop over them.

#![no_std]

extern crate alloc;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use agent::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use tile::*;
pub use types::*;

mod agent;
mod error;
mod game;
mod generator;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Cell,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Cell, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new((rows, cols): Cell, mines: CellCount) -> Self {
        let rows = rows.clamp(1, Coord::MAX);
        let cols = cols.clamp(1, Coord::MAX);
        let mines = mines.clamp(1, mult(rows, cols));
        Self::new_unchecked((rows, cols), mines)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

/// Ground-truth mine placement. Only the simulator and the driver see it;
/// the agent learns about it exclusively through observations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl Minefield {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Cell, mine_coords: &[Cell]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &cell in mine_coords {
            if cell.0 >= size.0 || cell.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[cell.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            size: self.size(),
            mines: self.mine_count,
        }
    }

    pub fn validate_cell(&self, cell: Cell) -> Result<Cell> {
        let size = self.size();
        if cell.0 < size.0 && cell.1 < size.1 {
            Ok(cell)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Cell {
        let dim = self.mine_mask.dim();
        (
            dim.0.try_into().unwrap_or(Coord::MAX),
            dim.1.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mine_mask[cell.to_nd_index()]
    }

    /// The observation value a revealed cell reports: how many of its
    /// neighbors hold mines.
    pub fn adjacent_mine_count(&self, cell: Cell) -> u8 {
        self.mine_mask
            .iter_neighbors(cell)
            .filter(|&pos| self.is_mine(pos))
            .count()
            .try_into()
            .unwrap_or(u8::MAX)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

impl core::ops::BitOr for MarkOutcome {
    type Output = MarkOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        if self.has_update() || rhs.has_update() {
            Self::Changed
        } else {
            Self::NoChange
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}
