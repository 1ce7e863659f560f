use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// What one `reveal` call did. `observations` lists every newly revealed cell
/// with its adjacent-mine count, in reveal order, so the driver can feed each
/// one to the agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    pub observations: Vec<(Cell, u8)>,
}

impl RevealReport {
    fn outcome_only(outcome: RevealOutcome) -> Self {
        Self {
            outcome,
            observations: Vec::new(),
        }
    }
}

/// Board simulator: owns the ground truth and the player-visible board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    minefield: Minefield,
    board: Array2<BoardCell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: GameState,
    triggered_mine: Option<Cell>,
}

impl Game {
    pub fn new(minefield: Minefield) -> Self {
        let size = minefield.size();
        Self {
            minefield,
            board: Array2::default(size.to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
            state: GameState::default(),
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Cell {
        self.minefield.size()
    }

    pub fn game_config(&self) -> GameConfig {
        self.minefield.game_config()
    }

    pub fn total_mines(&self) -> CellCount {
        self.minefield.mine_count()
    }

    pub fn mines_left(&self) -> isize {
        (self.minefield.mine_count() as isize) - (self.flagged_count as isize)
    }

    pub fn cell_at(&self, cell: Cell) -> BoardCell {
        self.board[cell.to_nd_index()]
    }

    pub fn triggered_mine(&self) -> Option<Cell> {
        self.triggered_mine
    }

    /// Ground truth, for the driver and for rendering finished boards only.
    pub fn has_mine_at(&self, cell: Cell) -> bool {
        self.minefield.is_mine(cell)
    }

    /// Reveals a hidden cell. A mine loses the game; a zero-count cell opens
    /// its whole zero region breadth-first, like the classic game does.
    pub fn reveal(&mut self, cell: Cell) -> Result<RevealReport> {
        let cell = self.minefield.validate_cell(cell)?;
        self.check_not_finished()?;

        if !matches!(self.board[cell.to_nd_index()], BoardCell::Hidden) {
            return Ok(RevealReport::outcome_only(RevealOutcome::NoChange));
        }

        if self.minefield.is_mine(cell) {
            self.triggered_mine = Some(cell);
            self.state = GameState::Lost;
            return Ok(RevealReport::outcome_only(RevealOutcome::HitMine));
        }

        let mut observations = Vec::new();
        let mut visited = BTreeSet::from([cell]);
        let mut to_visit = VecDeque::from([cell]);

        while let Some(visit) = to_visit.pop_front() {
            if !matches!(self.board[visit.to_nd_index()], BoardCell::Hidden) {
                continue;
            }

            let count = self.minefield.adjacent_mine_count(visit);
            self.board[visit.to_nd_index()] = BoardCell::Revealed(count);
            self.revealed_count += 1;
            observations.push((visit, count));

            if count == 0 {
                for pos in self.minefield_neighbors(visit) {
                    if matches!(self.board[pos.to_nd_index()], BoardCell::Hidden)
                        && visited.insert(pos)
                    {
                        to_visit.push_back(pos);
                    }
                }
            }
        }

        let outcome = if self.revealed_count == self.minefield.safe_cell_count() {
            self.state = GameState::Won;
            RevealOutcome::Won
        } else {
            self.mark_started();
            RevealOutcome::Revealed
        };

        Ok(RevealReport {
            outcome,
            observations,
        })
    }

    pub fn toggle_flag(&mut self, cell: Cell) -> Result<MarkOutcome> {
        use BoardCell::*;
        use MarkOutcome::*;

        let cell = self.minefield.validate_cell(cell)?;
        self.check_not_finished()?;

        Ok(match self.board[cell.to_nd_index()] {
            Hidden => {
                self.board[cell.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                Changed
            }
            Flagged => {
                self.board[cell.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                Changed
            }
            Revealed(_) => NoChange,
        })
    }

    fn mark_started(&mut self) {
        if matches!(self.state, GameState::Ready) {
            self.state = GameState::Active;
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    fn minefield_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + use<> {
        neighbors(cell, self.minefield.size())
    }
}
