use core::fmt;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::{Cell, CellCount, MarkOutcome};

/// One logical statement about the board: exactly `count` of `cells` are
/// mines. Two sentences are interchangeable iff both the cell set and the
/// count match; the knowledge base deduplicates on that equality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    cells: HashSet<Cell>,
    count: CellCount,
}

impl Sentence {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: CellCount) -> Self {
        Self {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> CellCount {
        self.count
    }

    /// An empty sentence is the tautology `{} = 0` and carries no information.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All members are mines exactly when the count matches the cell count.
    pub fn known_mine_cells(&self) -> Option<&HashSet<Cell>> {
        (self.count as usize == self.cells.len()).then_some(&self.cells)
    }

    /// All members are safe exactly when the count is zero.
    pub fn known_safe_cells(&self) -> Option<&HashSet<Cell>> {
        (self.count == 0).then_some(&self.cells)
    }

    /// Narrows the sentence with the fact that `cell` is a mine: the cell
    /// leaves the set and the count drops by one. No-op for non-members.
    pub fn mark_mine(&mut self, cell: Cell) -> MarkOutcome {
        if self.cells.remove(&cell) {
            debug_assert!(self.count > 0, "mine marked in a zero-count sentence");
            self.count = self.count.saturating_sub(1);
            MarkOutcome::Changed
        } else {
            MarkOutcome::NoChange
        }
    }

    /// Narrows the sentence with the fact that `cell` is safe: the cell
    /// leaves the set, the count stays. No-op for non-members.
    pub fn mark_safe(&mut self, cell: Cell) -> MarkOutcome {
        if self.cells.remove(&cell) {
            MarkOutcome::Changed
        } else {
            MarkOutcome::NoChange
        }
    }

    /// Subset rule: when `subset.cells ⊆ self.cells`, the cells exclusive to
    /// `self` hold exactly `self.count - subset.count` mines. Returns `None`
    /// for equal sentences, non-subsets, and empty differences.
    pub fn resolve_with(&self, subset: &Sentence) -> Option<Sentence> {
        if self == subset || !subset.cells.is_subset(&self.cells) {
            return None;
        }

        let cells: HashSet<Cell> = self.cells.difference(&subset.cells).copied().collect();
        if cells.is_empty() {
            return None;
        }

        debug_assert!(
            self.count >= subset.count,
            "subset rule applied to inconsistent sentences"
        );
        Some(Sentence {
            cells,
            count: self.count.saturating_sub(subset.count),
        })
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} = {}", self.cells, self.count)
    }
}
