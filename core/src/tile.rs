use serde::{Deserialize, Serialize};

/// Player-visible state of one board cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardCell {
    #[default]
    Hidden,
    Revealed(u8),
    Flagged,
}

impl BoardCell {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}
