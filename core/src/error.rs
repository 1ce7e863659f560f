use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Cell out of board bounds")]
    InvalidCoords,
    #[error("Too many mines for the board")]
    TooManyMines,
    #[error("Clue count exceeds the number of neighboring cells")]
    ImpossibleClue,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
