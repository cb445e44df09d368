use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Position is outside the grid")]
    OutOfBounds,
    #[error("Tile has no booster to activate")]
    NotABooster,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Unknown cell symbol {0:?}")]
    UnknownSymbol(char),
    #[error("Board must be at least {min}x{min}", min = crate::MIN_SIZE)]
    BoardTooSmall,
}

pub type Result<T> = core::result::Result<T, EngineError>;
