use thiserror::Error;

/// Error taxonomy shared by the game engine and the game store.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid guess: {0}")]
    InvalidGuess(String),

    #[error("The game is still in progress and cannot be recorded")]
    IncompleteGame,

    #[error("No game with id {0}")]
    NotFound(u64),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        GameError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::StorageUnavailable(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type GameResult<T> = Result<T, GameError>;
