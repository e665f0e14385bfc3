// Library interface for guess-number
// This allows integration tests to access internal modules

pub mod cli;
pub mod engine;
pub mod error;
pub mod session;
pub mod stats;
pub mod store;

// Re-export the request/response contract for easier consumption
pub use engine::{
    Attempt, AttemptResult, DEFAULT_MAX_ATTEMPTS, Game, GameEngine, GameOutcome, GameSummary,
    GuessOutcome, SECRET_MAX, SECRET_MIN,
};
pub use error::{GameError, GameResult};
pub use session::{DEFAULT_PLAYER_NAME, session_loop};
pub use store::{
    ExportDocument, GameRecord, GameStore, JsonFileStorage, MemoryStorage, Storage, StoreMode,
};
pub use stats::{StatsSnapshot, StatsTotals};
