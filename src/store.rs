use crate::engine::{Attempt, Game, GameOutcome};
use crate::error::{GameError, GameResult};
use crate::stats::{self, StatsSnapshot};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A finished game as the store keeps it: the game plus its assigned
/// identifier. This is also the wire encoding for persisted records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: u64,
    pub player_name: String,
    pub secret_value: u32,
    pub max_attempts: u32,
    pub outcome: GameOutcome,
    pub total_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub attempts: Vec<Attempt>,
}

impl GameRecord {
    fn from_game(id: u64, game: Game) -> Self {
        Self {
            id,
            player_name: game.player_name().to_string(),
            secret_value: game.secret_value(),
            max_attempts: game.max_attempts(),
            outcome: game.outcome(),
            total_attempts: game.attempts().len() as u32,
            created_at: game.created_at(),
            attempts: game.into_attempts(),
        }
    }
}

/// On-disk shape of the whole collection. `next_id` travels with the data
/// so identifiers are never reused, even after deletions and restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    pub next_id: u64,
    pub games: Vec<GameRecord>,
}

/// Export payload: the full collection plus the moment it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub total_games: usize,
    pub games: Vec<GameRecord>,
}

/// Where a store keeps its records between runs. Implementations report
/// failures as `StorageUnavailable`; nothing is retried here.
pub trait Storage {
    /// The previously persisted document, or `None` when nothing has been
    /// stored yet.
    fn load(&self) -> GameResult<Option<StoreDocument>>;

    fn persist(&self, document: &StoreDocument) -> GameResult<()>;

    /// Short human-readable description, used in log lines.
    fn describe(&self) -> String;
}

/// JSON file backend. The default location lives under the user data
/// directory, next to where other tools of this kind keep their caches.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `<user data dir>/guess-number/games.json`, when the platform exposes
    /// a data directory.
    #[must_use]
    pub fn default_data_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("guess-number").join("games.json"))
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> GameResult<Option<StoreDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let document = serde_json::from_str(&contents)?;
        Ok(Some(document))
    }

    fn persist(&self, document: &StoreDocument) -> GameResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Backend that keeps nothing between runs. Used for `--memory` sessions
/// and as the degraded fallback.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage;

impl Storage for MemoryStorage {
    fn load(&self) -> GameResult<Option<StoreDocument>> {
        Ok(None)
    }

    fn persist(&self, _document: &StoreDocument) -> GameResult<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

/// How the store is operating. `Degraded` means the configured backend
/// could not be opened and records only live for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Persistent,
    Ephemeral,
    Degraded,
}

/// Durable collection of finished games.
///
/// All mutation goes through `&mut self`, so identifier assignment is
/// serialized and a lookup racing a deletion sees either the full record
/// or a clean not-found.
pub struct GameStore {
    backend: Box<dyn Storage>,
    records: Vec<GameRecord>,
    next_id: u64,
    mode: StoreMode,
}

impl GameStore {
    /// Opens the store on the given backend, loading whatever it holds.
    /// Fails with `StorageUnavailable` when the backend cannot be read.
    pub fn open<S: Storage + 'static>(backend: S) -> GameResult<Self> {
        let document = backend.load()?.unwrap_or_default();
        info!(
            "opened game store ({}): {} recorded games",
            backend.describe(),
            document.games.len()
        );
        Ok(Self {
            backend: Box::new(backend),
            next_id: document.next_id.max(1),
            records: document.games,
            mode: StoreMode::Persistent,
        })
    }

    /// A store that never touches disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryStorage),
            records: Vec::new(),
            next_id: 1,
            mode: StoreMode::Ephemeral,
        }
    }

    /// Opens the backend, falling back to an in-memory store when it is
    /// unavailable. The fallback is observable: the returned store reports
    /// [`StoreMode::Degraded`] and the failure is logged, instead of the
    /// session silently switching storage.
    #[must_use]
    pub fn open_or_degrade<S: Storage + 'static>(backend: S) -> Self {
        let description = backend.describe();
        match Self::open(backend) {
            Ok(store) => store,
            Err(err) => {
                warn!("game store {description} unavailable, continuing without persistence: {err}");
                let mut store = Self::in_memory();
                store.mode = StoreMode::Degraded;
                store
            }
        }
    }

    #[must_use]
    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records a finished game and returns its assigned identifier.
    ///
    /// Identifiers increase monotonically and are never reused, even after
    /// deletion. When persisting fails the append is rolled back (the
    /// identifier stays consumed) and the error is surfaced, so the
    /// in-memory collection never drifts from what the caller saw.
    pub fn record_game(&mut self, game: Game) -> GameResult<u64> {
        if !game.outcome().is_terminal() {
            return Err(GameError::IncompleteGame);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.records.push(GameRecord::from_game(id, game));

        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err);
        }
        info!("recorded game #{id}");
        Ok(id)
    }

    /// All stored games, newest first. Ties on the creation timestamp are
    /// broken by the higher identifier, which is the later one.
    #[must_use]
    pub fn list_games(&self) -> Vec<&GameRecord> {
        let mut games: Vec<&GameRecord> = self.records.iter().collect();
        games.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        games
    }

    pub fn get_game(&self, id: u64) -> GameResult<&GameRecord> {
        self.records
            .iter()
            .find(|record| record.id == id)
            .ok_or(GameError::NotFound(id))
    }

    /// Removes a record. Deleting an absent id is not an error; it returns
    /// `Ok(false)` so callers can tell the two outcomes apart.
    pub fn delete_game(&mut self, id: u64) -> GameResult<bool> {
        let Some(index) = self.records.iter().position(|record| record.id == id) else {
            return Ok(false);
        };

        let removed = self.records.remove(index);
        if let Err(err) = self.persist() {
            self.records.insert(index, removed);
            return Err(err);
        }
        info!("deleted game #{id}");
        Ok(true)
    }

    /// Removes every record.
    pub fn clear_all(&mut self) -> GameResult<()> {
        let removed = std::mem::take(&mut self.records);
        if let Err(err) = self.persist() {
            self.records = removed;
            return Err(err);
        }
        info!("cleared all recorded games");
        Ok(())
    }

    /// Recomputes the statistics snapshot from the full collection.
    #[must_use]
    pub fn compute_stats(&self) -> StatsSnapshot {
        stats::compute_stats(&self.records)
    }

    /// Builds the export payload: every record, newest first, stamped with
    /// the given export time. Pure; the I/O lives in
    /// [`GameStore::export_to_file`].
    #[must_use]
    pub fn export_document(&self, exported_at: DateTime<Utc>) -> ExportDocument {
        let games: Vec<GameRecord> = self.list_games().into_iter().cloned().collect();
        ExportDocument {
            exported_at,
            total_games: games.len(),
            games,
        }
    }

    /// Serializes the export document to `path`. A side effect only; the
    /// stored collection is not touched.
    pub fn export_to_file(&self, path: &Path) -> GameResult<()> {
        let document = self.export_document(Utc::now());
        let contents = serde_json::to_string_pretty(&document)?;
        fs::write(path, contents)?;
        info!(
            "exported {} games to {}",
            document.total_games,
            path.display()
        );
        Ok(())
    }

    fn persist(&self) -> GameResult<()> {
        let document = StoreDocument {
            next_id: self.next_id,
            games: self.records.clone(),
        };
        self.backend.persist(&document)
    }
}
