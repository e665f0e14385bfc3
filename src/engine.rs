use crate::error::{GameError, GameResult};
use chrono::{DateTime, Utc};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SECRET_MIN: u32 = 1;
pub const SECRET_MAX: u32 = 100;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Classification of a single guess against the secret value.
///
/// Exactly one variant applies per guess: the domain is ordered integers
/// compared to a fixed integer, so there are no ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuessOutcome {
    TooHigh,
    TooLow,
    Correct,
}

impl fmt::Display for GuessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GuessOutcome::TooHigh => "too high",
            GuessOutcome::TooLow => "too low",
            GuessOutcome::Correct => "correct",
        };
        f.write_str(label)
    }
}

/// Where a game stands. `Won` and `Lost` are terminal: no transition
/// leaves them and no further attempts are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameOutcome {
    InProgress,
    Won,
    Lost,
}

impl GameOutcome {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != GameOutcome::InProgress
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameOutcome::InProgress => "in progress",
            GameOutcome::Won => "won",
            GameOutcome::Lost => "lost",
        };
        f.write_str(label)
    }
}

/// One recorded guess. Immutable once created, owned by the game that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub sequence_number: u32,
    pub guessed_value: u32,
    pub outcome: GuessOutcome,
}

/// A single round of the guessing game.
///
/// Fields are private so the only way attempts get appended, or the outcome
/// changes, is through [`GameEngine::submit_guess`]. A terminal game is
/// effectively frozen until it is handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    player_name: String,
    secret_value: u32,
    max_attempts: u32,
    attempts: Vec<Attempt>,
    outcome: GameOutcome,
    created_at: DateTime<Utc>,
}

impl Game {
    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub fn secret_value(&self) -> u32 {
        self.secret_value
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    #[must_use]
    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn into_attempts(self) -> Vec<Attempt> {
        self.attempts
    }
}

/// What a caller learns when a game starts. The secret value is not part
/// of this; it is only exposed through [`GameEngine::hint`] or a terminal
/// [`AttemptResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub player_name: String,
    pub max_attempts: u32,
}

/// Outcome of one submitted guess. `secret_value` is populated only when
/// the guess ended the game, so the caller can show the reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub attempt: Attempt,
    pub outcome: GameOutcome,
    pub secret_value: Option<u32>,
}

impl AttemptResult {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }
}

/// Owns at most one active game and drives it through
/// `NotStarted -> InProgress -> {Won, Lost}`.
#[derive(Debug)]
pub struct GameEngine {
    max_attempts: u32,
    current: Option<Game>,
}

impl GameEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_ATTEMPTS)
    }

    /// An engine whose games allow `max_attempts` guesses instead of the
    /// default. `max_attempts` must be at least 1.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            current: None,
        }
    }

    /// Starts a fresh game with a uniformly random secret in
    /// [`SECRET_MIN`, `SECRET_MAX`]. Replaces any previously active game.
    pub fn start_new_game(&mut self, player_name: &str) -> GameResult<GameSummary> {
        let secret = rand::rng().random_range(SECRET_MIN..=SECRET_MAX);
        self.start_game_with_secret(player_name, secret)
    }

    /// Starts a game with a fixed secret. Used for scripted play and tests;
    /// the normal path is [`GameEngine::start_new_game`].
    pub fn start_game_with_secret(
        &mut self,
        player_name: &str,
        secret_value: u32,
    ) -> GameResult<GameSummary> {
        let name = player_name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidInput(
                "player name must not be empty".to_string(),
            ));
        }
        if !(SECRET_MIN..=SECRET_MAX).contains(&secret_value) {
            return Err(GameError::InvalidInput(format!(
                "secret value must be between {SECRET_MIN} and {SECRET_MAX}"
            )));
        }

        debug!(
            "new game for {name}: {} attempts allowed",
            self.max_attempts
        );
        self.current = Some(Game {
            player_name: name.to_string(),
            secret_value,
            max_attempts: self.max_attempts,
            attempts: Vec::new(),
            outcome: GameOutcome::InProgress,
            created_at: Utc::now(),
        });

        Ok(GameSummary {
            player_name: name.to_string(),
            max_attempts: self.max_attempts,
        })
    }

    /// Parses and classifies one guess.
    ///
    /// All validation happens before any mutation: a failed guess never
    /// appends an attempt and never changes the game outcome. The
    /// `max_attempts`-th non-winning guess is still recorded, then the game
    /// transitions to `Lost` (count-then-terminate).
    pub fn submit_guess(&mut self, raw_input: &str) -> GameResult<AttemptResult> {
        let game = match self.current.as_mut() {
            Some(game) if game.outcome == GameOutcome::InProgress => game,
            Some(_) => {
                return Err(GameError::InvalidGuess(
                    "the game is already over, start a new one".to_string(),
                ));
            }
            None => {
                return Err(GameError::InvalidGuess(
                    "no game in progress".to_string(),
                ));
            }
        };

        let trimmed = raw_input.trim();
        let value: u32 = trimmed.parse().map_err(|_| {
            GameError::InvalidGuess(format!("'{trimmed}' is not a whole number"))
        })?;
        if !(SECRET_MIN..=SECRET_MAX).contains(&value) {
            return Err(GameError::InvalidGuess(format!(
                "guess must be between {SECRET_MIN} and {SECRET_MAX}"
            )));
        }

        let outcome = if value < game.secret_value {
            GuessOutcome::TooLow
        } else if value > game.secret_value {
            GuessOutcome::TooHigh
        } else {
            GuessOutcome::Correct
        };

        let attempt = Attempt {
            sequence_number: game.attempts.len() as u32 + 1,
            guessed_value: value,
            outcome,
        };
        game.attempts.push(attempt.clone());

        if outcome == GuessOutcome::Correct {
            game.outcome = GameOutcome::Won;
        } else if attempt.sequence_number == game.max_attempts {
            game.outcome = GameOutcome::Lost;
        }
        debug!(
            "attempt {}: guessed {value} ({outcome}), game {}",
            attempt.sequence_number, game.outcome
        );

        let secret_value = game.outcome.is_terminal().then_some(game.secret_value);
        Ok(AttemptResult {
            attempt,
            outcome: game.outcome,
            secret_value,
        })
    }

    /// The active game, if any.
    #[must_use]
    pub fn current_game(&self) -> Option<&Game> {
        self.current.as_ref()
    }

    /// Debug accessor for the secret of the active game.
    #[must_use]
    pub fn hint(&self) -> Option<u32> {
        self.current.as_ref().map(|game| game.secret_value)
    }

    /// Hands out the finished game for persistence and returns the engine
    /// to its pre-start state. `None` while a game is still running or
    /// before any game started.
    pub fn take_finished(&mut self) -> Option<Game> {
        if self.current.as_ref()?.outcome.is_terminal() {
            self.current.take()
        } else {
            None
        }
    }

    /// Discards the active game without persisting anything.
    pub fn reset_game(&mut self) {
        if self.current.take().is_some() {
            debug!("active game discarded");
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_secret(secret: u32) -> GameEngine {
        let mut engine = GameEngine::new();
        engine
            .start_game_with_secret("tester", secret)
            .expect("game should start");
        engine
    }

    #[test]
    fn test_start_new_game_hides_secret_in_summary() {
        let mut engine = GameEngine::new();
        let summary = engine.start_new_game("alice").unwrap();
        assert_eq!(summary.player_name, "alice");
        assert_eq!(summary.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_start_new_game_trims_player_name() {
        let mut engine = GameEngine::new();
        let summary = engine.start_new_game("  bob  ").unwrap();
        assert_eq!(summary.player_name, "bob");
    }

    #[test]
    fn test_start_new_game_rejects_empty_name() {
        let mut engine = GameEngine::new();
        let result = engine.start_new_game("   ");
        assert!(matches!(result, Err(GameError::InvalidInput(_))));
        assert!(engine.current_game().is_none());
    }

    #[test]
    fn test_secret_is_always_in_range() {
        let mut engine = GameEngine::new();
        for _ in 0..200 {
            engine.start_new_game("range-check").unwrap();
            let secret = engine.hint().unwrap();
            assert!((SECRET_MIN..=SECRET_MAX).contains(&secret));
        }
    }

    #[test]
    fn test_start_with_secret_rejects_out_of_range_secret() {
        let mut engine = GameEngine::new();
        assert!(matches!(
            engine.start_game_with_secret("tester", 0),
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.start_game_with_secret("tester", 101),
            Err(GameError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_correct_guess_wins_regardless_of_prior_attempts() {
        let mut engine = engine_with_secret(73);
        engine.submit_guess("10").unwrap();
        engine.submit_guess("90").unwrap();

        let result = engine.submit_guess("73").unwrap();
        assert_eq!(result.attempt.outcome, GuessOutcome::Correct);
        assert_eq!(result.outcome, GameOutcome::Won);
        assert!(result.is_terminal());
        assert_eq!(result.secret_value, Some(73));
    }

    #[test]
    fn test_classification_too_low_and_too_high() {
        let mut engine = engine_with_secret(50);

        let low = engine.submit_guess("25").unwrap();
        assert_eq!(low.attempt.outcome, GuessOutcome::TooLow);
        assert_eq!(low.outcome, GameOutcome::InProgress);
        assert_eq!(low.secret_value, None);

        let high = engine.submit_guess("75").unwrap();
        assert_eq!(high.attempt.outcome, GuessOutcome::TooHigh);
        assert_eq!(high.outcome, GameOutcome::InProgress);
    }

    #[test]
    fn test_final_non_winning_guess_is_counted_then_game_is_lost() {
        let mut engine = GameEngine::with_max_attempts(3);
        engine.start_game_with_secret("tester", 7).unwrap();

        engine.submit_guess("1").unwrap();
        engine.submit_guess("2").unwrap();
        let last = engine.submit_guess("3").unwrap();

        assert_eq!(last.attempt.sequence_number, 3);
        assert_eq!(last.outcome, GameOutcome::Lost);
        assert_eq!(last.secret_value, Some(7));
        assert_eq!(engine.current_game().unwrap().attempts().len(), 3);
    }

    #[test]
    fn test_guess_after_terminal_fails_without_appending() {
        let mut engine = engine_with_secret(42);
        engine.submit_guess("42").unwrap();

        let result = engine.submit_guess("50");
        assert!(matches!(result, Err(GameError::InvalidGuess(_))));
        assert_eq!(engine.current_game().unwrap().attempts().len(), 1);
    }

    #[test]
    fn test_guess_before_any_game_fails() {
        let mut engine = GameEngine::new();
        assert!(matches!(
            engine.submit_guess("50"),
            Err(GameError::InvalidGuess(_))
        ));
    }

    #[test]
    fn test_invalid_inputs_do_not_consume_attempts() {
        let mut engine = engine_with_secret(42);

        for input in ["abc", "0", "101", "", "4.5", "-3"] {
            let result = engine.submit_guess(input);
            assert!(
                matches!(result, Err(GameError::InvalidGuess(_))),
                "input {input:?} should be rejected"
            );
        }
        assert!(engine.current_game().unwrap().attempts().is_empty());
    }

    #[test]
    fn test_boundary_guesses_are_accepted() {
        let mut engine = engine_with_secret(42);
        assert!(engine.submit_guess("1").is_ok());
        assert!(engine.submit_guess("100").is_ok());
        assert_eq!(engine.current_game().unwrap().attempts().len(), 2);
    }

    #[test]
    fn test_guess_input_is_trimmed() {
        let mut engine = engine_with_secret(42);
        let result = engine.submit_guess("  42  ").unwrap();
        assert_eq!(result.outcome, GameOutcome::Won);
    }

    #[test]
    fn test_winning_scenario_sequence() {
        // secret=42, guesses [50, 25, 37, 42]
        let mut engine = engine_with_secret(42);

        let expected = [
            GuessOutcome::TooHigh,
            GuessOutcome::TooLow,
            GuessOutcome::TooHigh,
            GuessOutcome::Correct,
        ];
        let mut last = None;
        for (guess, want) in ["50", "25", "37", "42"].iter().zip(expected) {
            let result = engine.submit_guess(guess).unwrap();
            assert_eq!(result.attempt.outcome, want);
            last = Some(result);
        }

        let last = last.unwrap();
        assert_eq!(last.outcome, GameOutcome::Won);
        assert_eq!(last.attempt.sequence_number, 4);
        assert_eq!(engine.current_game().unwrap().attempts().len(), 4);
    }

    #[test]
    fn test_losing_scenario_rejects_fourth_guess() {
        // secret=7, maxAttempts=3, guesses [1, 2, 3]
        let mut engine = GameEngine::with_max_attempts(3);
        engine.start_game_with_secret("tester", 7).unwrap();

        engine.submit_guess("1").unwrap();
        engine.submit_guess("2").unwrap();
        let third = engine.submit_guess("3").unwrap();
        assert_eq!(third.outcome, GameOutcome::Lost);

        assert!(engine.submit_guess("4").is_err());
        assert_eq!(engine.current_game().unwrap().attempts().len(), 3);
    }

    #[test]
    fn test_sequence_numbers_are_contiguous_from_one() {
        let mut engine = engine_with_secret(42);
        for (i, guess) in ["10", "20", "30"].iter().enumerate() {
            let result = engine.submit_guess(guess).unwrap();
            assert_eq!(result.attempt.sequence_number, i as u32 + 1);
        }
    }

    #[test]
    fn test_take_finished_only_after_terminal() {
        let mut engine = engine_with_secret(42);
        assert!(engine.take_finished().is_none());

        engine.submit_guess("42").unwrap();
        let game = engine.take_finished().expect("finished game");
        assert_eq!(game.outcome(), GameOutcome::Won);
        assert_eq!(game.player_name(), "tester");

        // Engine is back to its pre-start state.
        assert!(engine.current_game().is_none());
        assert!(engine.take_finished().is_none());
    }

    #[test]
    fn test_reset_game_discards_active_game() {
        let mut engine = engine_with_secret(42);
        engine.submit_guess("10").unwrap();

        engine.reset_game();
        assert!(engine.current_game().is_none());
        assert!(matches!(
            engine.submit_guess("42"),
            Err(GameError::InvalidGuess(_))
        ));
    }

    #[test]
    fn test_starting_a_game_replaces_the_previous_one() {
        let mut engine = engine_with_secret(42);
        engine.submit_guess("10").unwrap();

        engine.start_game_with_secret("tester", 60).unwrap();
        let game = engine.current_game().unwrap();
        assert!(game.attempts().is_empty());
        assert_eq!(game.secret_value(), 60);
    }

    #[test]
    fn test_hint_exposes_secret_only_while_a_game_exists() {
        let mut engine = GameEngine::new();
        assert_eq!(engine.hint(), None);

        engine.start_game_with_secret("tester", 33).unwrap();
        assert_eq!(engine.hint(), Some(33));

        engine.reset_game();
        assert_eq!(engine.hint(), None);
    }

    #[test]
    fn test_outcome_wire_names_are_camel_case() {
        let attempt = Attempt {
            sequence_number: 1,
            guessed_value: 50,
            outcome: GuessOutcome::TooHigh,
        };
        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["sequenceNumber"], 1);
        assert_eq!(json["guessedValue"], 50);
        assert_eq!(json["outcome"], "tooHigh");

        assert_eq!(
            serde_json::to_value(GameOutcome::Won).unwrap(),
            serde_json::json!("won")
        );
    }
}
