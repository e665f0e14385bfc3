use crate::engine::{GameEngine, GameOutcome, GuessOutcome, SECRET_MAX, SECRET_MIN};
use crate::stats::StatsSnapshot;
use crate::store::{GameRecord, GameStore, StoreMode};
use chrono::Utc;
use log::warn;
use std::io::BufRead;
use std::path::PathBuf;

/// Name recorded when the player leaves theirs blank.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

enum Command {
    Guess(String),
    NewRound,
    Stats,
    History,
    Show(u64),
    Delete(u64),
    Clear,
    Export(Option<PathBuf>),
    Hint,
    Exit,
    Invalid,
}

fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Invalid;
    }

    let mut parts = trimmed.split_whitespace();
    let head = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();

    match head.as_str() {
        "exit" | "quit" => Command::Exit,
        "next" | "new" => Command::NewRound,
        "stats" => Command::Stats,
        "history" | "games" => Command::History,
        "hint" => Command::Hint,
        "clear" => Command::Clear,
        "export" => Command::Export(arg.map(PathBuf::from)),
        "show" => match arg.and_then(|a| a.parse().ok()) {
            Some(id) => Command::Show(id),
            None => Command::Invalid,
        },
        "delete" => match arg.and_then(|a| a.parse().ok()) {
            Some(id) => Command::Delete(id),
            None => Command::Invalid,
        },
        // Anything else is treated as a guess; the engine validates it.
        _ => Command::Guess(trimmed.to_string()),
    }
}

/// Interactive session: reads commands line by line, drives the engine, and
/// hands every finished game to the store.
///
/// `player_name` may be blank, in which case the player is asked once and
/// [`DEFAULT_PLAYER_NAME`] fills in for an empty answer. `fixed_secret`
/// pins the secret for every round of the session (scripted play).
pub fn session_loop<R: BufRead>(
    engine: &mut GameEngine,
    store: &mut GameStore,
    mut reader: R,
    player_name: &str,
    fixed_secret: Option<u32>,
) {
    let name = resolve_player_name(player_name, &mut reader);
    if store.mode() == StoreMode::Degraded {
        println!("Warning: the game archive is unavailable. Finished games will not be saved.");
    }
    start_round(engine, &name, fixed_secret);

    loop {
        print_prompt(engine);
        let Some(line) = read_line(&mut reader) else {
            break;
        };

        match parse_command(&line) {
            Command::Exit => {
                println!("Goodbye!");
                break;
            }
            Command::Guess(raw) => handle_guess(engine, store, &raw),
            Command::NewRound => start_round(engine, &name, fixed_secret),
            Command::Stats => display_stats(&store.compute_stats()),
            Command::History => display_history(store),
            Command::Show(id) => match store.get_game(id) {
                Ok(record) => display_record(record),
                Err(err) => println!("{err}."),
            },
            Command::Delete(id) => match store.delete_game(id) {
                Ok(true) => println!("Deleted game #{id}."),
                Ok(false) => println!("No game with id {id}."),
                Err(err) => println!("Could not delete the game: {err}."),
            },
            Command::Clear => match store.clear_all() {
                Ok(()) => println!("All recorded games removed."),
                Err(err) => println!("Could not clear the archive: {err}."),
            },
            Command::Export(path) => handle_export(store, path),
            Command::Hint => match engine.hint() {
                Some(secret) => println!("(debug) The secret number is {secret}."),
                None => println!("No game in progress."),
            },
            Command::Invalid => display_help(),
        }
    }
}

fn resolve_player_name<R: BufRead>(configured: &str, reader: &mut R) -> String {
    let configured = configured.trim();
    if !configured.is_empty() {
        return configured.to_string();
    }

    println!("Enter your name (leave blank to play as {DEFAULT_PLAYER_NAME}):");
    match read_line(reader) {
        Some(line) if !line.trim().is_empty() => line.trim().to_string(),
        _ => DEFAULT_PLAYER_NAME.to_string(),
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input),
    }
}

fn start_round(engine: &mut GameEngine, name: &str, fixed_secret: Option<u32>) {
    let started = match fixed_secret {
        Some(secret) => engine.start_game_with_secret(name, secret),
        None => engine.start_new_game(name),
    };
    match started {
        Ok(summary) => println!(
            "New game for {}. Guess the number between {SECRET_MIN} and {SECRET_MAX}. \
             You have {} attempts.",
            summary.player_name, summary.max_attempts
        ),
        Err(err) => println!("Could not start a game: {err}."),
    }
}

fn print_prompt(engine: &GameEngine) {
    match engine.current_game() {
        Some(game) if game.outcome() == GameOutcome::InProgress => {
            println!(
                "\nAttempt {} of {}. Enter your guess ({SECRET_MIN}-{SECRET_MAX}), or a command:",
                game.attempts().len() + 1,
                game.max_attempts()
            );
        }
        _ => println!("\nType 'next' for a new game, or a command ('stats', 'history', 'exit'):"),
    }
}

fn handle_guess(engine: &mut GameEngine, store: &mut GameStore, raw: &str) {
    match engine.submit_guess(raw) {
        Ok(result) => {
            match result.outcome {
                GameOutcome::InProgress => match result.attempt.outcome {
                    GuessOutcome::TooLow => println!("Too low! The secret number is higher."),
                    GuessOutcome::TooHigh => println!("Too high! The secret number is lower."),
                    GuessOutcome::Correct => {}
                },
                GameOutcome::Won => println!(
                    "Correct! You guessed the number in {} attempt(s).",
                    result.attempt.sequence_number
                ),
                GameOutcome::Lost => {
                    if let Some(secret) = result.secret_value {
                        println!("Out of attempts! The secret number was {secret}.");
                    }
                }
            }
            if result.is_terminal() {
                record_finished(engine, store);
            }
        }
        Err(err) => println!("{err}."),
    }
}

fn record_finished(engine: &mut GameEngine, store: &mut GameStore) {
    let Some(game) = engine.take_finished() else {
        return;
    };
    match store.record_game(game) {
        Ok(id) => println!("Saved as game #{id}. Type 'next' to play again."),
        Err(err) => {
            // The round itself is over either way; only persistence failed.
            warn!("failed to record finished game: {err}");
            println!("The game could not be saved: {err}.");
        }
    }
}

fn handle_export(store: &GameStore, path: Option<PathBuf>) {
    let path = path.unwrap_or_else(default_export_path);
    match store.export_to_file(&path) {
        Ok(()) => println!("Exported {} game(s) to {}.", store.len(), path.display()),
        Err(err) => println!("Export failed: {err}."),
    }
}

fn default_export_path() -> PathBuf {
    PathBuf::from(format!(
        "guess-number-games-{}.json",
        Utc::now().format("%Y-%m-%d")
    ))
}

fn display_stats(snapshot: &StatsSnapshot) {
    let overall = &snapshot.overall;
    println!("Games played: {}", overall.total_games);
    println!(
        "Wins: {} | Losses: {}",
        overall.total_wins, overall.total_losses
    );
    println!("Win rate: {}", overall.win_rate_display());
    println!("Best score: {}", overall.best_score_display());
    println!("Average attempts: {:.1}", overall.avg_attempts);

    if !snapshot.players.is_empty() {
        println!("Per player:");
        for (name, totals) in &snapshot.players {
            println!(
                "  {name}: {} game(s), {} win(s), win rate {}, best score {}",
                totals.total_games,
                totals.total_wins,
                totals.win_rate_display(),
                totals.best_score_display()
            );
        }
    }
}

fn display_history(store: &GameStore) {
    let games = store.list_games();
    if games.is_empty() {
        println!("No games recorded yet.");
        return;
    }

    println!("Recorded games ({}):", games.len());
    for game in games {
        println!(
            "  #{} {} {} in {} attempt(s) on {}",
            game.id,
            game.player_name,
            game.outcome,
            game.total_attempts,
            game.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn display_record(record: &GameRecord) {
    println!(
        "Game #{} by {}: {} ({} of {} attempts used)",
        record.id, record.player_name, record.outcome, record.total_attempts, record.max_attempts
    );
    println!("Secret number: {}", record.secret_value);
    for attempt in &record.attempts {
        println!(
            "  {}. guessed {} ({})",
            attempt.sequence_number, attempt.guessed_value, attempt.outcome
        );
    }
}

fn display_help() {
    println!(
        "Enter a number to guess, or a command: next, stats, history, show <id>, \
         delete <id>, clear, export [path], hint, exit."
    );
}
