use guess_number::cli::parse_cli;
use guess_number::engine::GameEngine;
use guess_number::session::session_loop;
use guess_number::store::{GameStore, JsonFileStorage};
use std::io;
use std::path::PathBuf;

fn main() {
    env_logger::init();
    let cli = parse_cli();

    let mut store = if cli.memory {
        GameStore::in_memory()
    } else {
        let path = cli
            .data_path
            .clone()
            .or_else(JsonFileStorage::default_data_path)
            .unwrap_or_else(|| PathBuf::from("games.json"));
        GameStore::open_or_degrade(JsonFileStorage::new(path))
    };

    let mut engine = GameEngine::with_max_attempts(cli.max_attempts);
    let stdin = io::stdin();
    session_loop(
        &mut engine,
        &mut store,
        stdin.lock(),
        cli.player.as_deref().unwrap_or(""),
        cli.secret,
    );
}
