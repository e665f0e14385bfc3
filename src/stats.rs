use crate::engine::GameOutcome;
use crate::store::GameRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated results over a set of games. The same shape is used for the
/// whole collection and for each player's slice of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsTotals {
    pub total_games: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    /// Win percentage, rounded to one decimal.
    pub win_rate: f64,
    /// Minimum attempts among won games. `None` when there are no wins;
    /// zero is reserved for "zero attempts", which cannot occur, so it is
    /// never used as a sentinel.
    pub best_score: Option<u32>,
    /// Mean attempts per game, rounded to one decimal.
    pub avg_attempts: f64,
}

impl StatsTotals {
    /// Win rate as the UI shows it, e.g. "62.5%". "0.0%" for an empty set.
    #[must_use]
    pub fn win_rate_display(&self) -> String {
        format!("{:.1}%", self.win_rate)
    }

    /// Best score as the UI shows it: the attempt count, or "no wins yet".
    #[must_use]
    pub fn best_score_display(&self) -> String {
        match self.best_score {
            Some(score) => score.to_string(),
            None => "no wins yet".to_string(),
        }
    }
}

/// Derived view over the stored games. Always recomputed from the full
/// collection, never cached or incrementally maintained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub overall: StatsTotals,
    pub players: BTreeMap<String, StatsTotals>,
}

/// Scans the full record collection and derives the snapshot.
#[must_use]
pub fn compute_stats(records: &[GameRecord]) -> StatsSnapshot {
    let mut by_player: BTreeMap<&str, Vec<&GameRecord>> = BTreeMap::new();
    for record in records {
        by_player
            .entry(record.player_name.as_str())
            .or_default()
            .push(record);
    }

    let players = by_player
        .into_iter()
        .map(|(name, games)| (name.to_string(), totals_for(games.into_iter())))
        .collect();

    StatsSnapshot {
        overall: totals_for(records.iter()),
        players,
    }
}

fn totals_for<'a>(records: impl Iterator<Item = &'a GameRecord>) -> StatsTotals {
    let mut total_games = 0u32;
    let mut total_wins = 0u32;
    let mut best_score: Option<u32> = None;
    let mut attempt_sum = 0u64;

    for record in records {
        total_games += 1;
        attempt_sum += u64::from(record.total_attempts);
        if record.outcome == GameOutcome::Won {
            total_wins += 1;
            best_score = Some(match best_score {
                Some(best) => best.min(record.total_attempts),
                None => record.total_attempts,
            });
        }
    }

    let (win_rate, avg_attempts) = if total_games == 0 {
        (0.0, 0.0)
    } else {
        (
            round_one_decimal(f64::from(total_wins) / f64::from(total_games) * 100.0),
            round_one_decimal(attempt_sum as f64 / f64::from(total_games)),
        )
    };

    StatsTotals {
        total_games,
        total_wins,
        total_losses: total_games - total_wins,
        win_rate,
        best_score,
        avg_attempts,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
