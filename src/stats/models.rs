use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::entry::{Entry, Upsert};
use crate::puzzle::{Game, PlayerId, PuzzleNumber};

/// A share result already split into title and body lines
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub game: Game,
    pub player: PlayerId,
    /// Refreshes the player's display name when present
    pub display_name: Option<String>,
    pub title_lines: Vec<String>,
    pub body_lines: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub accepted: bool,
    /// None when the text matched no game at all
    pub game: Option<Game>,
    pub puzzle_number: Option<PuzzleNumber>,
    pub score: Option<f64>,
    pub upsert: Option<Upsert>,
}

impl IngestOutcome {
    pub fn rejected(game: Option<Game>) -> Self {
        Self {
            accepted: false,
            game,
            puzzle_number: None,
            score: None,
            upsert: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryClass {
    Single,
    Multi,
    AllTime,
}

/// Concrete puzzle numbers a query token stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRange {
    pub puzzle_numbers: BTreeSet<PuzzleNumber>,
    pub label: String,
    pub class: QueryClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum SecondaryAverages {
    Connections,
    Strands {
        avg_hints: f64,
        avg_spangram_index: f64,
    },
    Wordle {
        avg_green: f64,
        avg_yellow: f64,
        avg_other: f64,
    },
}

impl SecondaryAverages {
    fn values(&self) -> Vec<f64> {
        match self {
            SecondaryAverages::Connections => Vec::new(),
            SecondaryAverages::Strands {
                avg_hints,
                avg_spangram_index,
            } => vec![*avg_hints, *avg_spangram_index],
            SecondaryAverages::Wordle {
                avg_green,
                avg_yellow,
                avg_other,
            } => vec![*avg_green, *avg_yellow, *avg_other],
        }
    }
}

/// One player's statistics over one puzzle-number set; computed per query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatSnapshot {
    pub game: Game,
    pub player: PlayerId,
    /// Size of the puzzle-number set the snapshot covers
    pub puzzle_count: usize,
    pub played: usize,
    pub missed: usize,
    pub raw_mean: f64,
    pub adjusted_mean: f64,
    pub secondary: SecondaryAverages,
}

impl PlayerStatSnapshot {
    /// Every metric in display order; equal tuples share a rank
    pub fn metric_tuple(&self) -> Vec<f64> {
        let mut tuple = vec![self.raw_mean, self.adjusted_mean];
        tuple.extend(self.secondary.values());
        tuple
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub player: PlayerId,
    pub display_name: String,
    /// Formatted metric cells, aligned with `Leaderboard::columns`
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub game: Game,
    pub label: String,
    pub class: QueryClass,
    pub columns: Vec<String>,
    pub rows: Vec<LeaderboardRow>,
    /// Players ranked before display truncation
    pub ranked_players: usize,
}

impl Leaderboard {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingReport {
    pub game: Game,
    pub puzzle_number: PuzzleNumber,
    pub missing_players: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryDetail {
    pub puzzle_number: PuzzleNumber,
    pub found: bool,
    pub entry: Option<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub display_name: String,
    pub snapshot: PlayerStatSnapshot,
    /// Score histogram, or hint-count histogram for Strands
    pub distribution: Vec<ScoreBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatsReport {
    pub game: Game,
    pub found: Vec<PlayerStats>,
    pub not_found: Vec<PlayerId>,
}
