use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::puzzle::{Game, PlayerId, PuzzleNumber};

/// Request payload for a raw chat message
#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    pub player: PlayerId,
    #[serde(default)]
    pub display_name: Option<String>,
    pub text: String,
    /// Defaults to the time the request is handled
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Request payload for a submission whose game is already known
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub player: PlayerId,
    #[serde(default)]
    pub display_name: Option<String>,
    pub title_lines: Vec<String>,
    pub body_lines: Vec<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MissingParams {
    pub puzzle: Option<String>,
}

/// Comma-separated puzzle numbers, each `123` or `#123`
#[derive(Debug, Deserialize)]
pub struct DetailParams {
    pub puzzles: String,
}

/// Comma-separated player ids; empty means every player
#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    #[serde(default)]
    pub players: String,
}

#[derive(Debug, Serialize)]
pub struct PlayerEntriesResponse {
    pub game: Game,
    pub player: PlayerId,
    pub puzzle_numbers: Vec<PuzzleNumber>,
}

#[derive(Debug, Serialize)]
pub struct RemoveEntryResponse {
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetGameResponse {
    pub game: Game,
    pub removed: u64,
}

/// Splits a comma-separated query value, dropping blank items
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
