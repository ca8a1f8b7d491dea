use serde::{Deserialize, Serialize};

use super::{Game, ParsedSubmission, RawFields};

/// Wordle score for an `X/6` result; one worse than the last allowed guess
pub const WORDLE_FAILED: f64 = 7.0;
/// Connections score when the grid never finishes on a solved row
pub const CONNECTIONS_FAILED: f64 = 8.0;
/// Strands rating substituted for a puzzle the player never submitted.
///
/// Equal to four hints. Ratings are unbounded above (every hint adds a
/// penalty), so a game worse than 2.0 still ranks below a skipped one.
pub const STRANDS_MISSED_RATING: f64 = 2.0;

/// Shared unit for both Strands penalties
pub const STRANDS_PENALTY_UNIT: f64 = 0.25;

/// Last Strands hint-count bucket; seven or more hints land in it
pub const STRANDS_MAX_HINT_BUCKET: u32 = 7;

/// Per-entry values kept alongside the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum EntryMetrics {
    Connections,
    Strands {
        hints: u32,
        spangram_index: u32,
        theme_words: u32,
    },
    Wordle {
        green: u32,
        yellow: u32,
        other: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSubmission {
    /// Lower is better in every game
    pub score: f64,
    pub metrics: EntryMetrics,
}

pub fn score_submission(parsed: &ParsedSubmission) -> ScoredSubmission {
    match parsed.fields {
        RawFields::Connections { rows, solved } => ScoredSubmission {
            score: if solved {
                rows as f64
            } else {
                CONNECTIONS_FAILED
            },
            metrics: EntryMetrics::Connections,
        },
        RawFields::Strands {
            hints,
            spangram_index,
            theme_words,
        } => ScoredSubmission {
            score: strands_rating(hints, spangram_index, theme_words),
            metrics: EntryMetrics::Strands {
                hints,
                spangram_index,
                theme_words,
            },
        },
        RawFields::Wordle {
            attempts,
            green,
            yellow,
            other,
        } => ScoredSubmission {
            score: attempts.map(f64::from).unwrap_or(WORDLE_FAILED),
            metrics: EntryMetrics::Wordle {
                green,
                yellow,
                other,
            },
        },
    }
}

/// `1.0 + spangram penalty + hint penalty`; an early spangram and no hints
/// give the best possible rating of 1.0
pub fn strands_rating(hints: u32, spangram_index: u32, theme_words: u32) -> f64 {
    let hint_penalty = hints as f64 * STRANDS_PENALTY_UNIT;
    let spangram_penalty = if theme_words > 0 {
        (spangram_index as f64 - 1.0) / theme_words as f64 * STRANDS_PENALTY_UNIT
    } else {
        0.0
    };
    1.0 + spangram_penalty + hint_penalty
}

/// Histogram bucket label for an integer-scored game ("3", "X"); Strands
/// ratings are continuous and have no score buckets
pub fn score_bucket(game: Game, score: f64) -> Option<String> {
    match game {
        Game::Strands => None,
        _ if score >= game.sentinel_score() => Some("X".to_string()),
        _ => Some(format!("{}", score.round() as i64)),
    }
}

/// Distribution bucket for one entry: the score bucket for Wordle and
/// Connections, the hint count for Strands (capped at the last bucket)
pub fn distribution_bucket(game: Game, score: f64, metrics: &EntryMetrics) -> Option<String> {
    match metrics {
        EntryMetrics::Strands { hints, .. } => {
            Some((*hints).min(STRANDS_MAX_HINT_BUCKET).to_string())
        }
        _ => score_bucket(game, score),
    }
}

/// Every distribution bucket label in display order
pub fn distribution_buckets(game: Game) -> Vec<String> {
    match game {
        Game::Connections => integer_buckets(4..=7),
        Game::Wordle => integer_buckets(1..=6),
        Game::Strands => (0..=STRANDS_MAX_HINT_BUCKET).map(|h| h.to_string()).collect(),
    }
}

fn integer_buckets(range: std::ops::RangeInclusive<i64>) -> Vec<String> {
    range
        .map(|s| s.to_string())
        .chain(std::iter::once("X".to_string()))
        .collect()
}
