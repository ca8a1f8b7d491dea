use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::puzzle::{EntryMetrics, Game, PlayerId, PuzzleNumber};

/// One player's stored result for one puzzle.
///
/// Keyed by `(game, player, puzzle_number)`; a resubmission replaces every
/// other field in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub game: Game,
    pub player: PlayerId,
    pub puzzle_number: PuzzleNumber,
    pub raw_text: String,
    pub score: f64,
    pub metrics: EntryMetrics,
    pub submitted_at: DateTime<Utc>,
}

impl Entry {
    pub fn key(&self) -> EntryKey {
        (self.game, self.player.clone(), self.puzzle_number)
    }
}

pub type EntryKey = (Game, PlayerId, PuzzleNumber);
