use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashMap;
use strum::IntoEnumIterator;

use super::{Game, PuzzleNumber};

/// A known (date, puzzle number) pair that pins a game's daily sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub date: NaiveDate,
    pub number: PuzzleNumber,
}

impl Anchor {
    pub fn new(date: NaiveDate, number: PuzzleNumber) -> Self {
        Self { date, number }
    }
}

/// Maps calendar dates to puzzle numbers, one puzzle per day per game.
///
/// Anchors are fixed at construction; every lookup is pure arithmetic
/// against them, so the calendar can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct PuzzleCalendar {
    anchors: HashMap<Game, Anchor>,
}

impl Default for PuzzleCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleCalendar {
    /// Calendar using each game's production anchor
    pub fn new() -> Self {
        Self {
            anchors: Game::iter().map(|g| (g, g.default_anchor())).collect(),
        }
    }

    pub fn with_anchor(mut self, game: Game, anchor: Anchor) -> Self {
        self.anchors.insert(game, anchor);
        self
    }

    pub fn anchor(&self, game: Game) -> Anchor {
        self.anchors
            .get(&game)
            .copied()
            .unwrap_or_else(|| game.default_anchor())
    }

    pub fn puzzle_number_for_date(&self, game: Game, date: NaiveDate) -> PuzzleNumber {
        let anchor = self.anchor(game);
        anchor.number + (date - anchor.date).num_days()
    }

    pub fn date_for_puzzle_number(&self, game: Game, number: PuzzleNumber) -> NaiveDate {
        let anchor = self.anchor(game);
        anchor.date + Duration::days(number - anchor.number)
    }

    /// The seven puzzle numbers of the week starting on `sunday`.
    ///
    /// Returns an empty list when `sunday` is not a Sunday.
    pub fn puzzle_numbers_for_week(&self, game: Game, sunday: NaiveDate) -> Vec<PuzzleNumber> {
        if sunday.weekday() != Weekday::Sun {
            return Vec::new();
        }

        let first = self.puzzle_number_for_date(game, sunday);
        (first..first + 7).collect()
    }
}

/// The Sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}
