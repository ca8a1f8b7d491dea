use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeSet;

use super::{QueryClass, QueryRange, TrackerError};
use crate::puzzle::{calendar::week_start, Game, PuzzleCalendar, PuzzleNumber};

const TEN_DAY_WINDOW: i64 = 10;

/// A leaderboard query token after lexical interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryToken {
    AllTime,
    ThisWeek,
    TenDay,
    Today,
    Puzzle(PuzzleNumber),
    WeekOf(NaiveDate),
}

impl QueryToken {
    /// Interprets a user-supplied token; `today` supplies the year for `M/D` dates
    pub fn parse(raw: &str, today: NaiveDate) -> Result<Self, TrackerError> {
        let token = raw.trim().to_lowercase();

        match token.as_str() {
            "" | "all-time" | "alltime" => return Ok(QueryToken::AllTime),
            "week" | "weekly" => return Ok(QueryToken::ThisWeek),
            "10day" | "10-day" => return Ok(QueryToken::TenDay),
            "today" => return Ok(QueryToken::Today),
            _ => {}
        }

        if let Some(number) = parse_puzzle_token(&token) {
            return Ok(QueryToken::Puzzle(number));
        }

        if let Some(parts) = date_parts(&token) {
            return parse_date(&parts, today).map(QueryToken::WeekOf);
        }

        Err(TrackerError::invalid_query(format!(
            "unrecognized token '{}'",
            raw.trim()
        )))
    }

    /// All-time queries need the game's recorded puzzle numbers to resolve
    pub fn needs_recorded_puzzles(&self) -> bool {
        matches!(self, QueryToken::AllTime)
    }

    pub fn resolve(
        self,
        game: Game,
        calendar: &PuzzleCalendar,
        today: NaiveDate,
        recorded: &BTreeSet<PuzzleNumber>,
    ) -> Result<QueryRange, TrackerError> {
        let todays_number = calendar.puzzle_number_for_date(game, today);

        let range = match self {
            QueryToken::AllTime => QueryRange {
                puzzle_numbers: recorded.clone(),
                label: "All-time".to_string(),
                class: QueryClass::AllTime,
            },
            QueryToken::ThisWeek => QueryRange {
                puzzle_numbers: week_so_far(calendar, game, week_start(today), todays_number),
                label: "This Week (so far)".to_string(),
                class: QueryClass::Multi,
            },
            QueryToken::TenDay => {
                let first =
                    calendar.puzzle_number_for_date(game, today - Duration::days(TEN_DAY_WINDOW));
                QueryRange {
                    puzzle_numbers: (first..first + TEN_DAY_WINDOW).collect(),
                    label: "Last 10 Days".to_string(),
                    class: QueryClass::Multi,
                }
            }
            QueryToken::Today => single(todays_number),
            QueryToken::Puzzle(number) => single(number),
            QueryToken::WeekOf(date) => {
                if date.weekday() != Weekday::Sun {
                    return Err(TrackerError::invalid_query(format!(
                        "{} is not a Sunday",
                        date.format("%m/%d/%Y")
                    )));
                }
                QueryRange {
                    puzzle_numbers: week_so_far(calendar, game, date, todays_number),
                    label: format!("Week of {}", date.format("%m/%d/%Y")),
                    class: QueryClass::Multi,
                }
            }
        };

        Ok(range)
    }
}

fn single(number: PuzzleNumber) -> QueryRange {
    QueryRange {
        puzzle_numbers: BTreeSet::from([number]),
        label: format!("Puzzle #{number}"),
        class: QueryClass::Single,
    }
}

// Weeks still in progress are cut off at today's puzzle
fn week_so_far(
    calendar: &PuzzleCalendar,
    game: Game,
    sunday: NaiveDate,
    todays_number: PuzzleNumber,
) -> BTreeSet<PuzzleNumber> {
    calendar
        .puzzle_numbers_for_week(game, sunday)
        .into_iter()
        .filter(|number| *number <= todays_number)
        .collect()
}

/// `#123` or `123`
pub fn parse_puzzle_token(raw: &str) -> Option<PuzzleNumber> {
    let digits = raw.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// `M/D`, `M/D/YY` or `M/D/YYYY`, split into its numeric fields
fn date_parts(token: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = token.split('/').collect();
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    let shape_ok = match parts.as_slice() {
        [m, d] => (1..=2).contains(&m.len()) && (1..=2).contains(&d.len()),
        [m, d, y] => {
            (1..=2).contains(&m.len())
                && (1..=2).contains(&d.len())
                && (y.len() == 2 || y.len() == 4)
        }
        _ => false,
    };

    (shape_ok && parts.iter().all(|p| all_digits(*p))).then_some(parts)
}

fn parse_date(parts: &[&str], today: NaiveDate) -> Result<NaiveDate, TrackerError> {
    let invalid = || TrackerError::invalid_query(format!("invalid date '{}'", parts.join("/")));
    let number = |s: &str| s.parse::<u32>().map_err(|_| invalid());

    let month = number(parts[0])?;
    let day = number(parts[1])?;
    let year = match parts.get(2) {
        None => today.year(),
        Some(y) if y.len() == 2 => expand_two_digit_year(number(*y)? as i32),
        Some(y) => number(*y)? as i32,
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// POSIX `%y` windowing: 69-99 → 1900s, 00-68 → 2000s
fn expand_two_digit_year(year: i32) -> i32 {
    if year >= 69 {
        1900 + year
    } else {
        2000 + year
    }
}
