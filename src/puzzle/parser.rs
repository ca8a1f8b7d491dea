use thiserror::Error;

use super::{Game, PuzzleNumber};

const WORDLE_CORRECT: char = '🟩';
const WORDLE_PRESENT: char = '🟨';
const WORDLE_ABSENT: [char; 2] = ['⬜', '⬛'];
const WORDLE_CELEBRATION: &str = "🎉";
const WORDLE_MAX_ATTEMPTS: u8 = 6;

const CONNECTIONS_GROUPS: usize = 4;

const STRANDS_HINT: char = '💡';
const STRANDS_SPANGRAM: char = '🟡';
const STRANDS_THEME_WORD: char = '🔵';

/// A message whose title does not follow the game's share format.
///
/// Hosts are expected to drop these quietly; ordinary chat lines end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a {game} submission: {reason}")]
pub struct MalformedSubmission {
    pub game: Game,
    pub reason: String,
}

impl MalformedSubmission {
    fn new(game: Game, reason: impl Into<String>) -> Self {
        Self {
            game,
            reason: reason.into(),
        }
    }
}

/// Game-specific values read straight off a share message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFields {
    Connections {
        /// Non-blank grid rows, one per guess
        rows: usize,
        /// Final row is a single repeated glyph
        solved: bool,
    },
    Strands {
        hints: u32,
        /// 1-based position of the spangram glyph in the compacted body,
        /// or one past the end when absent
        spangram_index: u32,
        theme_words: u32,
    },
    Wordle {
        /// `None` when the result token is `X`
        attempts: Option<u8>,
        green: u32,
        yellow: u32,
        other: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSubmission {
    pub game: Game,
    pub puzzle_number: PuzzleNumber,
    pub fields: RawFields,
    /// Title and body joined back together as submitted
    pub raw_text: String,
}

/// A chat message recognised as a share result, split into title and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSubmission {
    pub game: Game,
    pub title_lines: Vec<String>,
    pub body_lines: Vec<String>,
}

/// Picks the game a raw message claims to be and splits off its title.
///
/// Messages shorter than three lines are never share results.
pub fn detect_submission(text: &str) -> Option<DetectedSubmission> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 3 {
        return None;
    }

    let first_line = lines[0].trim();
    let game = [Game::Connections, Game::Strands, Game::Wordle]
        .into_iter()
        .find(|game| first_line.contains(game.title()))?;

    let split = game.title_line_count();
    Some(DetectedSubmission {
        game,
        title_lines: lines[..split].iter().map(|l| l.to_string()).collect(),
        body_lines: lines[split..].iter().map(|l| l.to_string()).collect(),
    })
}

/// Parses one game's share text into its puzzle number and raw fields
pub fn parse_submission<T: AsRef<str>, B: AsRef<str>>(
    game: Game,
    title_lines: &[T],
    body_lines: &[B],
) -> Result<ParsedSubmission, MalformedSubmission> {
    let title: Vec<&str> = title_lines.iter().map(|l| l.as_ref()).collect();
    let body: Vec<&str> = body_lines.iter().map(|l| l.as_ref()).collect();

    let (puzzle_number, fields) = match game {
        Game::Connections => parse_connections(&title, &body)?,
        Game::Strands => parse_strands(&title, &body)?,
        Game::Wordle => parse_wordle(&title, &body)?,
    };

    let raw_text = title
        .iter()
        .chain(body.iter())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ParsedSubmission {
        game,
        puzzle_number,
        fields,
        raw_text,
    })
}

fn parse_wordle(
    title: &[&str],
    body: &[&str],
) -> Result<(PuzzleNumber, RawFields), MalformedSubmission> {
    let malformed = |reason: &str| MalformedSubmission::new(Game::Wordle, reason);

    let line = title.first().map(|l| l.trim()).unwrap_or_default();
    let rest = line
        .strip_prefix("Wordle ")
        .ok_or_else(|| malformed("title must start with 'Wordle '"))?;

    let parts: Vec<&str> = rest.split(' ').collect();
    let (number_token, result_token) = match parts.as_slice() {
        [number, result] => (*number, *result),
        [number, celebration, result] if *celebration == WORDLE_CELEBRATION => (*number, *result),
        _ => return Err(malformed("expected '<number> <result>/<max>'")),
    };

    let puzzle_number =
        parse_grouped_number(number_token).ok_or_else(|| malformed("invalid puzzle number"))?;

    let result: Vec<char> = result_token.chars().collect();
    let attempts = match result.as_slice() {
        ['X', '/', max] if max.is_ascii_digit() => None,
        [digit, '/', max] if digit.is_ascii_digit() && max.is_ascii_digit() => {
            let attempts = digit.to_digit(10).unwrap_or_default() as u8;
            if attempts == 0 || attempts > WORDLE_MAX_ATTEMPTS {
                return Err(malformed("attempt count out of range"));
            }
            Some(attempts)
        }
        _ => return Err(malformed("invalid result token")),
    };

    let mut green = 0;
    let mut yellow = 0;
    let mut other = 0;
    for c in body.iter().flat_map(|l| l.chars()) {
        if c == WORDLE_CORRECT {
            green += 1;
        } else if c == WORDLE_PRESENT {
            yellow += 1;
        } else if WORDLE_ABSENT.contains(&c) {
            other += 1;
        }
    }

    Ok((
        puzzle_number,
        RawFields::Wordle {
            attempts,
            green,
            yellow,
            other,
        },
    ))
}

fn parse_connections(
    title: &[&str],
    body: &[&str],
) -> Result<(PuzzleNumber, RawFields), MalformedSubmission> {
    let malformed = |reason: &str| MalformedSubmission::new(Game::Connections, reason);

    let [header, puzzle_line, ..] = title else {
        return Err(malformed("title needs two lines"));
    };

    if header.trim_end_matches(' ') != "Connections" {
        return Err(malformed("first line must be 'Connections'"));
    }

    let puzzle_number = puzzle_line
        .strip_prefix("Puzzle #")
        .and_then(leading_number)
        .ok_or_else(|| malformed("second line must be 'Puzzle #<number>'"))?;

    let rows: Vec<&str> = body
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    // Four groups means at least four guesses; anything shorter is not a finished grid
    let solved = rows.len() >= CONNECTIONS_GROUPS
        && rows.last().is_some_and(|row| {
            let mut glyphs = row.chars();
            let first = glyphs.next();
            glyphs.all(|c| Some(c) == first)
        });

    Ok((
        puzzle_number,
        RawFields::Connections {
            rows: rows.len(),
            solved,
        },
    ))
}

fn parse_strands(
    title: &[&str],
    body: &[&str],
) -> Result<(PuzzleNumber, RawFields), MalformedSubmission> {
    let malformed = |reason: &str| MalformedSubmission::new(Game::Strands, reason);

    let puzzle_number = title
        .first()
        .and_then(|l| l.strip_prefix("Strands #"))
        .and_then(leading_number)
        .ok_or_else(|| malformed("title must start with 'Strands #<number>'"))?;

    let compacted: Vec<char> = body
        .iter()
        .flat_map(|l| l.chars())
        .filter(|c| !c.is_whitespace())
        .collect();

    let hints = compacted.iter().filter(|c| **c == STRANDS_HINT).count() as u32;
    let theme_words = compacted
        .iter()
        .filter(|c| **c == STRANDS_THEME_WORD)
        .count() as u32;
    let spangram_index = compacted
        .iter()
        .position(|c| *c == STRANDS_SPANGRAM)
        .unwrap_or(compacted.len()) as u32
        + 1;

    Ok((
        puzzle_number,
        RawFields::Strands {
            hints,
            spangram_index,
            theme_words,
        },
    ))
}

/// Digits with optional thousands separators, e.g. `1234` or `1,234`
fn parse_grouped_number(token: &str) -> Option<PuzzleNumber> {
    if token.is_empty() {
        return None;
    }

    if token.contains(',') {
        let groups: Vec<&str> = token.split(',').collect();
        let (head, tail) = groups.split_first()?;
        let head_ok = (1..=3).contains(&head.len()) && head.chars().all(|c| c.is_ascii_digit());
        let tail_ok = tail
            .iter()
            .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()));
        if !head_ok || !tail_ok {
            return None;
        }
        return token.replace(',', "").parse().ok();
    }

    if !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// The digit run (commas allowed) at the start of `text`
fn leading_number(text: &str) -> Option<PuzzleNumber> {
    let run: String = text
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| c.is_ascii_digit())
        .collect();
    if run.is_empty() {
        return None;
    }
    run.parse().ok()
}
