// ============================================================================
// Share Text Builders
// ============================================================================

/// Builds a Wordle share block
pub struct WordleShare {
    title_number: String,
    attempts: Option<u8>,
    rows: Vec<String>,
}

impl WordleShare {
    pub fn new(puzzle_number: i64) -> Self {
        Self {
            title_number: puzzle_number.to_string(),
            attempts: Some(4),
            rows: Vec::new(),
        }
    }

    /// Uses the share format's thousands separator, e.g. `1,234`
    pub fn grouped(mut self, title_number: &str) -> Self {
        self.title_number = title_number.to_string();
        self
    }

    pub fn solved_in(mut self, attempts: u8) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn failed(mut self) -> Self {
        self.attempts = None;
        self
    }

    pub fn with_rows(mut self, rows: &[&str]) -> Self {
        self.rows = rows.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn text(&self) -> String {
        let result = match self.attempts {
            Some(n) => format!("{n}/6"),
            None => "X/6".to_string(),
        };
        let rows = if self.rows.is_empty() {
            let guesses = self.attempts.unwrap_or(6) as usize;
            let mut rows = vec!["⬜🟨⬜⬜⬜".to_string(); guesses.saturating_sub(1)];
            rows.push(match self.attempts {
                Some(_) => "🟩🟩🟩🟩🟩".to_string(),
                None => "⬜🟨⬜⬜⬜".to_string(),
            });
            rows
        } else {
            self.rows.clone()
        };
        format!("Wordle {} {result}\n\n{}", self.title_number, rows.join("\n"))
    }
}

/// Builds a Connections share block
pub struct ConnectionsShare {
    puzzle_number: i64,
    mistakes: usize,
    solved: bool,
}

impl ConnectionsShare {
    pub fn new(puzzle_number: i64) -> Self {
        Self {
            puzzle_number,
            mistakes: 0,
            solved: true,
        }
    }

    pub fn with_mistakes(mut self, mistakes: usize) -> Self {
        self.mistakes = mistakes;
        self
    }

    pub fn unsolved(mut self) -> Self {
        self.solved = false;
        self
    }

    pub fn text(&self) -> String {
        let mut rows = vec!["🟨🟩🟨🟨"; self.mistakes];
        if self.solved {
            rows.extend(["🟨🟨🟨🟨", "🟩🟩🟩🟩", "🟦🟦🟦🟦", "🟪🟪🟪🟪"]);
        } else {
            rows.extend(["🟨🟨🟨🟨", "🟦🟪🟦🟦"]);
        }
        format!(
            "Connections\nPuzzle #{}\n{}",
            self.puzzle_number,
            rows.join("\n")
        )
    }
}

/// Builds a Strands share block from its glyph rows
pub struct StrandsShare {
    puzzle_number: i64,
    rows: Vec<String>,
}

impl StrandsShare {
    pub fn new(puzzle_number: i64, rows: &[&str]) -> Self {
        Self {
            puzzle_number,
            rows: rows.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn text(&self) -> String {
        format!(
            "Strands #{}\n“Out of this world”\n{}",
            self.puzzle_number,
            self.rows.join("\n")
        )
    }
}
