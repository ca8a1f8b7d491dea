use chrono::{DateTime, Utc};
use futures::future::{join_all, try_join_all};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    aggregator::{aggregate, score_distribution},
    query::{parse_puzzle_token, QueryToken},
    ranker::build_leaderboard,
    EntryDetail, IngestOutcome, IngestRequest, Leaderboard, MissingReport, PlayerStats,
    PlayerStatsReport, TrackerError,
};
use crate::entry::{Entry, EntryRepository};
use crate::puzzle::{
    detect_submission, parse_submission, score_submission, Clock, Game, PlayerId, PuzzleCalendar,
    PuzzleNumber, SystemClock,
};
use crate::user::{InMemoryPlayerDirectory, PlayerDirectory};

/// The tracker's command surface.
///
/// Holds no mutable state of its own: entries live in the repository and
/// display names in the directory, so one instance is shared across requests.
pub struct TrackerService {
    repository: Arc<dyn EntryRepository>,
    directory: Arc<dyn PlayerDirectory>,
    calendar: PuzzleCalendar,
    clock: Arc<dyn Clock>,
}

impl TrackerService {
    pub fn builder(repository: Arc<dyn EntryRepository>) -> TrackerServiceBuilder {
        TrackerServiceBuilder::new(repository)
    }

    pub fn todays_puzzle_number(&self, game: Game) -> PuzzleNumber {
        self.calendar.puzzle_number_for_date(game, self.clock.today())
    }

    /// Parses, scores and stores one submission.
    ///
    /// Malformed text is not an error: the outcome is simply not accepted.
    #[instrument(skip(self, request), fields(game = %request.game, player = %request.player))]
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestOutcome, TrackerError> {
        let game = request.game;
        let parsed = match parse_submission(game, &request.title_lines, &request.body_lines) {
            Ok(parsed) => parsed,
            Err(reason) => {
                debug!(%reason, "Ignoring malformed submission");
                return Ok(IngestOutcome::rejected(Some(game)));
            }
        };

        let scored = score_submission(&parsed);
        let entry = Entry {
            game,
            player: request.player.clone(),
            puzzle_number: parsed.puzzle_number,
            raw_text: parsed.raw_text,
            score: scored.score,
            metrics: scored.metrics,
            submitted_at: request.submitted_at,
        };

        let upsert = self.repository.add_or_update_entry(&entry).await?;

        if let Some(display_name) = request.display_name.as_deref() {
            self.directory
                .register_player(&request.player, display_name)
                .await;
        }

        info!(
            puzzle_number = entry.puzzle_number,
            score = entry.score,
            ?upsert,
            "Recorded submission"
        );

        Ok(IngestOutcome {
            accepted: true,
            game: Some(game),
            puzzle_number: Some(entry.puzzle_number),
            score: Some(entry.score),
            upsert: Some(upsert),
        })
    }

    /// Detects which game a raw chat message belongs to, then ingests it
    #[instrument(skip(self, text))]
    pub async fn ingest_message(
        &self,
        player: &str,
        display_name: Option<&str>,
        text: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<IngestOutcome, TrackerError> {
        let Some(detected) = detect_submission(text) else {
            debug!("Message is not a share result");
            return Ok(IngestOutcome::rejected(None));
        };

        self.ingest(IngestRequest {
            game: detected.game,
            player: player.to_string(),
            display_name: display_name.map(str::to_string),
            title_lines: detected.title_lines,
            body_lines: detected.body_lines,
            submitted_at,
        })
        .await
    }

    /// Leaderboard for the puzzle numbers a query token resolves to
    #[instrument(skip(self))]
    pub async fn rank(&self, game: Game, token: &str) -> Result<Leaderboard, TrackerError> {
        let today = self.clock.today();
        let query = QueryToken::parse(token, today)?;

        let recorded = if query.needs_recorded_puzzles() {
            self.repository.all_puzzle_numbers(game).await?
        } else {
            BTreeSet::new()
        };
        let range = query.resolve(game, &self.calendar, today, &recorded)?;
        debug!(
            label = %range.label,
            puzzles = range.puzzle_numbers.len(),
            "Resolved query range"
        );

        let players = self.repository.all_players(game).await?;
        let snapshots = try_join_all(players.iter().map(|player| {
            let puzzle_numbers = &range.puzzle_numbers;
            async move {
                let entries = self
                    .repository
                    .entries_for_player(game, player, Some(puzzle_numbers))
                    .await?;
                Ok::<_, TrackerError>(aggregate(game, player, puzzle_numbers, &entries))
            }
        }))
        .await?;

        let display_names = self.display_names(&players).await;
        let leaderboard = build_leaderboard(game, &range, snapshots, &display_names);

        info!(
            label = %leaderboard.label,
            ranked_players = leaderboard.ranked_players,
            "Built leaderboard"
        );
        Ok(leaderboard)
    }

    /// Players on the game's roster without an entry for one puzzle.
    ///
    /// An empty or absent token means today's puzzle.
    #[instrument(skip(self))]
    pub async fn missing(
        &self,
        game: Game,
        token: Option<&str>,
    ) -> Result<MissingReport, TrackerError> {
        let token = token.map(str::trim).unwrap_or_default();
        let puzzle_number = if token.is_empty() {
            self.todays_puzzle_number(game)
        } else {
            parse_puzzle_token(token).ok_or_else(|| {
                TrackerError::invalid_query(format!("'{token}' is not a puzzle number"))
            })?
        };

        let roster = self.repository.all_players(game).await?;
        let submitted = self
            .repository
            .players_for_puzzle_number(game, puzzle_number)
            .await?;
        let missing_players: Vec<PlayerId> = roster.difference(&submitted).cloned().collect();

        debug!(
            puzzle_number,
            missing = missing_players.len(),
            "Computed missing players"
        );
        Ok(MissingReport {
            game,
            puzzle_number,
            missing_players,
        })
    }

    #[instrument(skip(self))]
    pub async fn player_entries(
        &self,
        game: Game,
        player: &str,
    ) -> Result<Vec<PuzzleNumber>, TrackerError> {
        let numbers = self.repository.puzzle_numbers_for_player(game, player).await?;
        if numbers.is_empty() {
            return Err(TrackerError::not_found(format!(
                "no {game} entries for {player}"
            )));
        }
        Ok(numbers.into_iter().collect())
    }

    /// Stored entries for the requested puzzles, in puzzle order, marking gaps
    #[instrument(skip(self))]
    pub async fn entry_detail(
        &self,
        game: Game,
        player: &str,
        puzzle_numbers: &[PuzzleNumber],
    ) -> Result<Vec<EntryDetail>, TrackerError> {
        let requested: BTreeSet<PuzzleNumber> = puzzle_numbers.iter().copied().collect();
        let mut found: HashMap<PuzzleNumber, Entry> = self
            .repository
            .entries_for_player(game, player, Some(&requested))
            .await?
            .into_iter()
            .map(|entry| (entry.puzzle_number, entry))
            .collect();

        Ok(requested
            .into_iter()
            .map(|puzzle_number| {
                let entry = found.remove(&puzzle_number);
                EntryDetail {
                    puzzle_number,
                    found: entry.is_some(),
                    entry,
                }
            })
            .collect())
    }

    /// Per-player statistics over every recorded puzzle of the game.
    ///
    /// An empty `players` list reports the whole roster.
    #[instrument(skip(self))]
    pub async fn player_stats(
        &self,
        game: Game,
        players: &[PlayerId],
    ) -> Result<PlayerStatsReport, TrackerError> {
        let roster = self.repository.all_players(game).await?;
        let recorded = self.repository.all_puzzle_numbers(game).await?;

        let requested: Vec<PlayerId> = if players.is_empty() {
            roster.iter().cloned().collect()
        } else {
            players.to_vec()
        };

        let mut found = Vec::new();
        let mut not_found = Vec::new();
        for player in requested {
            if !roster.contains(&player) {
                not_found.push(player);
                continue;
            }

            let entries = self
                .repository
                .entries_for_player(game, &player, None)
                .await?;
            found.push(PlayerStats {
                display_name: self.directory.display_name_or_id(&player).await,
                snapshot: aggregate(game, &player, &recorded, &entries),
                distribution: score_distribution(game, &entries),
            });
        }

        debug!(
            found = found.len(),
            not_found = not_found.len(),
            "Computed player stats"
        );
        Ok(PlayerStatsReport {
            game,
            found,
            not_found,
        })
    }

    #[instrument(skip(self))]
    pub async fn remove_entry(
        &self,
        game: Game,
        player: &str,
        puzzle_number: PuzzleNumber,
    ) -> Result<bool, TrackerError> {
        let removed = self
            .repository
            .remove_entry(game, player, puzzle_number)
            .await?;
        info!(removed, "Entry removal requested");
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn reset_game(&self, game: Game) -> Result<u64, TrackerError> {
        let removed = self.repository.reset_game(game).await?;
        info!(removed, "Game reset");
        Ok(removed)
    }

    async fn display_names(&self, players: &BTreeSet<PlayerId>) -> HashMap<PlayerId, String> {
        join_all(players.iter().map(|player| async move {
            (
                player.clone(),
                self.directory.display_name_or_id(player).await,
            )
        }))
        .await
        .into_iter()
        .collect()
    }
}

pub struct TrackerServiceBuilder {
    repository: Arc<dyn EntryRepository>,
    directory: Option<Arc<dyn PlayerDirectory>>,
    calendar: PuzzleCalendar,
    clock: Option<Arc<dyn Clock>>,
}

impl TrackerServiceBuilder {
    pub fn new(repository: Arc<dyn EntryRepository>) -> Self {
        Self {
            repository,
            directory: None,
            calendar: PuzzleCalendar::default(),
            clock: None,
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn PlayerDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn with_calendar(mut self, calendar: PuzzleCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> TrackerService {
        TrackerService {
            repository: self.repository,
            directory: self
                .directory
                .unwrap_or_else(|| Arc::new(InMemoryPlayerDirectory::new())),
            calendar: self.calendar,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock::default())),
        }
    }
}
