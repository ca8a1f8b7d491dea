use async_trait::async_trait;
use serde::Serialize;
use sqlx::{PgPool, Row};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{Entry, EntryKey};
use crate::puzzle::{EntryMetrics, Game, PlayerId, PuzzleNumber};
use crate::stats::TrackerError;

/// Whether an upsert created a new entry or overwrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Persistent record store for puzzle entries.
///
/// Implementations must make `add_or_update_entry` atomic per
/// `(game, player, puzzle_number)` key.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    async fn add_or_update_entry(&self, entry: &Entry) -> Result<Upsert, TrackerError>;
    async fn remove_entry(
        &self,
        game: Game,
        player: &str,
        puzzle_number: PuzzleNumber,
    ) -> Result<bool, TrackerError>;
    async fn entry_exists(
        &self,
        game: Game,
        player: &str,
        puzzle_number: PuzzleNumber,
    ) -> Result<bool, TrackerError>;
    async fn all_players(&self, game: Game) -> Result<BTreeSet<PlayerId>, TrackerError>;
    async fn all_puzzle_numbers(&self, game: Game) -> Result<BTreeSet<PuzzleNumber>, TrackerError>;
    async fn puzzle_numbers_for_player(
        &self,
        game: Game,
        player: &str,
    ) -> Result<BTreeSet<PuzzleNumber>, TrackerError>;
    async fn players_for_puzzle_number(
        &self,
        game: Game,
        puzzle_number: PuzzleNumber,
    ) -> Result<BTreeSet<PlayerId>, TrackerError>;
    /// Entries ordered by puzzle number, optionally restricted to `filter`
    async fn entries_for_player(
        &self,
        game: Game,
        player: &str,
        filter: Option<&BTreeSet<PuzzleNumber>>,
    ) -> Result<Vec<Entry>, TrackerError>;
    /// Deletes every entry of a game, returning how many were removed
    async fn reset_game(&self, game: Game) -> Result<u64, TrackerError>;
}

/// In-memory implementation of EntryRepository for development and testing
///
/// Every operation takes the single map lock, so an upsert can never
/// interleave with another write to the same key.
#[derive(Debug, Default)]
pub struct InMemoryEntryRepository {
    entries: Arc<RwLock<BTreeMap<EntryKey, Entry>>>,
}

impl InMemoryEntryRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl EntryRepository for InMemoryEntryRepository {
    #[instrument(skip(self, entry), fields(game = %entry.game, player = %entry.player, puzzle_number = entry.puzzle_number))]
    async fn add_or_update_entry(&self, entry: &Entry) -> Result<Upsert, TrackerError> {
        let mut entries = self.entries.write().await;
        let outcome = match entries.insert(entry.key(), entry.clone()) {
            Some(_) => Upsert::Updated,
            None => Upsert::Inserted,
        };
        debug!(?outcome, "Stored entry in memory");
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn remove_entry(
        &self,
        game: Game,
        player: &str,
        puzzle_number: PuzzleNumber,
    ) -> Result<bool, TrackerError> {
        let mut entries = self.entries.write().await;
        let removed = entries
            .remove(&(game, player.to_string(), puzzle_number))
            .is_some();
        if !removed {
            debug!("No entry to remove in memory");
        }
        Ok(removed)
    }

    async fn entry_exists(
        &self,
        game: Game,
        player: &str,
        puzzle_number: PuzzleNumber,
    ) -> Result<bool, TrackerError> {
        let entries = self.entries.read().await;
        Ok(entries.contains_key(&(game, player.to_string(), puzzle_number)))
    }

    async fn all_players(&self, game: Game) -> Result<BTreeSet<PlayerId>, TrackerError> {
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|(g, _, _)| *g == game)
            .map(|(_, player, _)| player.clone())
            .collect())
    }

    async fn all_puzzle_numbers(&self, game: Game) -> Result<BTreeSet<PuzzleNumber>, TrackerError> {
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|(g, _, _)| *g == game)
            .map(|(_, _, number)| *number)
            .collect())
    }

    async fn puzzle_numbers_for_player(
        &self,
        game: Game,
        player: &str,
    ) -> Result<BTreeSet<PuzzleNumber>, TrackerError> {
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|(g, p, _)| *g == game && p == player)
            .map(|(_, _, number)| *number)
            .collect())
    }

    async fn players_for_puzzle_number(
        &self,
        game: Game,
        puzzle_number: PuzzleNumber,
    ) -> Result<BTreeSet<PlayerId>, TrackerError> {
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|(g, _, number)| *g == game && *number == puzzle_number)
            .map(|(_, player, _)| player.clone())
            .collect())
    }

    async fn entries_for_player(
        &self,
        game: Game,
        player: &str,
        filter: Option<&BTreeSet<PuzzleNumber>>,
    ) -> Result<Vec<Entry>, TrackerError> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .filter(|e| e.game == game && e.player == player)
            .filter(|e| filter.map_or(true, |wanted| wanted.contains(&e.puzzle_number)))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn reset_game(&self, game: Game) -> Result<u64, TrackerError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(g, _, _), _| *g != game);
        let removed = (before - entries.len()) as u64;
        debug!(removed, "Reset game in memory");
        Ok(removed)
    }
}

/// PostgreSQL implementation of the entry repository
pub struct PostgresEntryRepository {
    pool: PgPool,
}

const CREATE_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS puzzle_entries (
    game TEXT NOT NULL,
    player_id TEXT NOT NULL,
    puzzle_number BIGINT NOT NULL,
    raw_text TEXT NOT NULL,
    score DOUBLE PRECISION NOT NULL,
    metrics TEXT NOT NULL,
    submitted_at TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (game, player_id, puzzle_number)
)
"#;

fn store_failure(context: &str, error: impl std::fmt::Display) -> TrackerError {
    warn!(error = %error, "{}", context);
    TrackerError::StoreFailure(format!("{context}: {error}"))
}

impl PostgresEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the entries table when it does not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), TrackerError> {
        sqlx::query(CREATE_ENTRIES_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| store_failure("Failed to create puzzle_entries table", e))?;
        Ok(())
    }

    fn entry_from_row(row: &sqlx::postgres::PgRow) -> Result<Entry, TrackerError> {
        let game: String = row.get("game");
        let metrics: String = row.get("metrics");
        Ok(Entry {
            game: Game::from_str(&game)
                .map_err(|e| store_failure("Unknown game in puzzle_entries", e))?,
            player: row.get("player_id"),
            puzzle_number: row.get("puzzle_number"),
            raw_text: row.get("raw_text"),
            score: row.get("score"),
            metrics: serde_json::from_str::<EntryMetrics>(&metrics)
                .map_err(|e| store_failure("Corrupt metrics in puzzle_entries", e))?,
            submitted_at: row.get("submitted_at"),
        })
    }

    async fn fetch_numbers(
        &self,
        query: &'static str,
        game: Game,
        key: &str,
    ) -> Result<BTreeSet<PuzzleNumber>, TrackerError> {
        let rows = sqlx::query(query)
            .bind(game.to_string())
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_failure("Failed to fetch puzzle numbers", e))?;
        Ok(rows.iter().map(|row| row.get("puzzle_number")).collect())
    }
}

#[async_trait]
impl EntryRepository for PostgresEntryRepository {
    #[instrument(skip(self, entry), fields(game = %entry.game, player = %entry.player, puzzle_number = entry.puzzle_number))]
    async fn add_or_update_entry(&self, entry: &Entry) -> Result<Upsert, TrackerError> {
        let metrics = serde_json::to_string(&entry.metrics)
            .map_err(|e| store_failure("Failed to encode entry metrics", e))?;

        let row = sqlx::query(
            "INSERT INTO puzzle_entries (game, player_id, puzzle_number, raw_text, score, metrics, submitted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (game, player_id, puzzle_number) DO UPDATE \
             SET raw_text = EXCLUDED.raw_text, score = EXCLUDED.score, \
                 metrics = EXCLUDED.metrics, submitted_at = EXCLUDED.submitted_at \
             RETURNING (xmax = 0) AS inserted",
        )
        .bind(entry.game.to_string())
        .bind(&entry.player)
        .bind(entry.puzzle_number)
        .bind(&entry.raw_text)
        .bind(entry.score)
        .bind(metrics)
        .bind(entry.submitted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_failure("Failed to upsert entry", e))?;

        let outcome = if row.get::<bool, _>("inserted") {
            Upsert::Inserted
        } else {
            Upsert::Updated
        };
        debug!(?outcome, "Stored entry in database");
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn remove_entry(
        &self,
        game: Game,
        player: &str,
        puzzle_number: PuzzleNumber,
    ) -> Result<bool, TrackerError> {
        let result = sqlx::query(
            "DELETE FROM puzzle_entries WHERE game = $1 AND player_id = $2 AND puzzle_number = $3",
        )
        .bind(game.to_string())
        .bind(player)
        .bind(puzzle_number)
        .execute(&self.pool)
        .await
        .map_err(|e| store_failure("Failed to delete entry", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn entry_exists(
        &self,
        game: Game,
        player: &str,
        puzzle_number: PuzzleNumber,
    ) -> Result<bool, TrackerError> {
        let row = sqlx::query(
            "SELECT 1 AS found FROM puzzle_entries WHERE game = $1 AND player_id = $2 AND puzzle_number = $3",
        )
        .bind(game.to_string())
        .bind(player)
        .bind(puzzle_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_failure("Failed to check entry", e))?;

        Ok(row.is_some())
    }

    async fn all_players(&self, game: Game) -> Result<BTreeSet<PlayerId>, TrackerError> {
        let rows = sqlx::query("SELECT DISTINCT player_id FROM puzzle_entries WHERE game = $1")
            .bind(game.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_failure("Failed to fetch players", e))?;
        Ok(rows.iter().map(|row| row.get("player_id")).collect())
    }

    async fn all_puzzle_numbers(&self, game: Game) -> Result<BTreeSet<PuzzleNumber>, TrackerError> {
        let rows =
            sqlx::query("SELECT DISTINCT puzzle_number FROM puzzle_entries WHERE game = $1")
                .bind(game.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_failure("Failed to fetch puzzle numbers", e))?;
        Ok(rows.iter().map(|row| row.get("puzzle_number")).collect())
    }

    async fn puzzle_numbers_for_player(
        &self,
        game: Game,
        player: &str,
    ) -> Result<BTreeSet<PuzzleNumber>, TrackerError> {
        self.fetch_numbers(
            "SELECT puzzle_number FROM puzzle_entries WHERE game = $1 AND player_id = $2",
            game,
            player,
        )
        .await
    }

    async fn players_for_puzzle_number(
        &self,
        game: Game,
        puzzle_number: PuzzleNumber,
    ) -> Result<BTreeSet<PlayerId>, TrackerError> {
        let rows = sqlx::query(
            "SELECT player_id FROM puzzle_entries WHERE game = $1 AND puzzle_number = $2",
        )
        .bind(game.to_string())
        .bind(puzzle_number)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_failure("Failed to fetch players for puzzle", e))?;
        Ok(rows.iter().map(|row| row.get("player_id")).collect())
    }

    async fn entries_for_player(
        &self,
        game: Game,
        player: &str,
        filter: Option<&BTreeSet<PuzzleNumber>>,
    ) -> Result<Vec<Entry>, TrackerError> {
        let wanted: Option<Vec<PuzzleNumber>> = filter.map(|f| f.iter().copied().collect());

        let rows = sqlx::query(
            "SELECT game, player_id, puzzle_number, raw_text, score, metrics, submitted_at \
             FROM puzzle_entries \
             WHERE game = $1 AND player_id = $2 AND ($3::BIGINT[] IS NULL OR puzzle_number = ANY($3)) \
             ORDER BY puzzle_number",
        )
        .bind(game.to_string())
        .bind(player)
        .bind(wanted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_failure("Failed to fetch entries", e))?;

        rows.iter().map(Self::entry_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn reset_game(&self, game: Game) -> Result<u64, TrackerError> {
        let result = sqlx::query("DELETE FROM puzzle_entries WHERE game = $1")
            .bind(game.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| store_failure("Failed to reset game", e))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn wordle_entry(player: &str, puzzle_number: PuzzleNumber, score: f64) -> Entry {
        Entry {
            game: Game::Wordle,
            player: player.to_string(),
            puzzle_number,
            raw_text: format!("Wordle {puzzle_number} {score}/6"),
            score,
            metrics: EntryMetrics::Wordle {
                green: 5,
                yellow: 1,
                other: 4,
            },
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn resubmission_overwrites_in_place() {
        let repo = InMemoryEntryRepository::new();

        let first = repo
            .add_or_update_entry(&wordle_entry("alice", 100, 5.0))
            .await
            .unwrap();
        let second = repo
            .add_or_update_entry(&wordle_entry("alice", 100, 3.0))
            .await
            .unwrap();

        assert_eq!(first, Upsert::Inserted);
        assert_eq!(second, Upsert::Updated);
        assert_eq!(repo.entry_count().await, 1);

        let entries = repo
            .entries_for_player(Game::Wordle, "alice", None)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 3.0);
    }

    #[tokio::test]
    async fn keys_are_scoped_per_game() {
        let repo = InMemoryEntryRepository::new();
        repo.add_or_update_entry(&wordle_entry("alice", 100, 4.0))
            .await
            .unwrap();

        let mut strands = wordle_entry("alice", 100, 1.25);
        strands.game = Game::Strands;
        strands.metrics = EntryMetrics::Strands {
            hints: 1,
            spangram_index: 1,
            theme_words: 6,
        };
        repo.add_or_update_entry(&strands).await.unwrap();

        assert_eq!(repo.entry_count().await, 2);
        assert!(repo.entry_exists(Game::Wordle, "alice", 100).await.unwrap());
        assert!(!repo.entry_exists(Game::Connections, "alice", 100).await.unwrap());
        assert_eq!(
            repo.all_puzzle_numbers(Game::Strands).await.unwrap(),
            BTreeSet::from([100])
        );
    }

    #[tokio::test]
    async fn roster_and_puzzle_indexes() {
        let repo = InMemoryEntryRepository::new();
        for (player, number) in [("alice", 1), ("alice", 2), ("bob", 2), ("carol", 3)] {
            repo.add_or_update_entry(&wordle_entry(player, number, 4.0))
                .await
                .unwrap();
        }

        assert_eq!(
            repo.all_players(Game::Wordle).await.unwrap(),
            BTreeSet::from(["alice".to_string(), "bob".to_string(), "carol".to_string()])
        );
        assert_eq!(
            repo.puzzle_numbers_for_player(Game::Wordle, "alice")
                .await
                .unwrap(),
            BTreeSet::from([1, 2])
        );
        assert_eq!(
            repo.players_for_puzzle_number(Game::Wordle, 2).await.unwrap(),
            BTreeSet::from(["alice".to_string(), "bob".to_string()])
        );
    }

    #[tokio::test]
    async fn filters_entries_and_orders_by_puzzle_number() {
        let repo = InMemoryEntryRepository::new();
        for number in [5, 3, 9, 1] {
            repo.add_or_update_entry(&wordle_entry("alice", number, 4.0))
                .await
                .unwrap();
        }

        let all = repo
            .entries_for_player(Game::Wordle, "alice", None)
            .await
            .unwrap();
        let numbers: Vec<_> = all.iter().map(|e| e.puzzle_number).collect();
        assert_eq!(numbers, vec![1, 3, 5, 9]);

        let filter = BTreeSet::from([3, 9, 42]);
        let some = repo
            .entries_for_player(Game::Wordle, "alice", Some(&filter))
            .await
            .unwrap();
        let numbers: Vec<_> = some.iter().map(|e| e.puzzle_number).collect();
        assert_eq!(numbers, vec![3, 9]);
    }

    #[tokio::test]
    async fn remove_and_reset() {
        let repo = InMemoryEntryRepository::new();
        repo.add_or_update_entry(&wordle_entry("alice", 1, 4.0))
            .await
            .unwrap();
        repo.add_or_update_entry(&wordle_entry("bob", 1, 2.0))
            .await
            .unwrap();

        assert!(repo.remove_entry(Game::Wordle, "alice", 1).await.unwrap());
        assert!(!repo.remove_entry(Game::Wordle, "alice", 1).await.unwrap());

        assert_eq!(repo.reset_game(Game::Wordle).await.unwrap(), 1);
        assert!(repo.all_players(Game::Wordle).await.unwrap().is_empty());
    }
}
