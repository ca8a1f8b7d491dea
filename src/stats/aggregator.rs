use std::collections::BTreeSet;

use super::{PlayerStatSnapshot, ScoreBucket, SecondaryAverages};
use crate::entry::Entry;
use crate::puzzle::{score, EntryMetrics, Game, PuzzleNumber};

// Summed in ascending order so equal multisets give bit-identical means;
// shared ranks compare them exactly.
fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes one player's snapshot over `puzzle_numbers`.
///
/// Entries outside the set are ignored. Every puzzle in the set without an
/// entry counts as missed and contributes the game's sentinel score to the
/// adjusted mean only; secondary averages cover played puzzles alone.
pub fn aggregate(
    game: Game,
    player: &str,
    puzzle_numbers: &BTreeSet<PuzzleNumber>,
    entries: &[Entry],
) -> PlayerStatSnapshot {
    let played: Vec<&Entry> = entries
        .iter()
        .filter(|e| e.game == game && puzzle_numbers.contains(&e.puzzle_number))
        .collect();
    let missed = puzzle_numbers.len().saturating_sub(played.len());

    let (raw_mean, adjusted_mean) = if played.is_empty() {
        (0.0, 0.0)
    } else {
        let scores = played.iter().map(|e| e.score);
        let padding = std::iter::repeat(game.sentinel_score()).take(missed);
        (mean(scores.clone()), mean(scores.chain(padding)))
    };

    PlayerStatSnapshot {
        game,
        player: player.to_string(),
        puzzle_count: puzzle_numbers.len(),
        played: played.len(),
        missed,
        raw_mean,
        adjusted_mean,
        secondary: secondary_averages(game, &played),
    }
}

fn secondary_averages(game: Game, played: &[&Entry]) -> SecondaryAverages {
    match game {
        Game::Connections => SecondaryAverages::Connections,
        Game::Strands => {
            let metrics: Vec<(u32, u32)> = played
                .iter()
                .filter_map(|e| match e.metrics {
                    EntryMetrics::Strands {
                        hints,
                        spangram_index,
                        ..
                    } => Some((hints, spangram_index)),
                    _ => None,
                })
                .collect();
            SecondaryAverages::Strands {
                avg_hints: mean(metrics.iter().map(|(h, _)| *h as f64)),
                avg_spangram_index: mean(metrics.iter().map(|(_, s)| *s as f64)),
            }
        }
        Game::Wordle => {
            let metrics: Vec<(u32, u32, u32)> = played
                .iter()
                .filter_map(|e| match e.metrics {
                    EntryMetrics::Wordle {
                        green,
                        yellow,
                        other,
                    } => Some((green, yellow, other)),
                    _ => None,
                })
                .collect();
            SecondaryAverages::Wordle {
                avg_green: mean(metrics.iter().map(|m| m.0 as f64)),
                avg_yellow: mean(metrics.iter().map(|m| m.1 as f64)),
                avg_other: mean(metrics.iter().map(|m| m.2 as f64)),
            }
        }
    }
}

/// Counts entries per distribution bucket, in the game's bucket order
pub fn score_distribution(game: Game, entries: &[Entry]) -> Vec<ScoreBucket> {
    score::distribution_buckets(game)
        .into_iter()
        .map(|label| {
            let count = entries
                .iter()
                .filter(|e| {
                    score::distribution_bucket(game, e.score, &e.metrics).as_deref()
                        == Some(label.as_str())
                })
                .count();
            ScoreBucket { label, count }
        })
        .collect()
}
