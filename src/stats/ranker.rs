use std::collections::HashMap;

use super::{Leaderboard, LeaderboardRow, PlayerStatSnapshot, QueryClass, QueryRange, SecondaryAverages};
use crate::puzzle::{Game, PlayerId};

pub const MAX_LEADERBOARD_ROWS: usize = 10;

/// Orders snapshots best first and assigns shared ranks.
///
/// Players without a single entry in the range are dropped. Sorting is stable
/// on the adjusted mean, or the raw mean for all-time queries. A row whose
/// full metric tuple equals its predecessor's shares that rank; any other row
/// is ranked by its 1-based position.
pub fn rank_snapshots(
    class: QueryClass,
    snapshots: Vec<PlayerStatSnapshot>,
) -> Vec<(usize, PlayerStatSnapshot)> {
    let mut qualifying: Vec<PlayerStatSnapshot> =
        snapshots.into_iter().filter(|s| s.played > 0).collect();

    qualifying.sort_by(|a, b| match class {
        QueryClass::AllTime => a.raw_mean.total_cmp(&b.raw_mean),
        QueryClass::Single | QueryClass::Multi => a.adjusted_mean.total_cmp(&b.adjusted_mean),
    });

    let mut ranked: Vec<(usize, PlayerStatSnapshot)> = Vec::with_capacity(qualifying.len());
    for (index, snapshot) in qualifying.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some((previous_rank, previous)) if previous.metric_tuple() == snapshot.metric_tuple() => {
                *previous_rank
            }
            _ => index + 1,
        };
        ranked.push((rank, snapshot));
    }
    ranked
}

pub fn column_headers(game: Game, class: QueryClass) -> Vec<String> {
    let headers: &[&str] = match (game, class) {
        (Game::Connections, QueryClass::Single) | (Game::Wordle, QueryClass::Single) => &["Score"],
        (Game::Connections, QueryClass::Multi) => &["Average", "🧩", "🚫"],
        (Game::Connections, QueryClass::AllTime) => &["Average", "🧩"],
        (Game::Wordle, QueryClass::Multi) => &["Average", "🟩", "🧩", "🚫"],
        (Game::Wordle, QueryClass::AllTime) => &["Average", "🟩", "🧩"],
        (Game::Strands, QueryClass::Single) => &["Rating", "Hints", "🟡 Index"],
        (Game::Strands, QueryClass::Multi) => {
            &["Avg Rating", "Avg Hints", "Avg 🟡 Index", "🧩", "🚫"]
        }
        (Game::Strands, QueryClass::AllTime) => &["Avg Rating", "Avg Hints", "Avg 🟡 Index", "🧩"],
    };
    headers.iter().map(|h| h.to_string()).collect()
}

fn scaled(value: f64, scale: u32) -> String {
    format!("{value:.2}/{scale}")
}

/// Formats one snapshot's cells in the order of `column_headers`
pub fn format_row(class: QueryClass, snapshot: &PlayerStatSnapshot) -> Vec<String> {
    let game = snapshot.game;
    let played = snapshot.played.to_string();
    let missed = snapshot.missed.to_string();

    match (game.score_scale(), &snapshot.secondary) {
        (
            _,
            SecondaryAverages::Strands {
                avg_hints,
                avg_spangram_index,
            },
        ) => {
            let mut cells = match class {
                QueryClass::Single => vec![
                    format!("{:.3}", snapshot.raw_mean),
                    format!("{avg_hints:.0}"),
                    format!("{avg_spangram_index:.0}"),
                ],
                QueryClass::Multi => vec![
                    format!("{:.3} ({:.3})", snapshot.adjusted_mean, snapshot.raw_mean),
                    format!("{avg_hints:.2}"),
                    format!("{avg_spangram_index:.2}"),
                ],
                QueryClass::AllTime => vec![
                    format!("{:.3}", snapshot.raw_mean),
                    format!("{avg_hints:.2}"),
                    format!("{avg_spangram_index:.2}"),
                ],
            };
            push_counts(&mut cells, class, played, missed);
            cells
        }
        (Some(scale), secondary) => {
            if class == QueryClass::Single {
                let cell = if snapshot.raw_mean >= game.sentinel_score() {
                    format!("X/{scale}")
                } else {
                    format!("{:.0}/{scale}", snapshot.raw_mean)
                };
                return vec![cell];
            }

            let mut cells = vec![match class {
                QueryClass::Multi => format!(
                    "{} ({})",
                    scaled(snapshot.adjusted_mean, scale),
                    scaled(snapshot.raw_mean, scale)
                ),
                _ => scaled(snapshot.raw_mean, scale),
            }];
            if let SecondaryAverages::Wordle { avg_green, .. } = secondary {
                cells.push(format!("{avg_green:.2}"));
            }
            push_counts(&mut cells, class, played, missed);
            cells
        }
        (None, _) => vec![format!("{:.3}", snapshot.raw_mean)],
    }
}

fn push_counts(cells: &mut Vec<String>, class: QueryClass, played: String, missed: String) {
    match class {
        QueryClass::Single => {}
        QueryClass::Multi => {
            cells.push(played);
            cells.push(missed);
        }
        QueryClass::AllTime => cells.push(played),
    }
}

/// Ranks `snapshots` for `range` and keeps the top `MAX_LEADERBOARD_ROWS`
pub fn build_leaderboard(
    game: Game,
    range: &QueryRange,
    snapshots: Vec<PlayerStatSnapshot>,
    display_names: &HashMap<PlayerId, String>,
) -> Leaderboard {
    let ranked = rank_snapshots(range.class, snapshots);
    let ranked_players = ranked.len();

    let rows = ranked
        .into_iter()
        .take(MAX_LEADERBOARD_ROWS)
        .map(|(rank, snapshot)| LeaderboardRow {
            rank,
            display_name: display_names
                .get(&snapshot.player)
                .cloned()
                .unwrap_or_else(|| snapshot.player.clone()),
            values: format_row(range.class, &snapshot),
            player: snapshot.player,
        })
        .collect();

    Leaderboard {
        game,
        label: range.label.clone(),
        class: range.class,
        columns: column_headers(game, range.class),
        rows,
        ranked_players,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn connections(player: &str, played: usize, missed: usize, raw: f64, adjusted: f64) -> PlayerStatSnapshot {
        PlayerStatSnapshot {
            game: Game::Connections,
            player: player.to_string(),
            puzzle_count: played + missed,
            played,
            missed,
            raw_mean: raw,
            adjusted_mean: adjusted,
            secondary: SecondaryAverages::Connections,
        }
    }

    fn ranks(ranked: &[(usize, PlayerStatSnapshot)]) -> Vec<usize> {
        ranked.iter().map(|(rank, _)| *rank).collect()
    }

    fn players(ranked: &[(usize, PlayerStatSnapshot)]) -> Vec<&str> {
        ranked.iter().map(|(_, s)| s.player.as_str()).collect()
    }

    fn range(class: QueryClass) -> QueryRange {
        QueryRange {
            puzzle_numbers: BTreeSet::from([1, 2, 3, 4, 5, 6, 7]),
            label: "This Week (so far)".to_string(),
            class,
        }
    }

    #[test]
    fn three_way_tie_is_followed_by_rank_four() {
        let snapshots = vec![
            connections("d", 7, 0, 6.0, 6.0),
            connections("a", 7, 0, 4.5, 4.5),
            connections("b", 7, 0, 4.5, 4.5),
            connections("c", 7, 0, 4.5, 4.5),
        ];

        let ranked = rank_snapshots(QueryClass::Multi, snapshots);
        assert_eq!(ranks(&ranked), vec![1, 1, 1, 4]);
        assert_eq!(players(&ranked), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn strictly_better_player_leads_a_tie() {
        let snapshots = vec![
            connections("a", 7, 0, 5.0, 5.0),
            connections("b", 7, 0, 5.0, 5.0),
            connections("c", 7, 0, 5.0, 5.0),
            connections("d", 7, 0, 4.0, 4.0),
        ];

        let ranked = rank_snapshots(QueryClass::Multi, snapshots);
        assert_eq!(ranks(&ranked), vec![1, 2, 2, 2]);
        assert_eq!(players(&ranked)[0], "d");
    }

    #[test]
    fn equal_sort_key_with_different_tuple_does_not_share_rank() {
        let snapshots = vec![
            connections("a", 7, 0, 5.0, 5.0),
            connections("b", 5, 2, 4.2, 5.0),
        ];

        let ranked = rank_snapshots(QueryClass::Multi, snapshots);
        assert_eq!(ranks(&ranked), vec![1, 2]);
        assert_eq!(players(&ranked), vec!["a", "b"]);
    }

    #[test]
    fn identical_results_in_different_order_share_rank() {
        use crate::entry::Entry;
        use crate::puzzle::EntryMetrics;
        use crate::stats::aggregator::aggregate;
        use chrono::Utc;

        // Ratings 1.0, 1.0833.., 1.0833..; summed left to right the two
        // orders differ in the last bit
        let strands = |player: &str, puzzle_number, spangram_index, theme_words| Entry {
            game: Game::Strands,
            player: player.to_string(),
            puzzle_number,
            raw_text: String::new(),
            score: crate::puzzle::score::strands_rating(0, spangram_index, theme_words),
            metrics: EntryMetrics::Strands {
                hints: 0,
                spangram_index,
                theme_words,
            },
            submitted_at: Utc::now(),
        };
        let forward = vec![strands("a", 10, 1, 1), strands("a", 11, 2, 3), strands("a", 12, 2, 3)];
        let reverse = vec![strands("b", 10, 2, 3), strands("b", 11, 2, 3), strands("b", 12, 1, 1)];

        let puzzles = BTreeSet::from([10, 11, 12]);
        let snapshots = vec![
            aggregate(Game::Strands, "a", &puzzles, &forward),
            aggregate(Game::Strands, "b", &puzzles, &reverse),
        ];

        let all_time = rank_snapshots(QueryClass::AllTime, snapshots.clone());
        assert_eq!(ranks(&all_time), vec![1, 1]);
        let weekly = rank_snapshots(QueryClass::Multi, snapshots);
        assert_eq!(ranks(&weekly), vec![1, 1]);
    }

    #[test]
    fn players_without_entries_are_excluded() {
        let snapshots = vec![
            connections("a", 2, 5, 4.0, 6.86),
            connections("ghost", 0, 7, 0.0, 0.0),
        ];

        let ranked = rank_snapshots(QueryClass::Multi, snapshots);
        assert_eq!(players(&ranked), vec!["a"]);
    }

    #[test]
    fn adjusted_and_raw_orders_can_differ() {
        // "sporadic" played 4 of 7 with perfect scores; "steady" played all 7.
        let snapshots = vec![
            connections("sporadic", 4, 3, 4.0, (4.0 * 4.0 + 8.0 * 3.0) / 7.0),
            connections("steady", 7, 0, 5.0, 5.0),
        ];

        let weekly = rank_snapshots(QueryClass::Multi, snapshots.clone());
        let all_time = rank_snapshots(QueryClass::AllTime, snapshots);

        assert_eq!(players(&weekly), vec!["steady", "sporadic"]);
        assert_eq!(players(&all_time), vec!["sporadic", "steady"]);
    }

    #[test]
    fn ranking_is_repeatable() {
        let snapshots: Vec<PlayerStatSnapshot> = (0..5)
            .map(|i| connections(&format!("p{i}"), 7, 0, 4.0 + (i % 2) as f64, 4.0 + (i % 2) as f64))
            .collect();

        let first = rank_snapshots(QueryClass::Multi, snapshots.clone());
        let second = rank_snapshots(QueryClass::Multi, snapshots);
        assert_eq!(first, second);
    }

    #[test]
    fn leaderboard_truncates_but_keeps_full_ranks() {
        let snapshots: Vec<PlayerStatSnapshot> = (0..12)
            .map(|i| {
                let score = 4.0 + i as f64 * 0.1;
                connections(&format!("p{i:02}"), 7, 0, score, score)
            })
            .collect();
        let names = HashMap::from([("p00".to_string(), "Alice".to_string())]);

        let board = build_leaderboard(Game::Connections, &range(QueryClass::Multi), snapshots, &names);

        assert_eq!(board.rows.len(), MAX_LEADERBOARD_ROWS);
        assert_eq!(board.ranked_players, 12);
        assert_eq!(board.rows[0].display_name, "Alice");
        assert_eq!(board.rows[1].display_name, "p01");
        assert_eq!(board.rows[9].rank, 10);
        assert_eq!(board.columns, vec!["Average", "🧩", "🚫"]);
    }

    #[test]
    fn empty_leaderboard() {
        let board = build_leaderboard(Game::Wordle, &range(QueryClass::AllTime), Vec::new(), &HashMap::new());
        assert!(board.is_empty());
        assert_eq!(board.ranked_players, 0);
    }

    #[test]
    fn formats_connections_cells() {
        let single = connections("a", 1, 0, 5.0, 5.0);
        assert_eq!(format_row(QueryClass::Single, &single), vec!["5/7"]);

        let failed = connections("a", 1, 0, 8.0, 8.0);
        assert_eq!(format_row(QueryClass::Single, &failed), vec!["X/7"]);

        let week = connections("a", 5, 2, 4.4, 5.428571);
        assert_eq!(
            format_row(QueryClass::Multi, &week),
            vec!["5.43/7 (4.40/7)", "5", "2"]
        );
        assert_eq!(format_row(QueryClass::AllTime, &week), vec!["4.40/7", "5"]);
    }

    #[test]
    fn formats_wordle_and_strands_cells() {
        let wordle = PlayerStatSnapshot {
            game: Game::Wordle,
            player: "a".to_string(),
            puzzle_count: 3,
            played: 3,
            missed: 0,
            raw_mean: 4.0,
            adjusted_mean: 4.0,
            secondary: SecondaryAverages::Wordle {
                avg_green: 7.5,
                avg_yellow: 2.0,
                avg_other: 10.0,
            },
        };
        assert_eq!(
            format_row(QueryClass::AllTime, &wordle),
            vec!["4.00/6", "7.50", "3"]
        );
        assert_eq!(column_headers(Game::Wordle, QueryClass::AllTime).len(), 3);

        let strands = PlayerStatSnapshot {
            game: Game::Strands,
            player: "a".to_string(),
            puzzle_count: 1,
            played: 1,
            missed: 0,
            raw_mean: 1.3,
            adjusted_mean: 1.3,
            secondary: SecondaryAverages::Strands {
                avg_hints: 1.0,
                avg_spangram_index: 3.0,
            },
        };
        assert_eq!(
            format_row(QueryClass::Single, &strands),
            vec!["1.300", "1", "3"]
        );
    }
}
