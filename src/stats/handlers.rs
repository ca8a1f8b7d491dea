use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use tracing::{info, instrument};

use super::{
    query::parse_puzzle_token,
    types::{
        split_list, DetailParams, EntryRequest, MissingParams, PlayerEntriesResponse, RankParams,
        RemoveEntryResponse, ResetGameResponse, StatsParams, SubmissionRequest,
    },
    EntryDetail, IngestOutcome, IngestRequest, Leaderboard, MissingReport, PlayerStatsReport,
    TrackerError,
};
use crate::puzzle::{Game, PlayerId, PuzzleNumber};
use crate::shared::{AppError, AppState};

/// HTTP handler for a raw chat message
///
/// POST /submissions
/// Messages that are not share results come back with `accepted: false`
#[instrument(name = "submit_message", skip(state, request), fields(player = %request.player))]
pub async fn submit_message(
    State(state): State<AppState>,
    Json(request): Json<SubmissionRequest>,
) -> Result<Json<IngestOutcome>, AppError> {
    let outcome = state
        .tracker
        .ingest_message(
            &request.player,
            request.display_name.as_deref(),
            &request.text,
            request.submitted_at.unwrap_or_else(Utc::now),
        )
        .await?;

    info!(accepted = outcome.accepted, "Message processed");
    Ok(Json(outcome))
}

/// POST /:game/entries
#[instrument(name = "submit_entry", skip(state, request), fields(player = %request.player))]
pub async fn submit_entry(
    State(state): State<AppState>,
    Path(game): Path<Game>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<IngestOutcome>, AppError> {
    let outcome = state
        .tracker
        .ingest(IngestRequest {
            game,
            player: request.player,
            display_name: request.display_name,
            title_lines: request.title_lines,
            body_lines: request.body_lines,
            submitted_at: request.submitted_at.unwrap_or_else(Utc::now),
        })
        .await?;

    Ok(Json(outcome))
}

/// GET /:game/ranks?query=
#[instrument(name = "rank", skip(state))]
pub async fn rank(
    State(state): State<AppState>,
    Path(game): Path<Game>,
    Query(params): Query<RankParams>,
) -> Result<Json<Leaderboard>, AppError> {
    let leaderboard = state.tracker.rank(game, &params.query).await?;
    Ok(Json(leaderboard))
}

/// GET /:game/missing?puzzle=
#[instrument(name = "missing", skip(state))]
pub async fn missing(
    State(state): State<AppState>,
    Path(game): Path<Game>,
    Query(params): Query<MissingParams>,
) -> Result<Json<MissingReport>, AppError> {
    let report = state
        .tracker
        .missing(game, params.puzzle.as_deref())
        .await?;
    Ok(Json(report))
}

/// GET /:game/players/:player/entries
#[instrument(name = "player_entries", skip(state))]
pub async fn player_entries(
    State(state): State<AppState>,
    Path((game, player)): Path<(Game, PlayerId)>,
) -> Result<Json<PlayerEntriesResponse>, AppError> {
    let puzzle_numbers = state.tracker.player_entries(game, &player).await?;
    Ok(Json(PlayerEntriesResponse {
        game,
        player,
        puzzle_numbers,
    }))
}

/// GET /:game/players/:player/entries/detail?puzzles=
#[instrument(name = "entry_detail", skip(state))]
pub async fn entry_detail(
    State(state): State<AppState>,
    Path((game, player)): Path<(Game, PlayerId)>,
    Query(params): Query<DetailParams>,
) -> Result<Json<Vec<EntryDetail>>, AppError> {
    let puzzle_numbers = split_list(&params.puzzles)
        .iter()
        .map(|token| {
            parse_puzzle_token(token).ok_or_else(|| {
                TrackerError::invalid_query(format!("'{token}' is not a puzzle number"))
            })
        })
        .collect::<Result<Vec<PuzzleNumber>, _>>()?;

    if puzzle_numbers.is_empty() {
        return Err(TrackerError::invalid_query("no puzzle numbers given").into());
    }

    let detail = state
        .tracker
        .entry_detail(game, &player, &puzzle_numbers)
        .await?;
    Ok(Json(detail))
}

/// GET /:game/stats?players=
#[instrument(name = "player_stats", skip(state))]
pub async fn player_stats(
    State(state): State<AppState>,
    Path(game): Path<Game>,
    Query(params): Query<StatsParams>,
) -> Result<Json<PlayerStatsReport>, AppError> {
    let players = split_list(&params.players);
    let report = state.tracker.player_stats(game, &players).await?;
    Ok(Json(report))
}

/// DELETE /:game/players/:player/entries/:puzzle
#[instrument(name = "remove_entry", skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    Path((game, player, puzzle_number)): Path<(Game, PlayerId, PuzzleNumber)>,
) -> Result<Json<RemoveEntryResponse>, AppError> {
    let removed = state
        .tracker
        .remove_entry(game, &player, puzzle_number)
        .await?;
    Ok(Json(RemoveEntryResponse { removed }))
}

/// DELETE /:game
#[instrument(name = "reset_game", skip(state))]
pub async fn reset_game(
    State(state): State<AppState>,
    Path(game): Path<Game>,
) -> Result<Json<ResetGameResponse>, AppError> {
    let removed = state.tracker.reset_game(game).await?;
    Ok(Json(ResetGameResponse { game, removed }))
}
