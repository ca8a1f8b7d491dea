// Library crate for the puzzle tracker
// This file exposes the public API for integration tests

pub mod config;
pub mod entry;
pub mod puzzle;
pub mod shared;
pub mod stats;
pub mod user;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

// Re-export commonly used types for easier access in tests
pub use entry::{Entry, EntryRepository, InMemoryEntryRepository, PostgresEntryRepository};
pub use puzzle::{Game, PuzzleCalendar, PuzzleNumber};
pub use shared::{AppError, AppState};
pub use stats::{TrackerError, TrackerService};

/// Every HTTP route of the tracker, bound to `state`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/submissions", post(stats::handlers::submit_message))
        .route("/:game", delete(stats::handlers::reset_game))
        .route("/:game/entries", post(stats::handlers::submit_entry))
        .route("/:game/ranks", get(stats::handlers::rank))
        .route("/:game/missing", get(stats::handlers::missing))
        .route("/:game/stats", get(stats::handlers::player_stats))
        .route(
            "/:game/players/:player/entries",
            get(stats::handlers::player_entries),
        )
        .route(
            "/:game/players/:player/entries/detail",
            get(stats::handlers::entry_detail),
        )
        .route(
            "/:game/players/:player/entries/:puzzle",
            delete(stats::handlers::remove_entry),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
