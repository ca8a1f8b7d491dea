use std::sync::Arc;

use puzzle_tracker::{
    build_router,
    config::AppConfig,
    entry::{EntryRepository, InMemoryEntryRepository, PostgresEntryRepository},
    puzzle::SystemClock,
    AppState, TrackerService,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "puzzle_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(message) = run().await {
        error!(%message, "Puzzle tracker stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = AppConfig::from_env().map_err(|e| e.to_string())?;
    info!(bind_addr = %config.bind_addr, utc_offset_hours = config.utc_offset_hours, "Starting puzzle tracker");

    let repository: Arc<dyn EntryRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url)
                .await
                .map_err(|e| format!("Failed to connect to database: {e}"))?;
            let repository = PostgresEntryRepository::new(pool);
            repository
                .ensure_schema()
                .await
                .map_err(|e| e.to_string())?;
            info!("Using Postgres entry store");
            Arc::new(repository)
        }
        None => {
            info!("DATABASE_URL not set, using in-memory entry store");
            Arc::new(InMemoryEntryRepository::new())
        }
    };

    let tracker = TrackerService::builder(repository)
        .with_clock(Arc::new(SystemClock::with_offset_hours(
            config.utc_offset_hours,
        )))
        .build();
    let app = build_router(AppState::new(Arc::new(tracker)));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {e}", config.bind_addr))?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {e}"))
}
