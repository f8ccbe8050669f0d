//! Circulation server bootstrap
//!
//! Prepares the database for the circulation core: applies migrations,
//! seeds the default genres and reports the current circulation state.

use chrono::Local;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use circulation_server::{config::AppConfig, repository::Repository, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("circulation_server={},sqlx=warn", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting circulation server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations completed");

    let state = AppState::new(config, Repository::new(pool))?;

    let seeded = state
        .services
        .catalog
        .seed_genres(&state.config.catalog.default_genres)
        .await?;

    let summary = state
        .services
        .penalties
        .circulation_summary(Local::now().date_naive())
        .await?;

    tracing::info!(
        seeded_genres = seeded,
        active_checkouts = summary.active_checkouts,
        overdue_checkouts = summary.overdue_checkouts,
        per_day_rate = %state.config.penalties.per_day_rate,
        "Circulation core ready"
    );

    Ok(())
}
