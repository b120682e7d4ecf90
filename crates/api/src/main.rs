//! Cradle API server binary

use anyhow::Context;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use cradle_api::{routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cradle_api=info,tower_http=info")),
        )
        .init();

    // Missing secrets stop the process here, before any traffic is accepted
    let config = Config::from_env().context("invalid configuration")?;
    let bind_address = config.bind_address.clone();

    let pool = cradle_shared::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to database")?;

    cradle_shared::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let state = AppState::new(pool, config);
    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    tracing::info!(address = %bind_address, "Cradle API listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
