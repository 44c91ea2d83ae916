use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use outfit_api::api::{create_router, AppState};
use outfit_api::config::Config;
use outfit_api::services::{sessions::SWEEP_INTERVAL, Catalog, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("outfit_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // A catalog that cannot be loaded is fatal; bad rows were already logged and dropped
    let (catalog, report) = Catalog::load(&config.catalog_path).map_err(|e| {
        tracing::error!(path = %config.catalog_path.display(), error = %e, "Catalog load failed");
        e
    })?;
    if catalog.is_empty() {
        tracing::warn!(
            rows_read = report.rows_read,
            "Catalog has no usable rows; every recommendation will come back empty"
        );
    }

    let state = AppState::from_config(&config, catalog)?;
    SessionStore::spawn_sweeper(&state.sessions, SWEEP_INTERVAL);
    tracing::info!(
        ttl_secs = config.session_ttl_secs,
        max_sessions = config.max_sessions,
        "Session expiry enabled"
    );
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
