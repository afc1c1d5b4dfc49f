//! Pressbox Web Server
//!
//! Run with: cargo run -p pressbox-web

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use pressbox_store::PgNewsStore;
use pressbox_web::config::Config;
use pressbox_web::router::build_router;
use pressbox_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pressbox=debug,info")),
        )
        .init();

    info!("Pressbox starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;

    let store =
        PgNewsStore::connect(&config.database.url, config.database.max_connections).await?;
    store.ensure_schema().await?;
    info!("Database connected, news schema ready.");

    let state = AppState::new(Arc::new(store));
    let app = build_router(state);

    let addr = config.bind_addr();
    info!("Server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
