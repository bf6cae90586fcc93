mod api;
mod router;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_config() -> auraverse_core::Config {
    auraverse_core::config::load_dotenv();
    auraverse_core::Config::from_env()
}

async fn serve(config: &auraverse_core::Config) -> anyhow::Result<()> {
    config.log_summary();

    let store_dir = &config.storage.store_dir;
    let state = state::AppState::open(store_dir)
        .with_context(|| format!("failed to open store at {}", store_dir.display()))?;
    info!("Raw store ready at {}", state.ingest.store().root().display());

    let app = router::build_router(Arc::new(state), &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);
    info!("Upload form at http://localhost:{}/, API docs at /docs", config.server.port);
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let config = load_config();
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None | Some("serve") => serve(&config).await?,
        _ => {
            println!("auraverse-server v{}", env!("CARGO_PKG_VERSION"));
            println!("Usage: auraverse-server [serve]");
            println!("  serve    Start the ingestion HTTP server (default)");
        }
    }

    Ok(())
}
