// src/main.rs

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use tripboard_api::{
    app::{create_app, AppState},
    config::Config,
    db,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment (incl. .env) is read once here and passed down
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tripboard_api=info,tower_http=info")),
        )
        .init();

    let store = db::connect(&config.store)?;
    let state = AppState::new(&config, Arc::new(store))?;
    let app = create_app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, page_limit = config.store.page_limit, "analytics API listening");

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
