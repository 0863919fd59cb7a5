use std::env;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use regsense_backend::core::logging;
use regsense_backend::server::router::router;
use regsense_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize().await?;
    logging::init(&state.paths);

    if !state.provider.health_check().await.unwrap_or(false) {
        tracing::warn!(
            "Model provider at {} is not reachable; queries and uploads will fail until it is",
            state.settings.provider.base_url
        );
    }

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(state.settings.server.port);
    let bind_addr = format!("{}:{}", state.settings.server.host, port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = router(state.clone());
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
