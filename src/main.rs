//! League console binary: wires the league backend client, the live board
//! timers and the REST/SSE routes.

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use league_console::{
    config::AppConfig,
    dao::league_backend::rest::RestLeagueBackend,
    routes,
    services::board_supervisor,
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let backend = RestLeagueBackend::new(&config.backend_url, config.request_timeout)
        .context("building league backend client")?;
    info!(backend_url = %config.backend_url, "league backend configured");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app_state = AppState::new(config, std::sync::Arc::new(backend));

    // First poll fires immediately, so the board fills before traffic arrives.
    let tasks = board_supervisor::spawn(app_state.clone());
    let app = build_router(app_state);

    info!(%addr, "starting server");
    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    drop(tasks);
    info!("league console stopped");
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
