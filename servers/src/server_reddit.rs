use anyhow::{Context, Result};
use lib_common::sources::reddit::RedditClient;
use std::sync::Arc;
use tokio::signal;

mod reddit_logic;
use reddit_logic::{config, downstream, logger, routes, state};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config::Loaded { config, notes } = config::load_config();
    logger::setup_logging(&config.log_dir(), config.log_level())?;
    for (level, note) in notes {
        log::log!(level, "{}", note);
    }

    let reddit_config = config.reddit_config()?;
    let client = RedditClient::new(reddit_config).context("failed to build Reddit client")?;
    log::info!("Upstream configured: {:?}", client.config());

    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
    let app_state = state::AppState::new(Arc::new(client), config.poll_interval());

    let downstream_handle = tokio::spawn(downstream::run(
        config.clone(),
        app_state.clone(),
        shutdown_tx.subscribe(),
    ));

    let routes_handle = tokio::spawn(routes::run(
        config.clone(),
        app_state.clone(),
        shutdown_tx.subscribe(),
    ));

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = terminate() => {
            log::info!("SIGTERM received, initiating shutdown.");
        }
    }

    // Send shutdown signal to all components
    let _ = shutdown_tx.send(());

    let (downstream_result, routes_result) = tokio::try_join!(downstream_handle, routes_handle)?;
    downstream_result?;
    routes_result?;

    log::info!("Shutdown complete ({} sessions still connected).", app_state.connected());
    Ok(())
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut term_signal) => {
            term_signal.recv().await;
        }
        Err(e) => {
            log::warn!("Could not install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    // On non-unix platforms, just wait forever.
    std::future::pending::<()>().await;
}
