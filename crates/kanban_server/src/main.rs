use anyhow::Context;
use kanban_core::db::open_db_url;
use kanban_server::{build_app, AppState, Config};
use log::info;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    kanban_core::init_logging(config.log_level(), config.log_dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let direct_url = config.direct_url.clone();
    tokio::task::spawn_blocking(move || open_db_url(&direct_url).map(drop))
        .await?
        .context("failed to migrate database")?;

    let state = AppState::from_config(&config)?;
    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        "event=server_start module=main status=ok addr={} env={}",
        addr, config.environment
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=main status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("event=server_shutdown module=main status=requested");
    }
}
