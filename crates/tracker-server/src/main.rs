//! Position relay server for the shared map tracker.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracker_server::config::Config;
use tracker_server::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    info!(
        "Starting tracker-server on {}:{} (max_clients = {})",
        config.bind_addr, config.port, config.max_clients
    );

    tokio::select! {
        res = server::run(config) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    }
}
