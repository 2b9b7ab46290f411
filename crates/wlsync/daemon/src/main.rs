//! wlsyncd - whitelist synchronization daemon
//!
//! Watches one chat room over the OneBot websocket API and keeps the
//! Minecraft server whitelist in step with it:
//! - `MyID=<name>` binds the sender to that in-game profile
//! - leaving the room releases the binding

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod server;
mod ws;

use config::DaemonConfig;
use error::{DaemonError, DaemonResult};
use server::Server;

/// wlsync daemon CLI
#[derive(Parser)]
#[command(name = "wlsyncd")]
#[command(about = "Keeps a Minecraft whitelist in step with a chat room", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WLSYNC_CONFIG")]
    config: Option<String>,

    /// Log level
    #[arg(long, env = "WLSYNC_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "WLSYNC_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = DaemonConfig::load(cli.config.as_deref()).map_err(DaemonError::from)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        room = config.room,
        "wlsyncd starting"
    );

    let result = match Server::connect(config).await {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        tracing::error!(error = %e, "wlsyncd stopped");
    }
    result
}
