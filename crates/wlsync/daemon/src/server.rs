//! Server setup and lifecycle management

use crate::config::{DaemonConfig, StoreConfig};
use crate::error::{DaemonError, DaemonResult};
use crate::ws::WsConnector;
use std::sync::Arc;
use wlsync_engine::{
    ChatClient, IngestLoop, MojangResolver, Notice, Notifier, ReconciliationEngine,
    RetryingGateway, TcpRconConnector,
};
use wlsync_store::{BindingStore, InMemoryBindingStore, MySqlBindingStore};

/// wlsync daemon: every collaborator connected, ready to process events
pub struct Server {
    ingest: IngestLoop,
    chat: Arc<ChatClient<WsConnector>>,
    announce_startup: bool,
}

impl Server {
    /// Connect store, name service, RCON and chat, in that order.
    ///
    /// Any failure here aborts startup.
    pub async fn connect(config: DaemonConfig) -> DaemonResult<Self> {
        config.validate().map_err(DaemonError::Config)?;
        let room = config.room_id();

        let store = open_store(&config.store).await?;
        let live = store.list().await?.len();
        tracing::info!(bindings = live, "binding store ready");

        let resolver = Arc::new(MojangResolver::new(&config.resolver)?);

        tracing::info!(addr = %config.rcon.addr, remove_by = ?config.rcon.remove_by, "connecting to rcon");
        let gateway = RetryingGateway::connect(
            TcpRconConnector::new(config.rcon.addr.clone(), config.rcon.password.clone()),
            config.rcon.policy.clone(),
            config.rcon.remove_by,
        )
        .await?;
        let gateway = Arc::new(gateway);

        let chat = ChatClient::connect(
            WsConnector::new(config.chat.url.clone(), config.chat.token.clone()),
            room,
            config.chat.policy.clone(),
        )
        .await?;
        let chat = Arc::new(chat);

        let engine = ReconciliationEngine::new(resolver, store, gateway, chat.clone());

        Ok(Self {
            ingest: IngestLoop::new(room, engine),
            chat,
            announce_startup: config.announce_startup,
        })
    }

    /// Process events until a shutdown signal or a fatal error.
    pub async fn run(self) -> DaemonResult<()> {
        if self.announce_startup {
            self.chat.notify(&Notice::Online.to_string()).await?;
        }

        self.ingest.run(self.chat.as_ref(), shutdown_signal()).await?;

        tracing::info!("wlsyncd shutting down");
        Ok(())
    }
}

async fn open_store(config: &StoreConfig) -> DaemonResult<Arc<dyn BindingStore>> {
    match config {
        StoreConfig::Memory => {
            tracing::warn!("using in-memory binding store, bindings are lost on restart");
            Ok(Arc::new(InMemoryBindingStore::new()))
        }
        StoreConfig::MySql {
            url,
            max_connections,
            connect_timeout_secs,
        } => {
            let store =
                MySqlBindingStore::connect_with_options(url, *max_connections, *connect_timeout_secs)
                    .await?;
            Ok(Arc::new(store))
        }
    }
}

/// Resolves on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!(signal = "SIGINT", "shutdown requested");
        }
        _ = terminate => {
            tracing::info!(signal = "SIGTERM", "shutdown requested");
        }
    }
}
