//! Reconnecting, retrying gateway over any command channel

use super::{
    add_command, AccessListGateway, GatewayError, GatewayPolicy, GatewayResult, RemoveBy,
};
use crate::retry::retry;
use async_trait::async_trait;
use tokio::sync::Mutex;
use wlsync_types::{DisplayName, IdentityKey};

/// One authenticated console session.
#[async_trait]
pub trait CommandChannel: Send {
    async fn execute(&mut self, command: &str) -> GatewayResult<String>;
}

/// Opens [`CommandChannel`]s.
#[async_trait]
pub trait RconConnector: Send + Sync {
    type Channel: CommandChannel;

    async fn connect(&self) -> GatewayResult<Self::Channel>;
}

/// [`AccessListGateway`] that survives connection loss.
///
/// A failed command drops the session; the next attempt opens a new one
/// under `policy.reconnect`. Exhausting reconnects is fatal, everything
/// else is retried under `policy.command`.
pub struct RetryingGateway<C: RconConnector> {
    connector: C,
    policy: GatewayPolicy,
    remove_by: RemoveBy,
    channel: Mutex<Option<C::Channel>>,
}

impl<C: RconConnector> RetryingGateway<C> {
    /// Open the initial session. Failure here is a startup error.
    pub async fn connect(
        connector: C,
        policy: GatewayPolicy,
        remove_by: RemoveBy,
    ) -> GatewayResult<Self> {
        let channel = connector.connect().await?;
        Ok(Self {
            connector,
            policy,
            remove_by,
            channel: Mutex::new(Some(channel)),
        })
    }

    async fn reconnect(&self) -> GatewayResult<C::Channel> {
        retry(&self.policy.reconnect, "rcon reconnect", move || {
            self.connector.connect()
        })
        .await
        .map_err(|e| GatewayError::Reconnect(e.to_string()))
    }

    async fn attempt(&self, command: &str) -> GatewayResult<String> {
        let mut slot = self.channel.lock().await;
        if slot.is_none() {
            tracing::info!("reconnecting to rcon");
            *slot = Some(self.reconnect().await?);
        }
        let channel = slot
            .as_mut()
            .ok_or_else(|| GatewayError::Transport("no rcon session".to_string()))?;
        match channel.execute(command).await {
            Ok(ack) => Ok(ack),
            Err(e) => {
                *slot = None;
                Err(e)
            }
        }
    }

    async fn dispatch(&self, command: String) -> GatewayResult<String> {
        let cmd = command.as_str();
        let ack = retry(&self.policy.command, "rcon command", move || {
            self.attempt(cmd)
        })
        .await?;
        tracing::info!(command = cmd, ack = %ack, "whitelist command applied");
        Ok(ack)
    }
}

#[async_trait]
impl<C: RconConnector> AccessListGateway for RetryingGateway<C> {
    async fn add(&self, name: &DisplayName) -> GatewayResult<String> {
        self.dispatch(add_command(name)).await
    }

    async fn remove(&self, name: &DisplayName, identity: &IdentityKey) -> GatewayResult<String> {
        self.dispatch(self.remove_by.command(name, identity)).await
    }
}
