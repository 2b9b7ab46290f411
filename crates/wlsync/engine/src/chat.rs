//! Reconnecting chat client
//!
//! Wraps one message-framed connection to the chat bot API. Reads and writes
//! share the connection; whichever side sees it fail drops it, and the next
//! use re-establishes it under the reconnect policy. Events arriving while
//! the connection is down are lost.

use crate::ingest::EventSource;
use crate::notify::Notifier;
use crate::onebot;
use crate::retry::{retry, Retryable};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use wlsync_types::{ChatEvent, RetryPolicy, RoomId};

/// Chat transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be opened
    #[error("connect failed: {0}")]
    Connect(String),

    /// Peer closed the connection or the socket broke
    #[error("connection closed: {0}")]
    Closed(String),

    /// Credentials or handshake rejected, reconnecting will not help
    #[error("handshake rejected: {0}")]
    Rejected(String),

    /// Reconnection gave up; the process cannot continue
    #[error("reconnect failed: {0}")]
    Reconnect(String),
}

impl Retryable for TransportError {
    fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Connect(_) | TransportError::Closed(_))
    }
}

/// One open text-frame connection.
#[async_trait]
pub trait FrameChannel: Send {
    async fn recv(&mut self) -> Result<String, TransportError>;
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;
}

/// Opens [`FrameChannel`]s.
#[async_trait]
pub trait FrameConnector: Send + Sync {
    type Channel: FrameChannel;

    async fn connect(&self) -> Result<Self::Channel, TransportError>;
}

/// Retry behaviour of the chat client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPolicy {
    /// Attempts to re-open a dropped connection before giving up
    #[serde(default = "default_reconnect")]
    pub reconnect: RetryPolicy,

    /// Attempts to deliver one outbound message
    #[serde(default)]
    pub send: RetryPolicy,
}

fn default_reconnect() -> RetryPolicy {
    RetryPolicy::bounded(5)
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            reconnect: default_reconnect(),
            send: RetryPolicy::unbounded(),
        }
    }
}

/// Chat client bound to one room
pub struct ChatClient<C: FrameConnector> {
    connector: C,
    room: RoomId,
    policy: ChatPolicy,
    channel: Mutex<Option<C::Channel>>,
}

impl<C: FrameConnector> ChatClient<C> {
    /// Open the initial connection. Failure here is a startup error.
    pub async fn connect(
        connector: C,
        room: RoomId,
        policy: ChatPolicy,
    ) -> Result<Self, TransportError> {
        tracing::info!(%room, "connecting to chat");
        let channel = connector.connect().await?;
        Ok(Self {
            connector,
            room,
            policy,
            channel: Mutex::new(Some(channel)),
        })
    }

    async fn reconnect(&self) -> Result<C::Channel, TransportError> {
        retry(&self.policy.reconnect, "chat reconnect", move || {
            self.connector.connect()
        })
        .await
        .map_err(|e| TransportError::Reconnect(e.to_string()))
    }

    async fn read_frame(&self) -> Result<String, TransportError> {
        let mut slot = self.channel.lock().await;
        loop {
            if slot.is_none() {
                tracing::info!("reconnecting to chat");
                *slot = Some(self.reconnect().await?);
            }
            let Some(channel) = slot.as_mut() else {
                continue;
            };
            match channel.recv().await {
                Ok(frame) => return Ok(frame),
                Err(e) => {
                    tracing::warn!(error = %e, "chat read failed");
                    *slot = None;
                }
            }
        }
    }

    async fn try_send(&self, frame: &str) -> Result<(), TransportError> {
        let mut slot = self.channel.lock().await;
        if slot.is_none() {
            *slot = Some(self.reconnect().await?);
        }
        let channel = slot
            .as_mut()
            .ok_or_else(|| TransportError::Closed("no chat connection".to_string()))?;
        match channel.send(frame.to_string()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                *slot = None;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<C: FrameConnector> EventSource for ChatClient<C> {
    async fn next_event(&self) -> Result<ChatEvent, TransportError> {
        loop {
            let frame = self.read_frame().await?;
            match onebot::decode_event(&frame) {
                Ok(event) => return Ok(event),
                Err(e) => {
                    tracing::warn!(error = %e, frame = %frame, "undecodable chat frame");
                }
            }
        }
    }
}

#[async_trait]
impl<C: FrameConnector> Notifier for ChatClient<C> {
    async fn notify(&self, text: &str) -> Result<(), TransportError> {
        let frame = onebot::encode_group_message(self.room, text);
        let frame = frame.as_str();
        retry(&self.policy.send, "chat send", move || self.try_send(frame)).await?;
        tracing::debug!(room = %self.room, text, "notified room");
        Ok(())
    }
}
