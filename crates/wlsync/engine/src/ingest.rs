//! Event ingestion loop
//!
//! Pulls one chat event at a time and runs it to completion before asking
//! for the next. Shutdown is only observed while waiting for an event.

use crate::chat::TransportError;
use crate::engine::ReconciliationEngine;
use crate::error::EngineError;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use wlsync_types::{parse_claim, ChatEvent, RoomId};

/// Source of decoded chat events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Next event. Reconnects internally; an error is unrecoverable.
    async fn next_event(&self) -> Result<ChatEvent, TransportError>;
}

#[async_trait]
impl<T> EventSource for Arc<T>
where
    T: EventSource + ?Sized,
{
    async fn next_event(&self) -> Result<ChatEvent, TransportError> {
        (**self).next_event().await
    }
}

/// Errors that stop the loop
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("event source failed: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Sequential dispatcher for one room
pub struct IngestLoop {
    room: RoomId,
    engine: ReconciliationEngine,
}

impl IngestLoop {
    pub fn new(room: RoomId, engine: ReconciliationEngine) -> Self {
        Self { room, engine }
    }

    /// Run until `shutdown` resolves or a fatal error occurs.
    pub async fn run<S, F>(&self, source: &S, shutdown: F) -> Result<(), IngestError>
    where
        S: EventSource + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(room = %self.room, "ingest loop started");

        loop {
            let event = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, ingest loop stopping");
                    return Ok(());
                }
                event = source.next_event() => event?,
            };
            self.dispatch(event).await?;
        }
    }

    /// Route one event to the engine.
    pub async fn dispatch(&self, event: ChatEvent) -> Result<(), IngestError> {
        match event {
            ChatEvent::Message { room, sender, text } if room == self.room => {
                let Some(requested) = parse_claim(&text) else {
                    return Ok(());
                };
                self.engine.handle_claim(sender, &requested).await?;
            }
            ChatEvent::MembershipDecrease { room, account } if room == self.room => {
                tracing::info!(%account, "member left");
                self.engine.handle_membership_loss(account).await?;
            }
            other => {
                tracing::trace!(event = ?other, "ignoring event");
            }
        }
        Ok(())
    }
}
