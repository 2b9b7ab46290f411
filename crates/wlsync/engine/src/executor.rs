//! Effect executor

use crate::error::EngineResult;
use crate::gateway::{sanitize, AccessListGateway};
use crate::notify::{Notice, Notifier};
use crate::plan::Effect;
use std::sync::Arc;
use wlsync_store::BindingStore;

/// Applies planned effects strictly in order.
///
/// The first failing effect aborts the rest of the plan. Acknowledgments
/// from the access list are echoed to the room as they arrive; empty ones
/// are dropped.
pub struct Executor {
    store: Arc<dyn BindingStore>,
    gateway: Arc<dyn AccessListGateway>,
    notifier: Arc<dyn Notifier>,
}

impl Executor {
    pub fn new(
        store: Arc<dyn BindingStore>,
        gateway: Arc<dyn AccessListGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
        }
    }

    pub async fn apply(&self, effects: &[Effect]) -> EngineResult<()> {
        for effect in effects {
            self.apply_one(effect).await?;
        }
        Ok(())
    }

    async fn apply_one(&self, effect: &Effect) -> EngineResult<()> {
        match effect {
            Effect::StoreDelete { identity } => {
                let existed = self.store.delete(identity).await?;
                tracing::info!(%identity, existed, "binding deleted");
            }
            Effect::StoreInsert {
                account,
                display_name,
                identity,
            } => {
                self.store.insert(*account, display_name, identity).await?;
                tracing::info!(%account, %display_name, %identity, "binding inserted");
            }
            Effect::GatewayRemove {
                display_name,
                identity,
            } => {
                let ack = self.gateway.remove(display_name, identity).await?;
                self.acknowledge(&ack).await?;
            }
            Effect::GatewayAdd { display_name } => {
                let ack = self.gateway.add(display_name).await?;
                self.acknowledge(&ack).await?;
            }
            Effect::Notify(notice) => {
                self.notifier.notify(&notice.to_string()).await?;
            }
        }
        Ok(())
    }

    async fn acknowledge(&self, ack: &str) -> EngineResult<()> {
        let text = sanitize(ack);
        if text.trim().is_empty() {
            return Ok(());
        }
        self.notifier
            .notify(&Notice::Acknowledged(text).to_string())
            .await?;
        Ok(())
    }
}
