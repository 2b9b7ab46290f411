//! Reconciliation engine
//!
//! Gathers the facts for one trigger, asks the planner what to do and hands
//! the plan to the executor. Holds no state between triggers.

use crate::error::EngineResult;
use crate::executor::Executor;
use crate::gateway::AccessListGateway;
use crate::notify::Notifier;
use crate::plan::{plan_claim, plan_release, ClaimFacts, Effect};
use crate::resolver::IdentityResolver;
use chrono::Utc;
use std::sync::Arc;
use wlsync_store::{BindingStore, StoreResult};
use wlsync_types::{Account, Binding, DisplayName, IdentityKey};

pub struct ReconciliationEngine {
    resolver: Arc<dyn IdentityResolver>,
    store: Arc<dyn BindingStore>,
    executor: Executor,
}

impl ReconciliationEngine {
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        store: Arc<dyn BindingStore>,
        gateway: Arc<dyn AccessListGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let executor = Executor::new(store.clone(), gateway, notifier);
        Self {
            resolver,
            store,
            executor,
        }
    }

    /// Handle `MyID=<requested>` from `claimant`.
    ///
    /// Returns the effects that were applied.
    pub async fn handle_claim(
        &self,
        claimant: Account,
        requested: &DisplayName,
    ) -> EngineResult<Vec<Effect>> {
        tracing::info!(%claimant, %requested, "claim requested");
        let facts = self.claim_facts(claimant, requested).await;
        let effects = plan_claim(facts);
        self.executor.apply(&effects).await?;
        Ok(effects)
    }

    /// Handle `account` leaving the room. A failed lookup is fatal.
    pub async fn handle_membership_loss(&self, account: Account) -> EngineResult<Vec<Effect>> {
        let current = self.store.find_by_account(account).await?;
        if current.is_none() {
            tracing::debug!(%account, "departed member held no binding");
        }
        let effects = plan_release(account, current);
        self.executor.apply(&effects).await?;
        Ok(effects)
    }

    async fn claim_facts(&self, claimant: Account, requested: &DisplayName) -> ClaimFacts {
        let resolved = match self.resolver.resolve(requested, Utc::now()).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::info!(%claimant, %requested, error = %e, "claim not resolvable");
                return ClaimFacts::Unresolved {
                    claimant,
                    requested: requested.clone(),
                    reason: e.to_string(),
                };
            }
        };

        match self.lookup(claimant, &resolved.identity).await {
            Ok((owner, current)) => ClaimFacts::Resolved {
                claimant,
                resolved,
                owner,
                current,
            },
            Err(e) => {
                tracing::error!(%claimant, %requested, error = %e, "binding lookup failed");
                ClaimFacts::LookupFailed {
                    claimant,
                    requested: requested.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn lookup(
        &self,
        claimant: Account,
        identity: &IdentityKey,
    ) -> StoreResult<(Option<Account>, Option<Binding>)> {
        let owner = self.store.find_by_identity(identity).await?;
        let current = self.store.find_by_account(claimant).await?;
        Ok((owner, current))
    }
}
