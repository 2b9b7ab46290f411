//! Reconciliation planner
//!
//! Pure functions from looked-up facts to an ordered list of effects. The
//! order is the contract: store writes come before the matching remote
//! call, and an old binding is always released before a new one is added.

use crate::notify::Notice;
use crate::resolver::ResolvedIdentity;
use wlsync_types::{Account, Binding, DisplayName, IdentityKey};

/// One side effect, applied in list order by the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StoreDelete {
        identity: IdentityKey,
    },
    StoreInsert {
        account: Account,
        display_name: DisplayName,
        identity: IdentityKey,
    },
    GatewayRemove {
        display_name: DisplayName,
        identity: IdentityKey,
    },
    GatewayAdd {
        display_name: DisplayName,
    },
    Notify(Notice),
}

/// Everything the planner needs to decide a claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimFacts {
    /// The name service rejected the requested name
    Unresolved {
        claimant: Account,
        requested: DisplayName,
        reason: String,
    },

    /// The store could not be read
    LookupFailed {
        claimant: Account,
        requested: DisplayName,
        reason: String,
    },

    Resolved {
        claimant: Account,
        resolved: ResolvedIdentity,
        /// Current owner of `resolved.identity`
        owner: Option<Account>,
        /// Claimant's current binding
        current: Option<Binding>,
    },
}

/// Decide a claim.
pub fn plan_claim(facts: ClaimFacts) -> Vec<Effect> {
    match facts {
        ClaimFacts::Unresolved {
            claimant,
            requested,
            reason,
        } => vec![Effect::Notify(Notice::ResolutionFailed {
            claimant,
            requested,
            reason,
        })],

        ClaimFacts::LookupFailed {
            claimant,
            requested,
            reason,
        } => vec![Effect::Notify(Notice::LookupFailed {
            claimant,
            requested,
            reason,
        })],

        ClaimFacts::Resolved {
            claimant,
            resolved,
            owner,
            current,
        } => {
            let ResolvedIdentity {
                display_name,
                identity,
            } = resolved;

            if let Some(owner) = owner.filter(|owner| *owner != claimant) {
                return vec![Effect::Notify(Notice::Conflict {
                    owner,
                    claimant,
                    display_name,
                })];
            }

            let claimed = Effect::Notify(Notice::Claimed {
                account: claimant,
                display_name: display_name.clone(),
            });

            // Re-claiming the same profile only re-asserts the access list.
            if current
                .as_ref()
                .is_some_and(|b| b.matches(&display_name, &identity))
            {
                return vec![Effect::GatewayAdd { display_name }, claimed];
            }

            let mut effects = Vec::with_capacity(5);
            if let Some(old) = current {
                effects.push(Effect::StoreDelete {
                    identity: old.identity,
                });
                effects.push(Effect::GatewayRemove {
                    display_name: old.display_name,
                    identity: old.identity,
                });
            }
            effects.push(Effect::StoreInsert {
                account: claimant,
                display_name: display_name.clone(),
                identity,
            });
            effects.push(Effect::GatewayAdd { display_name });
            effects.push(claimed);
            effects
        }
    }
}

/// Decide what a departing member loses.
pub fn plan_release(account: Account, current: Option<Binding>) -> Vec<Effect> {
    let Some(binding) = current else {
        return Vec::new();
    };
    vec![
        Effect::StoreDelete {
            identity: binding.identity,
        },
        Effect::GatewayRemove {
            display_name: binding.display_name.clone(),
            identity: binding.identity,
        },
        Effect::Notify(Notice::Released {
            account,
            display_name: binding.display_name,
        }),
    ]
}
