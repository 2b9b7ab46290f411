//! wlsync types - shared vocabulary for whitelist synchronization
//!
//! wlsync keeps a Minecraft server whitelist in step with a chat room: every
//! chat account may claim one in-game identity, and loses it when it leaves
//! the room.
//!
//! ## Key Concepts
//!
//! - **Account**: stable numeric id of a chat participant
//! - **IdentityKey**: stable 128-bit id of an in-game profile
//! - **DisplayName**: validated in-game name (3 to 16 word characters)
//! - **Binding**: one account owning one identity
//! - **ChatEvent**: the two chat facts the engine reacts to
//! - **RetryPolicy**: backoff parameters shared by every reconnecting client

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod binding;
pub mod claim;
pub mod event;
pub mod ids;
pub mod retry;

pub use binding::Binding;
pub use claim::{parse_claim, CLAIM_PREFIX};
pub use event::ChatEvent;
pub use ids::{Account, DisplayName, IdentityKey, InvalidDisplayName, Mention, RoomId};
pub use retry::{Backoff, RetryPolicy};
