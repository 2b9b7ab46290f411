//! Outbound notifications to the chat room
//!
//! Every claim and release outcome ends up in the room as plain text. There
//! is no other user-facing status channel.

use crate::chat::TransportError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use wlsync_types::{Account, DisplayName};

/// Sends plain text to the configured room.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), TransportError>;
}

#[async_trait]
impl<T> Notifier for Arc<T>
where
    T: Notifier + ?Sized,
{
    async fn notify(&self, text: &str) -> Result<(), TransportError> {
        (**self).notify(text).await
    }
}

/// User-visible outcome of a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Sanitized acknowledgment text from the server console
    Acknowledged(String),

    /// The name service could not map the requested name
    ResolutionFailed {
        claimant: Account,
        requested: DisplayName,
        reason: String,
    },

    /// The store could not be consulted, claim abandoned without changes
    LookupFailed {
        claimant: Account,
        requested: DisplayName,
        reason: String,
    },

    /// Someone else already owns the identity
    Conflict {
        owner: Account,
        claimant: Account,
        display_name: DisplayName,
    },

    /// A claim went through; the account now plays as `display_name`
    Claimed {
        account: Account,
        display_name: DisplayName,
    },

    /// A departed member's identity was released
    Released {
        account: Account,
        display_name: DisplayName,
    },

    /// Startup announcement
    Online,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Acknowledged(text) => f.write_str(text),
            Notice::ResolutionFailed {
                claimant,
                requested,
                reason,
            } => write!(
                f,
                "{} could not look up {requested}: {reason}",
                claimant.mention()
            ),
            Notice::LookupFailed {
                claimant,
                requested,
                reason,
            } => write!(
                f,
                "{} could not check who owns {requested}: {reason}",
                claimant.mention()
            ),
            Notice::Conflict {
                owner,
                claimant,
                display_name,
            } => write!(
                f,
                "{} holds {display_name}, {} cannot claim it",
                owner.mention(),
                claimant.mention()
            ),
            Notice::Claimed {
                account,
                display_name,
            } => write!(f, "{} is now whitelisted as {display_name}", account.mention()),
            Notice::Released {
                account,
                display_name,
            } => write!(f, "released {display_name} claimed by {}", account.mention()),
            Notice::Online => f.write_str("whitelist sync online"),
        }
    }
}
