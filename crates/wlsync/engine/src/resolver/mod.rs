//! Identity resolution
//!
//! Maps a typed in-game name to the canonical name and stable identity key
//! the name pointed at at a given time. Resolution is never retried: a
//! failure goes straight back to the claimant.

mod mojang;

pub use mojang::{MojangResolver, ResolverConfig};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use wlsync_types::{DisplayName, IdentityKey};

/// Resolution errors
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// No profile carries this name
    #[error("no profile named {0}")]
    Unknown(DisplayName),

    /// The lookup service answered with an error status
    #[error("lookup service returned {0}")]
    Service(String),

    /// The lookup service could not be reached
    #[error("lookup service unreachable: {0}")]
    Transport(String),

    /// The lookup service answered with something we cannot read
    #[error("invalid lookup response: {0}")]
    InvalidResponse(String),
}

/// Canonical profile a name resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// Name with the casing the service reports
    pub display_name: DisplayName,
    pub identity: IdentityKey,
}

/// Name to identity lookup.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(
        &self,
        name: &DisplayName,
        as_of: DateTime<Utc>,
    ) -> Result<ResolvedIdentity, ResolutionError>;
}

#[async_trait]
impl<T> IdentityResolver for Arc<T>
where
    T: IdentityResolver + ?Sized,
{
    async fn resolve(
        &self,
        name: &DisplayName,
        as_of: DateTime<Utc>,
    ) -> Result<ResolvedIdentity, ResolutionError> {
        (**self).resolve(name, as_of).await
    }
}
