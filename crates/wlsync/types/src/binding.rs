//! Binding record

use crate::{Account, DisplayName, IdentityKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One account's claim on one in-game identity
///
/// Bindings are never edited in place. A new claim deletes the old row and
/// inserts a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub account: Account,
    pub display_name: DisplayName,
    pub identity: IdentityKey,
    pub created_at: DateTime<Utc>,
}

impl Binding {
    pub fn new(account: Account, display_name: DisplayName, identity: IdentityKey) -> Self {
        Self {
            account,
            display_name,
            identity,
            created_at: Utc::now(),
        }
    }

    /// Same identity under the same canonical name.
    pub fn matches(&self, display_name: &DisplayName, identity: &IdentityKey) -> bool {
        self.identity == *identity && self.display_name == *display_name
    }
}
