//! Access-list gateway
//!
//! Issues `whitelist add` / `whitelist remove` against the game server and
//! returns the console's acknowledgment. Callers have already committed the
//! matching store write, so the production gateway never gives up on a
//! transient failure; it reconnects and retries the same command.

mod rcon;
mod retrying;

pub use rcon::{Packet, PacketKind, RconConnection, TcpRconConnector, MAX_PAYLOAD};
pub use retrying::{CommandChannel, RconConnector, RetryingGateway};

use crate::retry::Retryable;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use wlsync_types::{DisplayName, IdentityKey, RetryPolicy};

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Socket-level failure, the connection is dropped and re-opened
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed or unexpected packet
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Password rejected by the server
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Reconnection gave up; the process cannot continue
    #[error("reconnect failed: {0}")]
    Reconnect(String),
}

impl Retryable for GatewayError {
    fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_) | GatewayError::Protocol(_))
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

/// Remote whitelist operations.
#[async_trait]
pub trait AccessListGateway: Send + Sync {
    /// Allow `name` to join. Returns the raw acknowledgment.
    async fn add(&self, name: &DisplayName) -> GatewayResult<String>;

    /// Revoke a binding's access. Returns the raw acknowledgment.
    async fn remove(&self, name: &DisplayName, identity: &IdentityKey) -> GatewayResult<String>;
}

#[async_trait]
impl<T> AccessListGateway for Arc<T>
where
    T: AccessListGateway + ?Sized,
{
    async fn add(&self, name: &DisplayName) -> GatewayResult<String> {
        (**self).add(name).await
    }

    async fn remove(&self, name: &DisplayName, identity: &IdentityKey) -> GatewayResult<String> {
        (**self).remove(name, identity).await
    }
}

/// What `whitelist remove` is addressed by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoveBy {
    /// Hyphenated identity key, survives renames
    #[default]
    Identity,
    /// Display name as stored with the binding
    Name,
}

impl RemoveBy {
    pub fn command(self, name: &DisplayName, identity: &IdentityKey) -> String {
        match self {
            RemoveBy::Identity => format!("whitelist remove {identity}"),
            RemoveBy::Name => format!("whitelist remove {name}"),
        }
    }
}

pub fn add_command(name: &DisplayName) -> String {
    format!("whitelist add {name}")
}

/// Retry behaviour of the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayPolicy {
    /// Attempts per whitelist command
    #[serde(default)]
    pub command: RetryPolicy,

    /// Attempts to re-open the console connection before giving up
    #[serde(default = "default_reconnect")]
    pub reconnect: RetryPolicy,
}

fn default_reconnect() -> RetryPolicy {
    RetryPolicy::bounded(5)
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        Self {
            command: RetryPolicy::unbounded(),
            reconnect: default_reconnect(),
        }
    }
}

fn format_code() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("§.").expect("static pattern"))
}

/// Strip Minecraft formatting codes (`§` plus one character).
pub fn sanitize(ack: &str) -> String {
    format_code().replace_all(ack, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_sanitize_strips_format_codes() {
        assert_eq!(sanitize("§eAdded §lSteve§r to the whitelist"), "Added Steve to the whitelist");
        assert_eq!(sanitize("plain"), "plain");
        assert_eq!(sanitize("§"), "§");
    }

    #[test]
    fn test_commands() {
        let name = DisplayName::parse("Steve").unwrap();
        let identity = IdentityKey::from_uuid(Uuid::nil());
        assert_eq!(add_command(&name), "whitelist add Steve");
        assert_eq!(
            RemoveBy::Identity.command(&name, &identity),
            "whitelist remove 00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(RemoveBy::Name.command(&name, &identity), "whitelist remove Steve");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(GatewayError::Transport("x".into()).is_retryable());
        assert!(GatewayError::Protocol("x".into()).is_retryable());
        assert!(!GatewayError::Auth("x".into()).is_retryable());
        assert!(!GatewayError::Reconnect("x".into()).is_retryable());
    }
}
