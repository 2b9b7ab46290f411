//! Configuration for wlsyncd
//!
//! Layered as built-in defaults, then an optional file, then `WLSYNC_*`
//! environment variables (`__` separates nested keys, e.g.
//! `WLSYNC_RCON__PASSWORD`).

use serde::{Deserialize, Serialize};
use wlsync_engine::{ChatPolicy, GatewayPolicy, RemoveBy, ResolverConfig};
use wlsync_types::RoomId;

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Chat room whose members may claim whitelist slots
    #[serde(default)]
    pub room: u64,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub rcon: RconConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Post an online notice to the room after startup
    #[serde(default = "default_true")]
    pub announce_startup: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            room: 0,
            chat: ChatConfig::default(),
            rcon: RconConfig::default(),
            store: StoreConfig::default(),
            resolver: ResolverConfig::default(),
            announce_startup: true,
        }
    }
}

/// OneBot websocket endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_url")]
    pub url: String,

    /// Sent as `Authorization: Bearer <token>`
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub policy: ChatPolicy,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: default_chat_url(),
            token: None,
            policy: ChatPolicy::default(),
        }
    }
}

/// Minecraft remote console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RconConfig {
    #[serde(default = "default_rcon_addr")]
    pub addr: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub remove_by: RemoveBy,

    #[serde(default)]
    pub policy: GatewayPolicy,
}

impl Default for RconConfig {
    fn default() -> Self {
        Self {
            addr: default_rcon_addr(),
            password: String::new(),
            remove_by: RemoveBy::default(),
            policy: GatewayPolicy::default(),
        }
    }
}

/// Binding store backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-memory storage, bindings are lost on restart
    #[default]
    Memory,

    MySql {
        url: String,

        #[serde(default = "default_pool_size")]
        max_connections: u32,

        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,
    },
}

fn default_true() -> bool {
    true
}

fn default_chat_url() -> String {
    "ws://127.0.0.1:6700".to_string()
}

fn default_rcon_addr() -> String {
    "127.0.0.1:25575".to_string()
}

fn default_pool_size() -> u32 {
    5
}

fn default_connection_timeout() -> u64 {
    5
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("WLSYNC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn room_id(&self) -> RoomId {
        RoomId::new(self.room)
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<(), String> {
        if self.room == 0 {
            return Err("room must be set".to_string());
        }
        if self.rcon.password.is_empty() {
            return Err("rcon.password must be set".to_string());
        }
        if self.chat.url.is_empty() {
            return Err("chat.url must be set".to_string());
        }
        Ok(())
    }
}
