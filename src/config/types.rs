//! Configuration type definitions.

use serde::Deserialize;

use crate::protocol::ProtocolVariant;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub bridge: Option<BridgeConfig>,
    pub servers: Vec<ServerConfig>,
}

/// Bridge-wide settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BridgeConfig {
    /// Label prepended to relayed chat messages, e.g. "(telegram) user: text".
    pub platform_label: Option<String>,
    /// How long a netinfo query waits for its single reply, in milliseconds.
    pub query_timeout_ms: Option<u64>,
    /// Per-receive timeout during an rcon response drain, in milliseconds.
    pub rcon_timeout_ms: Option<u64>,
}

/// One monitored game server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// Display name, also the key in the supervisor's task map.
    pub name: String,
    /// Server address.
    pub host: String,
    /// Query/rcon port (the server's game port).
    pub port: u16,
    /// Local port the server's UDP log stream is directed at.
    pub log_port: u16,
    /// Protocol generation: 48 ("old") or 49 ("current").
    pub protocol: u16,
    /// Command prefix for relaying chat into the game, e.g. "say".
    pub connectionless_args: String,
    /// Password for rcon commands.
    pub rcon_password: String,
    /// Drop Suicide/Killed events instead of forwarding them.
    pub suppress_frags: Option<bool>,
    /// Whether this server should be monitored at all.
    pub active: Option<bool>,
}

impl ServerConfig {
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }

    pub fn suppress_frags(&self) -> bool {
        self.suppress_frags.unwrap_or(false)
    }

    /// Protocol generation; validation rejects unknown numbers at load time.
    pub fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::from_number(self.protocol).unwrap_or(ProtocolVariant::Current)
    }
}

impl Config {
    /// Servers that should currently be monitored.
    pub fn active_servers(&self) -> Vec<ServerConfig> {
        self.servers
            .iter()
            .filter(|s| s.is_active())
            .cloned()
            .collect()
    }

    /// Look up a server by name.
    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.name == name)
    }
}
