//! Bridge facade: the on-demand operations the chat-platform adapter calls.

use std::time::Duration;

use tracing::info;

use crate::common::error::{RconError, TransportResult};
use crate::common::format::strip_color_tags;
use crate::config::{Config, ServerConfig};
use crate::protocol::packet;
use crate::protocol::query::{PlayerRecord, ServerInfo};
use crate::protocol::transport::send_datagram;
use crate::protocol::{QueryClient, RconClient};

/// Label prepended to relayed chat so players can tell where it came from.
pub const DEFAULT_PLATFORM_LABEL: &str = "telegram";

const DEFAULT_QUERY_TIMEOUT_MS: u64 = 500;
const DEFAULT_RCON_TIMEOUT_MS: u64 = 2000;

/// Entry point for queries, rcon and chat relay against configured servers.
pub struct Bridge {
    platform_label: String,
    query_timeout: Duration,
    rcon_timeout: Duration,
}

impl Bridge {
    pub fn new(config: &Config) -> Self {
        let bridge = config.bridge.as_ref();
        Self {
            platform_label: bridge
                .and_then(|b| b.platform_label.clone())
                .unwrap_or_else(|| DEFAULT_PLATFORM_LABEL.to_string()),
            query_timeout: Duration::from_millis(
                bridge
                    .and_then(|b| b.query_timeout_ms)
                    .unwrap_or(DEFAULT_QUERY_TIMEOUT_MS),
            ),
            rcon_timeout: Duration::from_millis(
                bridge
                    .and_then(|b| b.rcon_timeout_ms)
                    .unwrap_or(DEFAULT_RCON_TIMEOUT_MS),
            ),
        }
    }

    fn query_client(&self, server: &ServerConfig) -> QueryClient {
        QueryClient::new(
            server.host.clone(),
            server.port,
            server.variant(),
            self.query_timeout,
        )
    }

    /// Current player list; `None` means the server did not reply.
    pub async fn query_players(
        &self,
        server: &ServerConfig,
    ) -> TransportResult<Option<Vec<PlayerRecord>>> {
        self.query_client(server).players().await
    }

    /// Server name/map/counts; `None` means the server did not reply.
    pub async fn query_server_info(
        &self,
        server: &ServerConfig,
    ) -> TransportResult<Option<ServerInfo>> {
        self.query_client(server).server_info().await
    }

    /// Run an rcon command and return its deduplicated output.
    pub async fn run_rcon(
        &self,
        server: &ServerConfig,
        command: &str,
    ) -> Result<String, RconError> {
        let client = RconClient::new(
            server.host.clone(),
            server.port,
            server.rcon_password.clone(),
            self.rcon_timeout,
        );
        client.run(command).await
    }

    /// Relay one chat message into the game, best effort.
    pub async fn send_chat(
        &self,
        server: &ServerConfig,
        sender: &str,
        text: &str,
    ) -> TransportResult<()> {
        let message = format!("({}) {}: {}", self.platform_label, sender, text);
        let datagram = packet::chat_relay(&server.connectionless_args, &message);
        send_datagram(&server.host, server.port, &datagram).await?;
        info!("[{}] {} >>> {}", server.name, self.platform_label, message);
        Ok(())
    }

    /// Compose the full status reply: server info plus the player list.
    ///
    /// `None` means the server is unreachable.
    pub async fn status_report(&self, server: &ServerConfig) -> TransportResult<Option<String>> {
        let Some(info) = self.query_server_info(server).await? else {
            return Ok(None);
        };
        let players = self.query_players(server).await?.unwrap_or_default();

        let mut report = info.display();
        if !players.is_empty() {
            report.push_str("\n\n# Name [kills] (Time)\n");
            let lines: Vec<String> = players.iter().map(PlayerRecord::display).collect();
            report.push_str(&lines.join("\n"));
        }
        Ok(Some(strip_color_tags(&report)))
    }
}
