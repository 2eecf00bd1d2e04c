//! Netinfo query client: player list and server info.
//!
//! Responses are backslash-delimited text. Decoding is always lossy: bytes
//! that are not valid UTF-8 are substituted, never rejected. Quote
//! characters are structurally ambiguous with the field delimiters and are
//! normalized to spaces before splitting.

use std::time::Duration;

use crate::common::error::TransportResult;
use crate::common::format::{format_duration_field, strip_color_tags};
use crate::protocol::packet::{self, QueryKind};
use crate::protocol::transport::send_request;
use crate::protocol::ProtocolVariant;

/// Player-list responses carry a fixed header before the delimited fields.
const PLAYER_LIST_HEADER: usize = 16;

/// One player slot from a player-list response.
///
/// Fields are kept as received; the wire carries everything as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub slot: String,
    pub name: String,
    pub frags: String,
    pub time: String,
}

impl PlayerRecord {
    /// Render for display: `slot name [frags] (1h 2m 3s)`.
    pub fn display(&self) -> String {
        format!(
            "{} {} [{}] ({})",
            self.slot,
            strip_color_tags(&self.name),
            self.frags,
            format_duration_field(&self.time)
        )
    }
}

/// Server identity from an info query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub map: String,
    pub players: String,
    pub max_players: String,
}

impl ServerInfo {
    pub fn display(&self) -> String {
        format!(
            "Server: {}\nMap: {}({}/{})",
            self.name, self.map, self.players, self.max_players
        )
    }
}

/// Client for the connectionless netinfo queries of one server.
pub struct QueryClient {
    host: String,
    port: u16,
    variant: ProtocolVariant,
    timeout: Duration,
}

impl QueryClient {
    pub fn new(host: impl Into<String>, port: u16, variant: ProtocolVariant, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            variant,
            timeout,
        }
    }

    /// Query the current player list.
    ///
    /// `Ok(None)` means the server did not reply within the timeout.
    pub async fn players(&self) -> TransportResult<Option<Vec<PlayerRecord>>> {
        let request = packet::netinfo(self.variant.number(), QueryKind::PlayerList);
        let reply = send_request(&self.host, self.port, &request, self.timeout).await?;
        Ok(reply.map(|data| parse_player_list(&data, self.variant)))
    }

    /// Query server name, map and player counts.
    ///
    /// `Ok(None)` on timeout or on a response too short to carry the
    /// positional fields.
    pub async fn server_info(&self) -> TransportResult<Option<ServerInfo>> {
        let request = packet::netinfo(self.variant.number(), QueryKind::ServerInfo);
        let reply = send_request(&self.host, self.port, &request, self.timeout).await?;
        Ok(reply.and_then(|data| parse_server_info(&data)))
    }
}

/// Decode a response payload into its delimited fields.
///
/// A literal backslash is prepended before splitting so a payload that does
/// not itself start with a delimiter still yields a discardable leading
/// field; `skip` leading fields are then dropped (one for player lists, two
/// for server info).
fn decode_fields(payload: &[u8], skip: usize) -> Vec<String> {
    let text = String::from_utf8_lossy(payload)
        .replace(['\'', '"'], " ")
        .replace('\n', "");
    format!("\\{text}")
        .split('\\')
        .skip(skip)
        .map(str::to_string)
        .collect()
}

/// Parse a raw player-list response for either protocol variant.
pub fn parse_player_list(data: &[u8], variant: ProtocolVariant) -> Vec<PlayerRecord> {
    if data.len() <= PLAYER_LIST_HEADER {
        return Vec::new();
    }

    let mut fields = decode_fields(&data[PLAYER_LIST_HEADER..], 1);
    if fields.last().is_some_and(String::is_empty) {
        fields.pop();
    }

    match variant {
        ProtocolVariant::Current => parse_keyed_players(&fields),
        ProtocolVariant::Old => parse_grouped_players(&fields),
    }
}

/// "Current" layout: a flat key-value sequence with a `players` count and
/// `p{i}name`/`p{i}frags`/`p{i}time` keys per slot.
fn parse_keyed_players(fields: &[String]) -> Vec<PlayerRecord> {
    // No `players` key means an empty server, not a malformed response
    let Some(pos) = fields.iter().position(|f| f == "players") else {
        return Vec::new();
    };
    let count = fields
        .get(pos + 1)
        .and_then(|f| f.parse::<usize>().ok())
        .unwrap_or(0);

    let lookup = |key: &str| {
        fields
            .iter()
            .position(|f| f == key)
            .and_then(|i| fields.get(i + 1))
            .cloned()
    };

    let mut players = Vec::with_capacity(count);
    for i in 0..count {
        let Some(name) = lookup(&format!("p{i}name")) else {
            break;
        };
        players.push(PlayerRecord {
            slot: i.to_string(),
            name,
            frags: lookup(&format!("p{i}frags")).unwrap_or_default(),
            time: lookup(&format!("p{i}time")).unwrap_or_default(),
        });
    }
    players
}

/// "Old" layout: a flat repeating group of four fields per player
/// (index, name, frags, time). An incomplete trailing group is discarded.
fn parse_grouped_players(fields: &[String]) -> Vec<PlayerRecord> {
    fields
        .chunks_exact(4)
        .map(|group| PlayerRecord {
            slot: group[0].clone(),
            name: group[1].clone(),
            frags: group[2].clone(),
            time: group[3].clone(),
        })
        .collect()
}

/// Parse a raw server-info response. Fields are positional.
pub fn parse_server_info(data: &[u8]) -> Option<ServerInfo> {
    let fields = decode_fields(data, 2);
    if fields.len() <= 9 {
        return None;
    }
    Some(ServerInfo {
        name: fields[1].clone(),
        map: fields[9].clone(),
        players: fields[5].clone(),
        max_players: fields[7].clone(),
    })
}
