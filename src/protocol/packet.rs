//! Connectionless packet construction.
//!
//! Every out-of-band request to the game server is a UDP datagram prefixed
//! with four `0xFF` bytes followed by an ASCII command.

use bytes::{BufMut, BytesMut};

/// Prefix marking a connectionless (out-of-band) packet.
pub const CONNECTIONLESS_PREFIX: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Marker at the start of every rcon response datagram.
pub const PRINT_MARKER: &[u8] = b"\xff\xff\xff\xffprint";

/// Datagram signaling end-of-stream for a multi-packet rcon response.
pub const PRINT_SENTINEL: &[u8] = b"\xff\xff\xff\xffprint\n";

/// Kind of netinfo query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    PlayerList = 3,
    ServerInfo = 4,
}

fn connectionless(body: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(CONNECTIONLESS_PREFIX.len() + body.len());
    buf.put_slice(&CONNECTIONLESS_PREFIX);
    buf.put_slice(body);
    buf.to_vec()
}

/// Build a `netinfo` query packet.
pub fn netinfo(protocol: u16, kind: QueryKind) -> Vec<u8> {
    connectionless(format!("netinfo {} 0 {}", protocol, kind as u8).as_bytes())
}

/// Build an authenticated rcon command packet.
pub fn rcon(password: &str, command: &str) -> Vec<u8> {
    connectionless(format!("rcon {password} {command}").as_bytes())
}

/// Build a fire-and-forget chat relay packet.
///
/// `args` is the server-specific connectionless command prefix; the message
/// is terminated with a newline as the server expects.
pub fn chat_relay(args: &str, message: &str) -> Vec<u8> {
    connectionless(format!("{args} {message}\n").as_bytes())
}

/// Whether a datagram is exactly the rcon end-of-stream sentinel.
pub fn is_print_sentinel(datagram: &[u8]) -> bool {
    datagram == PRINT_SENTINEL
}
