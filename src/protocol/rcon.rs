//! Rcon client: authenticated remote console over connectionless UDP.
//!
//! The server streams its response across one or more datagrams, each
//! starting with a `print` marker, and closes the stream with a sentinel
//! datagram. The stream can repeat lines across datagram boundaries, so
//! output is deduplicated per session in first-seen order.

use std::collections::HashSet;
use std::time::Duration;

use crate::common::error::{RconError, TransportError};
use crate::common::format::strip_color_tags;
use crate::protocol::packet;
use crate::protocol::transport::RequestChannel;

/// Per-command response state: lines already emitted this session and the
/// accumulated output in first-seen order.
#[derive(Debug, Default)]
pub struct RconSession {
    seen: HashSet<String>,
    lines: Vec<String>,
}

impl RconSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one response datagram into the session.
    ///
    /// Strips the `print` markers, normalizes carriage returns, splits on
    /// newlines and keeps each decoded line the first time it appears.
    /// Stray `0xFF` bytes and backticks are dropped before comparison.
    pub fn absorb(&mut self, chunk: &[u8]) {
        let cleaned = strip_print_markers(chunk);
        for segment in cleaned.split(|&b| b == b'\n') {
            let bytes: Vec<u8> = segment
                .iter()
                .copied()
                .filter(|&b| b != 0xFF && b != b'`')
                .collect();
            let line = String::from_utf8_lossy(&bytes).to_string();
            if line.is_empty() {
                continue;
            }
            if self.seen.insert(line.clone()) {
                self.lines.push(line);
            }
        }
    }

    /// The deduplicated output, joined by newlines and color-stripped.
    pub fn into_output(self) -> String {
        strip_color_tags(&self.lines.join("\n"))
    }
}

/// Remove every occurrence of the response marker, and normalize `\r`
/// line endings to `\n`.
fn strip_print_markers(chunk: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(chunk.len());
    let mut i = 0;
    while i < chunk.len() {
        if chunk[i..].starts_with(packet::PRINT_MARKER) {
            i += packet::PRINT_MARKER.len();
        } else {
            out.push(if chunk[i] == b'\r' { b'\n' } else { chunk[i] });
            i += 1;
        }
    }
    out
}

/// Client for rcon commands against one server.
pub struct RconClient {
    host: String,
    port: u16,
    password: String,
    timeout: Duration,
}

impl RconClient {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            timeout,
        }
    }

    /// Run one rcon command and drain the streamed response.
    ///
    /// No data at all before the timeout means the server is unreachable.
    /// Data followed by a stall with no sentinel is a timeout; neither is
    /// retried automatically.
    pub async fn run(&self, command: &str) -> Result<String, RconError> {
        let channel = RequestChannel::open(&self.host, self.port).await?;
        channel
            .send(&packet::rcon(&self.password, command))
            .await
            .map_err(TransportError::from)?;

        let mut session = RconSession::new();
        let mut received_any = false;

        loop {
            match channel.recv(self.timeout).await {
                Ok(Some(chunk)) => {
                    if packet::is_print_sentinel(&chunk) {
                        break;
                    }
                    received_any = true;
                    session.absorb(&chunk);
                }
                Ok(None) if received_any => return Err(RconError::Timeout),
                Ok(None) => return Err(RconError::Unreachable),
                // Connection refused surfaces as an I/O error on receive
                Err(_) if !received_any => return Err(RconError::Unreachable),
                Err(e) => return Err(TransportError::from(e).into()),
            }
        }

        Ok(session.into_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_across_datagrams() {
        let mut session = RconSession::new();
        session.absorb(b"\xff\xff\xff\xffprintline1");
        session.absorb(b"line1\nline2");
        assert_eq!(session.into_output(), "line1\nline2");
    }

    #[test]
    fn test_marker_only_line_is_dropped() {
        let mut session = RconSession::new();
        session.absorb(b"\xff\xff\xff\xffprint\nhello\n");
        assert_eq!(session.into_output(), "hello");
    }

    #[test]
    fn test_strips_stray_bytes_and_backticks() {
        let mut session = RconSession::new();
        session.absorb(b"map: `crossfire`\xff\n");
        assert_eq!(session.into_output(), "map: crossfire");
    }

    #[test]
    fn test_carriage_returns_split_lines() {
        let mut session = RconSession::new();
        session.absorb(b"one\rtwo\r\ntwo\n");
        assert_eq!(session.into_output(), "one\ntwo");
    }

    #[test]
    fn test_output_is_color_stripped() {
        let mut session = RconSession::new();
        session.absorb(b"^1Admin^0: hello\n");
        assert_eq!(session.into_output(), "Admin: hello");
    }

    #[tokio::test]
    async fn test_rcon_drain_against_loopback_server() {
        use tokio::net::UdpSocket;

        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut buf = [0u8; 256];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..len], b"\xff\xff\xff\xffrcon secret status");

            server
                .send_to(b"\xff\xff\xff\xffprintline1\n", peer)
                .await
                .unwrap();
            server.send_to(b"line1\nline2\n", peer).await.unwrap();
            server
                .send_to(packet::PRINT_SENTINEL, peer)
                .await
                .unwrap();
        });

        let client = RconClient::new("127.0.0.1", port, "secret", Duration::from_secs(1));
        let output = client.run("status").await.unwrap();
        assert_eq!(output, "line1\nline2");
    }

    #[tokio::test]
    async fn test_rcon_unreachable() {
        use tokio::net::UdpSocket;

        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();

        let client = RconClient::new("127.0.0.1", port, "secret", Duration::from_millis(50));
        assert!(matches!(
            client.run("status").await,
            Err(RconError::Unreachable)
        ));
    }

    #[tokio::test]
    async fn test_rcon_stall_is_timeout() {
        use tokio::net::UdpSocket;

        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut buf = [0u8; 256];
            let (_, peer) = server.recv_from(&mut buf).await.unwrap();
            // One data chunk, then silence: no sentinel ever arrives
            server
                .send_to(b"\xff\xff\xff\xffprintpartial\n", peer)
                .await
                .unwrap();
        });

        let client = RconClient::new("127.0.0.1", port, "secret", Duration::from_millis(100));
        assert!(matches!(client.run("status").await, Err(RconError::Timeout)));
    }
}
