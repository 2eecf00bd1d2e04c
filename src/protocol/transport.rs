//! UDP datagram transport.
//!
//! Two usage patterns: a long-lived bound socket receiving the server's log
//! stream, and short-lived ephemeral channels for request/response exchanges
//! and fire-and-forget sends. Ephemeral channels are closed on all paths
//! when the handle drops.

use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::common::error::{TransportError, TransportResult};

/// Largest datagram we accept; rcon responses can be close to the
/// platform maximum.
const MAX_DATAGRAM: usize = 65_535;

/// A bound UDP socket receiving a server's log stream.
///
/// The source is unauthenticated by design: any sender reaching the port
/// is accepted.
pub struct LogSocket {
    socket: UdpSocket,
}

impl LogSocket {
    /// Bind a receiving socket on the given port.
    pub async fn bind(host: &str, port: u16) -> TransportResult<Self> {
        let socket = UdpSocket::bind((host, port))
            .await
            .map_err(|source| TransportError::Bind { port, source })?;
        Ok(Self { socket })
    }

    /// Wait for the next datagram and return its raw payload.
    pub async fn receive(&self) -> std::io::Result<Vec<u8>> {
        let mut buf = [0u8; 2048];
        let (len, _) = self.socket.recv_from(&mut buf).await?;
        Ok(buf[..len].to_vec())
    }

    /// The locally bound address (port 0 resolves on bind).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }
}

/// An ephemeral connected channel for request/response exchanges.
pub struct RequestChannel {
    socket: UdpSocket,
}

impl RequestChannel {
    /// Open a channel to the given server.
    pub async fn open(host: &str, port: u16) -> TransportResult<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect((host, port)).await?;
        Ok(Self { socket })
    }

    /// Transmit one datagram.
    pub async fn send(&self, payload: &[u8]) -> std::io::Result<()> {
        self.socket.send(payload).await?;
        Ok(())
    }

    /// Wait up to `wait` for one reply datagram.
    ///
    /// `Ok(None)` means the timeout elapsed; the caller decides whether that
    /// represents "server offline".
    pub async fn recv(&self, wait: Duration) -> std::io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        match timeout(wait, self.socket.recv(&mut buf)).await {
            Ok(Ok(len)) => {
                buf.truncate(len);
                Ok(Some(buf))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }
}

/// Send one request and wait for exactly one reply.
pub async fn send_request(
    host: &str,
    port: u16,
    payload: &[u8],
    wait: Duration,
) -> TransportResult<Option<Vec<u8>>> {
    let channel = RequestChannel::open(host, port).await?;
    channel.send(payload).await?;
    Ok(channel.recv(wait).await?)
}

/// Transmit one datagram without awaiting any acknowledgement.
pub async fn send_datagram(host: &str, port: u16, payload: &[u8]) -> TransportResult<()> {
    let channel = RequestChannel::open(host, port).await?;
    channel.send(payload).await?;
    Ok(())
}
