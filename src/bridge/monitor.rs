//! Per-server log receive loop.
//!
//! One monitor runs for the lifetime of a monitoring session, suspended on
//! the log socket. A malformed or unrecognized line never terminates the
//! loop; only a socket-level failure does, and that is logged for the
//! supervisor.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

use crate::common::format::strip_color_tags;
use crate::config::ServerConfig;
use crate::game::EventGrammar;
use crate::protocol::transport::LogSocket;

/// A rendered log event ready for the chat-platform adapter.
#[derive(Debug, Clone)]
pub struct LogNotification {
    pub server: String,
    pub text: String,
}

/// Receive and forward log events until the socket fails or the
/// notification channel closes.
pub async fn run_monitor(
    server: ServerConfig,
    socket: LogSocket,
    notify_tx: UnboundedSender<LogNotification>,
) {
    let grammar = EventGrammar::new(server.variant().log_prefix());
    info!("[{}] Log monitoring started", server.name);

    loop {
        let datagram = match socket.receive().await {
            Ok(datagram) => datagram,
            Err(e) => {
                error!("[{}] Log socket failed, stopping monitor: {}", server.name, e);
                break;
            }
        };

        let Some(line) = preprocess(&datagram) else {
            continue;
        };
        let Some(event) = grammar.parse(&line) else {
            // World events and other unrecognized lines are expected
            continue;
        };
        // A suppressed match still consumes the line
        if server.suppress_frags() && event.is_frag() {
            continue;
        }

        let text = event.render();
        debug!("[{}] <<< {} >>>", server.name, text);

        let notification = LogNotification {
            server: server.name.clone(),
            text,
        };
        if notify_tx.send(notification).is_err() {
            info!("[{}] Notification channel closed, stopping monitor", server.name);
            break;
        }
    }
}

/// Strip the 4-byte packet prefix, decode lossily and drop color tags.
fn preprocess(datagram: &[u8]) -> Option<String> {
    if datagram.len() <= 4 {
        return None;
    }
    let text = String::from_utf8_lossy(&datagram[4..]).replace('\n', "");
    Some(strip_color_tags(&text))
}
