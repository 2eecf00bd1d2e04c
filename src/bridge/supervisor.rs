//! Supervision of per-server monitor tasks.
//!
//! The supervisor owns a map from server name to its running monitor task
//! and is the sole mutator of that map. Reconfiguration is reconciliation:
//! the desired server list is diffed against what is running, and only the
//! affected entries are restarted.

use std::collections::HashMap;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::bridge::monitor::{run_monitor, LogNotification};
use crate::common::error::{TransportError, TransportResult};
use crate::config::ServerConfig;
use crate::protocol::transport::LogSocket;

/// Address log sockets bind on; the log source is unauthenticated anyway.
const LOG_BIND_HOST: &str = "0.0.0.0";

struct MonitorEntry {
    config: ServerConfig,
    port: u16,
    task: JoinHandle<()>,
}

/// Owner of all running monitor tasks, keyed by server name.
pub struct Supervisor {
    notify_tx: UnboundedSender<LogNotification>,
    monitors: HashMap<String, MonitorEntry>,
}

impl Supervisor {
    pub fn new(notify_tx: UnboundedSender<LogNotification>) -> Self {
        Self {
            notify_tx,
            monitors: HashMap::new(),
        }
    }

    /// Names of the servers currently being monitored. A monitor whose
    /// receive loop has ended no longer counts.
    pub fn monitored(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .monitors
            .iter()
            .filter(|(_, entry)| !entry.task.is_finished())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// The port a server's log socket is bound on.
    #[cfg(test)]
    fn bound_port(&self, name: &str) -> Option<u16> {
        self.monitors.get(name).map(|entry| entry.port)
    }

    /// Start monitoring one server, replacing any running entry of the
    /// same name. A bind failure is fatal for this server only.
    pub async fn start(&mut self, server: ServerConfig) -> TransportResult<()> {
        self.stop(&server.name);

        let port = server.log_port;
        let socket = (|| LogSocket::bind(LOG_BIND_HOST, port))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_times(2),
            )
            .notify(|err: &TransportError, delay: Duration| {
                warn!("Log socket bind failed, retrying in {:?}: {}", delay, err);
            })
            .await?;

        // Port 0 resolves at bind time; report the actual port
        let bound = socket.local_addr().map(|addr| addr.port()).unwrap_or(port);
        info!("[{}] Log socket bound on port {}", server.name, bound);

        let task = tokio::spawn(run_monitor(
            server.clone(),
            socket,
            self.notify_tx.clone(),
        ));
        self.monitors.insert(
            server.name.clone(),
            MonitorEntry {
                config: server,
                port: bound,
                task,
            },
        );
        Ok(())
    }

    /// Cancel one server's receive loop and release its socket.
    pub fn stop(&mut self, name: &str) -> bool {
        match self.monitors.remove(name) {
            Some(entry) => {
                entry.task.abort();
                info!("[{}] Log monitoring stopped", name);
                true
            }
            None => false,
        }
    }

    /// Diff the desired server list against the running set: stop entries
    /// that disappeared or changed, start entries that are missing.
    ///
    /// Returns (stopped, started) counts.
    pub async fn reconcile(&mut self, desired: &[ServerConfig]) -> (usize, usize) {
        let mut stopped = 0;
        let mut started = 0;

        let running: Vec<String> = self.monitors.keys().cloned().collect();
        for name in running {
            // A dead receive loop is not running, whatever the config says
            let alive = !self.monitors[&name].task.is_finished();
            let unchanged = alive
                && desired
                    .iter()
                    .any(|server| server.name == name && self.monitors[&name].config == *server);
            if !unchanged {
                self.stop(&name);
                stopped += 1;
            }
        }

        for server in desired {
            if self.monitors.contains_key(&server.name) {
                continue;
            }
            match self.start(server.clone()).await {
                Ok(()) => started += 1,
                Err(e) => error!("[{}] Skipping server, monitoring failed: {}", server.name, e),
            }
        }

        (stopped, started)
    }

    /// Stop every monitor.
    pub fn shutdown(&mut self) {
        for (name, entry) in self.monitors.drain() {
            entry.task.abort();
            info!("[{}] Log monitoring stopped", name);
        }
    }
}
