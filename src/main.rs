//! HLBridge - chat bridge for GoldSrc-era game servers
//!
//! Relays in-game chat and events from the servers' UDP log streams to a
//! chat platform, relays chat back into the game, and answers status/rcon
//! queries on demand.

mod bridge;
mod common;
mod config;
mod game;
mod protocol;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use bridge::{Bridge, LogNotification, Supervisor};
use config::{env::get_config_path, load_and_validate, Config};

/// How often the supervisory loop re-reads the config file.
const CONFIG_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("HLBridge v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        error!("See hlbridge.conf.example for reference.");
        e
    })?;

    info!("Configuration loaded successfully");
    for server in &config.servers {
        info!(
            "  {} -> {}:{} (log port {}, protocol {}, active: {})",
            server.name,
            server.host,
            server.port,
            server.log_port,
            server.protocol,
            server.is_active()
        );
    }

    // ============================================================
    // Create channels for communication
    // ============================================================

    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<LogNotification>();
    let (config_tx, config_rx) = watch::channel(config.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let bridge = Arc::new(Bridge::new(&config));

    // ============================================================
    // Start monitoring
    // ============================================================

    let mut supervisor = Supervisor::new(notify_tx);
    let desired = config.active_servers();
    info!("Starting monitoring for {} active servers...", desired.len());
    let (_, started) = supervisor.reconcile(&desired).await;
    info!(
        "{} servers started, monitoring: {:?}",
        started,
        supervisor.monitored()
    );

    // Stand-in for the chat-platform adapter: the adapter subscribes to
    // this channel and pushes each rendered event to its chat channel.
    let notifier_task = tokio::spawn(async move {
        while let Some(event) = notify_rx.recv().await {
            info!("[{}] <<< {} >>>", event.server, event.text);
        }
        info!("Notifier ended");
    });

    // Supervisory loop: sole mutator of the monitor map. Watches the config
    // file and reconciles only the affected servers on change.
    let watcher_task = {
        let config_path = config_path.clone();
        let mut shutdown_rx = shutdown_rx.clone();
        let mut current = desired;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CONFIG_POLL_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                match load_and_validate(&config_path) {
                    Ok(new_config) => {
                        let desired = new_config.active_servers();
                        if desired != current {
                            info!("Server configuration changed, reloading...");
                            let (stopped, started) = supervisor.reconcile(&desired).await;
                            info!(
                                "Updated server monitoring: {} started, {} stopped",
                                started, stopped
                            );
                            current = desired;
                            // Console gone is fine; keep monitoring anyway
                            let _ = config_tx.send(new_config);
                        }
                    }
                    Err(e) => warn!("Ignoring config reload failure: {}", e),
                }
            }
            supervisor.shutdown();
            info!("Supervisor ended");
        })
    };

    // Interactive console: a thin stand-in for the chat-platform command
    // handlers (status/rcon/say per user command).
    let console_task = tokio::spawn(run_console(bridge, config_rx));

    // ============================================================
    // Run until shutdown
    // ============================================================

    tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - stopping monitors...");
        }
        _ = notifier_task => {}
        _ = console_task => {}
    }

    if shutdown_tx.send(true).is_err() {
        warn!("Supervisor already gone");
    }
    match tokio::time::timeout(Duration::from_secs(5), watcher_task).await {
        Ok(Ok(())) => info!("Monitoring stopped gracefully"),
        Ok(Err(e)) => warn!("Supervisor task panicked: {}", e),
        Err(_) => warn!("Supervisor shutdown timed out"),
    }

    info!("Exiting...");
    Ok(())
}

/// Read commands from stdin and run them against the bridge.
async fn run_console(bridge: Arc<Bridge>, mut config_rx: watch::Receiver<Config>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Console started (commands: servers, status <name>, rcon <name> <cmd>, say <name> <text>)");

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let config = config_rx.borrow_and_update().clone();
        handle_command(&bridge, &config, line).await;
    }

    // Stdin detached (e.g. running as a service); keep the bridge running
    info!("Console input closed");
    std::future::pending::<()>().await;
}

async fn handle_command(bridge: &Bridge, config: &Config, line: &str) {
    let mut parts = line.splitn(3, ' ');
    let command = parts.next().unwrap_or_default();

    match command {
        "servers" => {
            for server in &config.servers {
                println!(
                    "{} -> {}:{} (active: {})",
                    server.name,
                    server.host,
                    server.port,
                    server.is_active()
                );
            }
        }
        "status" => {
            let Some(server) = parts.next().and_then(|name| config.server(name)) else {
                println!("Usage: status <server name>");
                return;
            };
            match bridge.status_report(server).await {
                Ok(Some(report)) => println!("{report}"),
                Ok(None) => println!("Server unreachable"),
                Err(e) => println!("Status query failed: {e}"),
            }
        }
        "rcon" => {
            let (Some(name), Some(rcon_command)) = (parts.next(), parts.next()) else {
                println!("Usage: rcon <server name> <command>");
                return;
            };
            let Some(server) = config.server(name) else {
                println!("Unknown server '{name}'");
                return;
            };
            match bridge.run_rcon(server, rcon_command).await {
                Ok(output) => println!("{output}"),
                Err(e) => println!("Rcon failed: {e}"),
            }
        }
        "say" => {
            let (Some(name), Some(text)) = (parts.next(), parts.next()) else {
                println!("Usage: say <server name> <text>");
                return;
            };
            let Some(server) = config.server(name) else {
                println!("Unknown server '{name}'");
                return;
            };
            if let Err(e) = bridge.send_chat(server, "console", text).await {
                println!("Send failed: {e}");
            }
        }
        _ => println!("Unknown command '{command}' (servers, status, rcon, say)"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
