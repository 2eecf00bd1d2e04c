//! Configuration validation.

use std::collections::HashSet;

use tracing::warn;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use crate::protocol::ProtocolVariant;

/// Validate a loaded configuration.
///
/// Checks for structural problems that would make monitoring impossible:
/// empty names/hosts, duplicate names, unknown protocol numbers. A server
/// whose query and log ports are equal is legal (send and receive are
/// independent channels) but unusual enough to warn about.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.servers.is_empty() {
        return Err(validation_error("no servers configured"));
    }

    let mut names = HashSet::new();

    for server in &config.servers {
        if server.name.trim().is_empty() {
            return Err(validation_error("server with empty name"));
        }
        if !names.insert(server.name.as_str()) {
            return Err(validation_error(&format!(
                "duplicate server name '{}'",
                server.name
            )));
        }
        if server.host.trim().is_empty() {
            return Err(validation_error(&format!(
                "server '{}' has an empty host",
                server.name
            )));
        }
        if server.port == 0 {
            return Err(validation_error(&format!(
                "server '{}' has query port 0",
                server.name
            )));
        }
        if ProtocolVariant::from_number(server.protocol).is_none() {
            return Err(validation_error(&format!(
                "server '{}' has unsupported protocol {} (expected 48 or 49)",
                server.name, server.protocol
            )));
        }
        if server.port == server.log_port {
            warn!(
                "Server '{}' uses port {} for both queries and log reception",
                server.name, server.port
            );
        }
    }

    Ok(())
}

fn validation_error(message: &str) -> ConfigError {
    ConfigError::ValidationError {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ServerConfig;

    fn make_server(name: &str) -> ServerConfig {
        ServerConfig {
            name: name.to_string(),
            host: "127.0.0.1".to_string(),
            port: 27015,
            log_port: 27100,
            protocol: 49,
            connectionless_args: "say".to_string(),
            rcon_password: "secret".to_string(),
            suppress_frags: None,
            active: None,
        }
    }

    fn make_config(servers: Vec<ServerConfig>) -> Config {
        Config {
            bridge: None,
            servers,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&make_config(vec![make_server("dm1")])).is_ok());
    }

    #[test]
    fn test_no_servers() {
        assert!(validate(&make_config(vec![])).is_err());
    }

    #[test]
    fn test_duplicate_names() {
        let config = make_config(vec![make_server("dm1"), make_server("dm1")]);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_protocol() {
        let mut server = make_server("dm1");
        server.protocol = 47;
        assert!(validate(&make_config(vec![server])).is_err());
    }

    #[test]
    fn test_empty_host() {
        let mut server = make_server("dm1");
        server.host = " ".to_string();
        assert!(validate(&make_config(vec![server])).is_err());
    }

    #[test]
    fn test_equal_ports_allowed() {
        let mut server = make_server("dm1");
        server.log_port = server.port;
        assert!(validate(&make_config(vec![server])).is_ok());
    }
}
