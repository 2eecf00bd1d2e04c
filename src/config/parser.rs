//! Configuration file parsing (HOCON format).

use std::path::Path;

use hocon::HoconLoader;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
#[cfg(test)]
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = load_config_str(
            r#"
            servers = [
                {
                    name = "dm1"
                    host = "127.0.0.1"
                    port = 27015
                    log_port = 27100
                    protocol = 49
                    connectionless_args = "say"
                    rcon_password = "secret"
                }
            ]
            "#,
        )
        .expect("minimal config should parse");

        assert_eq!(config.servers.len(), 1);
        let server = &config.servers[0];
        assert_eq!(server.name, "dm1");
        assert_eq!(server.port, 27015);
        assert!(server.is_active());
        assert!(!server.suppress_frags());
        assert!(config.bridge.is_none());
    }

    #[test]
    fn test_parse_bridge_section() {
        let config = load_config_str(
            r#"
            bridge {
                platform_label = "telegram"
                query_timeout_ms = 750
            }
            servers = [
                {
                    name = "old"
                    host = "10.0.0.1"
                    port = 27015
                    log_port = 27101
                    protocol = 48
                    connectionless_args = "say"
                    rcon_password = "secret"
                    suppress_frags = true
                    active = false
                }
            ]
            "#,
        )
        .expect("config with bridge section should parse");

        let bridge = config.bridge.as_ref().expect("bridge section present");
        assert_eq!(bridge.platform_label.as_deref(), Some("telegram"));
        assert_eq!(bridge.query_timeout_ms, Some(750));
        assert_eq!(bridge.rcon_timeout_ms, None);
        assert!(config.servers[0].suppress_frags());
        assert!(!config.servers[0].is_active());
        assert!(config.active_servers().is_empty());
    }
}
