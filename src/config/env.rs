//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `HLBRIDGE_CONFIG` - Path to the configuration file
//! - `HLBRIDGE_RCON_PASSWORD` - Rcon password, applied to every server

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "HLBRIDGE";

/// Apply environment variable overrides to a config.
///
/// This allows the rcon password to be provided via the environment
/// instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(password) = env::var(format!("{}_RCON_PASSWORD", ENV_PREFIX)) {
        if !password.is_empty() {
            for server in &mut config.servers {
                server.rcon_password = password.clone();
            }
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `HLBRIDGE_CONFIG`, otherwise returns "hlbridge.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "hlbridge.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ServerConfig;

    fn make_test_config() -> Config {
        Config {
            bridge: None,
            servers: vec![ServerConfig {
                name: "test".to_string(),
                host: "127.0.0.1".to_string(),
                port: 27015,
                log_port: 27100,
                protocol: 49,
                connectionless_args: "say".to_string(),
                rcon_password: "original".to_string(),
                suppress_frags: None,
                active: None,
            }],
        }
    }

    #[test]
    fn test_apply_env_overrides_no_vars() {
        env::remove_var("HLBRIDGE_RCON_PASSWORD");

        let result = apply_env_overrides(make_test_config());
        assert_eq!(result.servers[0].rcon_password, "original");
    }

    #[test]
    fn test_get_config_path_default() {
        env::remove_var("HLBRIDGE_CONFIG");
        assert_eq!(get_config_path(), "hlbridge.conf");
    }
}
