//! Server configuration.

use crate::utils::{EnvError, env_string, env_u32};

/// Default bind address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:25565";

/// Protocol version reported in the status response (1.15.2).
pub const PROTOCOL_VERSION: i32 = 578;

/// Version name reported in the status response.
pub const VERSION_NAME: &str = "1.15.2";

/// Runtime settings for a [`Server`](crate::Server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP listen address.
    pub addr: String,
    /// Maximum players to show in status.
    pub max_players: u32,
    /// Server MOTD (Message of the Day).
    pub motd: String,
    /// Version name shown in status.
    pub version_name: String,
    /// Protocol number shown in status.
    pub protocol_version: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            max_players: 20,
            motd: "A Tuff Server".to_string(),
            version_name: VERSION_NAME.to_string(),
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

impl ServerConfig {
    /// Load settings from `ADDR`, `MAX_PLAYERS` and `MOTD`.
    ///
    /// Unset variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, EnvError> {
        let defaults = Self::default();

        Ok(Self {
            addr: env_string("ADDR", &defaults.addr)?,
            max_players: env_u32("MAX_PLAYERS", defaults.max_players)?,
            motd: env_string("MOTD", &defaults.motd)?,
            ..defaults
        })
    }

    /// Set the listen address.
    #[must_use]
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Set the maximum players shown in server status.
    #[must_use]
    pub const fn with_max_players(mut self, max_players: u32) -> Self {
        self.max_players = max_players;
        self
    }

    /// Set the server MOTD.
    #[must_use]
    pub fn with_motd(mut self, motd: impl Into<String>) -> Self {
        self.motd = motd.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::with_env_vars;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "0.0.0.0:25565");
        assert_eq!(config.max_players, 20);
        assert_eq!(config.protocol_version, 578);
    }

    #[test]
    fn test_from_env() {
        let vars = [
            ("ADDR", Some("127.0.0.1:25566")),
            ("MAX_PLAYERS", Some("50")),
            ("MOTD", Some("Hello")),
        ];

        with_env_vars(&vars, || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.addr, "127.0.0.1:25566");
            assert_eq!(config.max_players, 50);
            assert_eq!(config.motd, "Hello");
            assert_eq!(config.version_name, VERSION_NAME);
        });
    }

    #[test]
    fn test_from_env_unset_uses_defaults() {
        let vars = [("ADDR", None), ("MAX_PLAYERS", None), ("MOTD", None)];

        with_env_vars(&vars, || {
            assert_eq!(ServerConfig::from_env().unwrap(), ServerConfig::default());
        });
    }

    #[test]
    fn test_from_env_invalid_max_players() {
        with_env_vars(&[("MAX_PLAYERS", Some("lots"))], || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("MAX_PLAYERS"));
        });
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::default()
            .with_addr("127.0.0.1:0")
            .with_max_players(5)
            .with_motd("Test");
        assert_eq!(config.addr, "127.0.0.1:0");
        assert_eq!(config.max_players, 5);
        assert_eq!(config.motd, "Test");
    }
}
