//! Canal session configuration

use std::time::Duration;

/// Connection settings for one canal session.
///
/// `destination` names the upstream data source instance on the server
/// side; `client_id` identifies this consumer within that destination.
/// Both are stamped on every request body the client sends.
#[derive(Debug, Clone)]
pub struct CanalConfig {
    pub hostname: String,
    pub port: u16,
    pub destination: String,
    pub client_id: String,
    /// Empty means the server runs without credential checks, like the
    /// stock docker setup. When set, the password is scrambled with the
    /// handshake seeds before it is sent.
    pub username: String,
    pub password: String,
    /// Advertised to the server as both net_read_timeout and
    /// net_write_timeout during authentication. The server enforces it,
    /// not the client.
    pub idle_timeout_ms: i32,
}

impl Default for CanalConfig {
    fn default() -> Self {
        CanalConfig {
            hostname: "localhost".to_string(),
            port: 11111,
            destination: "example".to_string(),
            client_id: "1001".to_string(),
            username: String::new(),
            password: String::new(),
            idle_timeout_ms: 60 * 60 * 1000,
        }
    }
}

impl CanalConfig {
    pub fn new(hostname: impl Into<String>, destination: impl Into<String>) -> Self {
        CanalConfig {
            hostname: hostname.into(),
            destination: destination.into(),
            ..Default::default()
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CanalConfig::default();
        assert_eq!(config.hostname, "localhost");
        assert_eq!(config.port, 11111);
        assert_eq!(config.destination, "example");
        assert_eq!(config.client_id, "1001");
        assert_eq!(config.idle_timeout_ms, 3_600_000);
        assert!(config.username.is_empty());
    }

    #[test]
    fn test_config_new() {
        let config = CanalConfig::new("canal.internal", "orders");
        assert_eq!(config.hostname, "canal.internal");
        assert_eq!(config.destination, "orders");
        assert_eq!(config.port, 11111);
    }
}
