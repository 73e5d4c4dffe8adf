use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{KeeperError, Result};

/// Server configuration, loaded once at startup from a TOML file.
///
/// Every field has a sensible default so the server starts without any
/// config file at all (in-memory store on localhost).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address the RPC listener binds to.
    #[serde(default = "default_address")]
    pub listen_address: String,

    /// TCP port of the RPC listener.
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON file backing the document store. In-memory only when absent.
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Server-wide salt. Only used to verify legacy records stored
    /// without a per-user salt.
    #[serde(default)]
    pub salt: String,

    /// Idle connections are closed after this many seconds.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Deadline for a single request; the request is cancelled afterwards.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_server_log_level")]
    pub log_level: String,
}

/// Client configuration, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Address of the vaultkeeper server.
    #[serde(default = "default_address")]
    pub server_address: String,

    /// Port of the vaultkeeper server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base64-encoded 32-byte key for item field encryption.
    #[serde(default)]
    pub key: Option<String>,

    /// Verbose logging.
    #[serde(default)]
    pub debug: bool,

    /// Deadline for a single round trip to the server.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3200
}

fn default_idle_timeout_secs() -> u64 {
    300 // 5 minutes
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_server_log_level() -> String {
    "info".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_address: default_address(),
            port: default_port(),
            store_path: None,
            salt: String::new(),
            idle_timeout_secs: default_idle_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_server_log_level(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_address: default_address(),
            port: default_port(),
            key: None,
            debug: false,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServerSettings {
    /// Default config file name, looked up in the working directory.
    pub const FILE_NAME: &'static str = "vaultkeeper-server.toml";

    /// Load settings from `path`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        load_toml(path)
    }

    /// Socket address of the RPC listener. Host names are resolved.
    pub async fn listen_addr(&self) -> Result<SocketAddr> {
        resolve_addr(&self.listen_address, self.port).await
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ClientSettings {
    /// Default config file name, looked up in the working directory.
    pub const FILE_NAME: &'static str = "vaultkeeper.toml";

    /// Load settings from `path`, falling back to defaults when missing.
    pub fn load(path: &Path) -> Result<Self> {
        load_toml(path)
    }

    /// Socket address of the server; the first address a host name
    /// resolves to.
    pub async fn server_addr(&self) -> Result<SocketAddr> {
        resolve_addr(&self.server_address, self.port).await
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Log filter derived from the `debug` flag.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "error"
        }
    }
}

fn load_toml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let contents = std::fs::read_to_string(path)?;

    toml::from_str(&contents)
        .map_err(|e| KeeperError::Config(format!("Failed to parse {}: {e}", path.display())))
}

/// Accepts IP literals (v4 or bare v6) and host names.
async fn resolve_addr(address: &str, port: u16) -> Result<SocketAddr> {
    let mut addrs = tokio::net::lookup_host((address, port))
        .await
        .map_err(|e| KeeperError::Config(format!("cannot resolve '{address}': {e}")))?;
    addrs
        .next()
        .ok_or_else(|| KeeperError::Config(format!("'{address}' resolved to no addresses")))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_server_settings_are_sensible() {
        let s = ServerSettings::default();
        assert_eq!(s.listen_address, "127.0.0.1");
        assert_eq!(s.port, 3200);
        assert!(s.store_path.is_none());
        assert_eq!(s.idle_timeout(), Duration::from_secs(300));
        assert_eq!(s.request_timeout(), Duration::from_secs(30));
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = ServerSettings::load(&tmp.path().join(ServerSettings::FILE_NAME)).unwrap();
        assert_eq!(settings.port, 3200);

        let client = ClientSettings::load(&tmp.path().join(ClientSettings::FILE_NAME)).unwrap();
        assert!(client.key.is_none());
        assert!(!client.debug);
    }

    #[tokio::test]
    async fn load_parses_server_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("server.toml");
        let config = r#"
listen_address = "0.0.0.0"
port = 4000
store_path = "/var/lib/vaultkeeper/users.json"
salt = "pepper"
idle_timeout_secs = 60
"#;
        fs::write(&path, config).unwrap();

        let settings = ServerSettings::load(&path).unwrap();
        assert_eq!(settings.listen_address, "0.0.0.0");
        assert_eq!(settings.port, 4000);
        assert_eq!(
            settings.store_path,
            Some(PathBuf::from("/var/lib/vaultkeeper/users.json"))
        );
        assert_eq!(settings.salt, "pepper");
        assert_eq!(settings.idle_timeout_secs, 60);
        // Rest should be defaults
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.listen_addr().await.unwrap().port(), 4000);
    }

    #[tokio::test]
    async fn load_parses_client_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("client.toml");
        fs::write(&path, "port = 4100\ndebug = true\nkey = \"abc\"\n").unwrap();

        let settings = ClientSettings::load(&path).unwrap();
        assert_eq!(settings.port, 4100);
        assert_eq!(settings.key.as_deref(), Some("abc"));
        assert_eq!(settings.log_level(), "debug");
        assert_eq!(settings.server_addr().await.unwrap().to_string(), "127.0.0.1:4100");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "not valid {{toml").unwrap();

        assert!(ServerSettings::load(&path).is_err());
    }

    #[tokio::test]
    async fn bad_address_is_a_config_error() {
        let s = ServerSettings {
            listen_address: "not an address".to_string(),
            ..ServerSettings::default()
        };
        assert!(matches!(s.listen_addr().await, Err(KeeperError::Config(_))));
    }

    #[tokio::test]
    async fn host_name_resolves_with_port() {
        let s = ClientSettings {
            server_address: "localhost".to_string(),
            ..ClientSettings::default()
        };
        let addr = s.server_addr().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 3200);
    }

    #[tokio::test]
    async fn bare_ipv6_literal_is_accepted() {
        let s = ClientSettings {
            server_address: "::1".to_string(),
            port: 4100,
            ..ClientSettings::default()
        };
        assert_eq!(s.server_addr().await.unwrap().to_string(), "[::1]:4100");
    }
}
