//! Configuration management for Gatehouse.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, info};

/// Default request cap per one-second window for unconfigured clients.
pub const DEFAULT_REQUEST_MAX: u32 = 10;
/// Default token-bucket refill rate (and capacity) for unconfigured clients.
pub const DEFAULT_TOKENS_PER_SEC: u32 = 5;

/// Main configuration for the Gatehouse service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatehouseConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-client rate limit configuration
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

/// Per-client rate limit entries, as listed in the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Known clients and their limits
    #[serde(default)]
    pub clients: Vec<ClientLimitsEntry>,
}

/// A single client's entry in the configuration file.
///
/// A zero or absent field means "not configured" and resolves to the
/// documented default, matching how an absent entry resolves wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientLimitsEntry {
    /// Client identifier
    pub id: String,

    /// Requests admitted per one-second window
    #[serde(default)]
    pub request_max: u32,

    /// Token-bucket refill rate in tokens per second (also the capacity)
    #[serde(default)]
    pub tokens_per_sec: u32,
}

/// Resolved limits for one client, immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientLimits {
    /// Client identifier these limits apply to
    pub client_id: String,
    /// Requests admitted per one-second window
    pub request_max: u32,
    /// Token-bucket refill rate in tokens per second (also the capacity)
    pub tokens_per_sec: u32,
}

impl ClientLimits {
    /// Default limits for a client absent from configuration.
    pub fn default_for(client_id: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            request_max: DEFAULT_REQUEST_MAX,
            tokens_per_sec: DEFAULT_TOKENS_PER_SEC,
        }
    }
}

impl LimitsConfig {
    /// Resolve the limits for a client identifier.
    ///
    /// This is a total function: an unknown identifier or a zero-valued
    /// field falls back to the documented defaults. The admission core
    /// never observes a configuration error, only a resolved value.
    pub fn resolve(&self, client_id: &str) -> ClientLimits {
        let entry = self.clients.iter().find(|c| c.id == client_id);

        match entry {
            Some(entry) => {
                let request_max = if entry.request_max > 0 {
                    entry.request_max
                } else {
                    DEFAULT_REQUEST_MAX
                };
                let tokens_per_sec = if entry.tokens_per_sec > 0 {
                    entry.tokens_per_sec
                } else {
                    DEFAULT_TOKENS_PER_SEC
                };
                ClientLimits {
                    client_id: client_id.to_string(),
                    request_max,
                    tokens_per_sec,
                }
            }
            None => {
                debug!(client_id = %client_id, "Client not in configuration, using default limits");
                ClientLimits::default_for(client_id)
            }
        }
    }
}

impl GatehouseConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| crate::error::GatehouseError::Config(e.to_string()))
    }
}
