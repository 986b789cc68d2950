//! Gateway configuration.

use std::{env, fmt, net::SocketAddr};

const API_KEY_ENV: &str = "HELIUS_API_KEY";
const UPSTREAM_URL_ENV: &str = "DAS_UPSTREAM_URL";
const PORT_ENV: &str = "PORT";

pub const DEFAULT_UPSTREAM_URL: &str = "https://mainnet.helius-rpc.com/";
pub const DEFAULT_PORT: u16 = 8888;

/// Gateway configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Upstream credential. `None` keeps the service up but fails every method call.
    pub api_key: Option<String>,
    /// Upstream JSON-RPC base URL.
    pub upstream_url: String,
    /// Listen address.
    pub listen_addr: SocketAddr,
}

impl GatewayConfig {
    pub fn new(api_key: Option<String>, upstream_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            upstream_url: upstream_url.into(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let api_key = env::var(API_KEY_ENV).ok();
        let upstream_url =
            env::var(UPSTREAM_URL_ENV).unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string());
        let port: u16 = env::var(PORT_ENV)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            ..Self::new(api_key, upstream_url)
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(None, DEFAULT_UPSTREAM_URL)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("upstream_url", &self.upstream_url)
            .field("listen_addr", &self.listen_addr)
            .finish()
    }
}
