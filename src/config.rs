use std::env;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime settings of a node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    /// Interface the HTTP server binds to
    pub host: String,

    /// Port the HTTP server listens on
    pub port: u16,

    /// Timeout for each chain request sent to a peer, `None` waits forever
    pub request_timeout: Option<Duration>,

    /// Identifier credited with mining rewards
    pub node_identifier: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            host: "0.0.0.0".to_string(),
            port: 5600,
            request_timeout: Some(Duration::from_secs(10)),
            node_identifier: new_node_identifier(),
        }
    }
}

impl NodeConfig {
    /// Loads the configuration from the environment
    ///
    /// Reads `HOST`, `PORT`, `PEER_TIMEOUT_SECS` (0 disables the timeout) and
    /// `NODE_ID`. A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = NodeConfig::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value: port })?;
        }

        if let Some(timeout) = lookup("PEER_TIMEOUT_SECS") {
            let secs: u64 = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PEER_TIMEOUT_SECS",
                value: timeout,
            })?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(node_identifier) = lookup("NODE_ID").filter(|id| !id.is_empty()) {
            config.node_identifier = node_identifier;
        }

        Ok(config)
    }
}

/// Generates a globally unique identifier for this node
fn new_node_identifier() -> String {
    Uuid::new_v4().simple().to_string()
}
