use std::collections::BTreeSet;

use thiserror::Error;
use url::Url;

/// Errors that can occur while registering a peer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Invalid node address: {0}")]
    InvalidAddress(String),
}

/// Deduplicated set of peer addresses in `host[:port]` form
///
/// Kept ordered so consensus visits peers in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: BTreeSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        NodeRegistry::default()
    }

    /// Adds a new node to the registry
    ///
    /// # Arguments
    ///
    /// * `address` - Address of the node, e.g. `http://192.168.0.5:5000`
    ///
    /// # Returns
    ///
    /// The canonical `host[:port]` form that was stored
    pub fn register(&mut self, address: &str) -> Result<String, RegistryError> {
        let location = network_location(address)?;
        self.nodes.insert(location.clone());
        Ok(location)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }
}

/// Extracts the `host[:port]` part of an address, dropping scheme and path
///
/// Addresses without a scheme are read as `http://`. A port written in the
/// address is kept even when it is the scheme's default.
pub fn network_location(address: &str) -> Result<String, RegistryError> {
    let trimmed = address.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    let parsed = Url::parse(&with_scheme)
        .map_err(|err| RegistryError::InvalidAddress(format!("{}: {}", address, err)))?;

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(RegistryError::InvalidAddress(address.to_string())),
    };

    let port = if has_explicit_port(&with_scheme) {
        parsed.port_or_known_default()
    } else {
        parsed.port()
    };

    Ok(match port {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Whether the authority of `address` (which must contain `://`) ends in `:port`
fn has_explicit_port(address: &str) -> bool {
    let rest = address.split_once("://").map_or(address, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();

    if host_port.ends_with(']') {
        return false;
    }

    match host_port.rsplit_once(':') {
        Some((_, port)) => !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
