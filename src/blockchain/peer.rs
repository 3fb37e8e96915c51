use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::block::Block;

/// Errors that can occur while fetching a peer's chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Request to {address} failed: {reason}")]
    Request { address: String, reason: String },

    #[error("Peer {address} answered with status {status}")]
    Status { address: String, status: u16 },

    #[error("Peer {address} sent a malformed chain: {reason}")]
    Malformed { address: String, reason: String },

    #[error("Peer reported length {reported} but sent {actual} blocks")]
    LengthMismatch { reported: usize, actual: usize },
}

/// Chain reported by a peer's chain endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerChain {
    pub chain: Vec<Block>,

    #[serde(alias = "lenght")]
    pub length: usize,
}

impl PeerChain {
    pub fn new(chain: Vec<Block>) -> Self {
        PeerChain {
            length: chain.len(),
            chain,
        }
    }

    /// Rejects a response whose reported length disagrees with its blocks
    pub fn ensure_consistent(self) -> Result<Self, NetworkError> {
        if self.length != self.chain.len() {
            return Err(NetworkError::LengthMismatch {
                reported: self.length,
                actual: self.chain.len(),
            });
        }

        Ok(self)
    }
}

/// Outbound side of consensus: fetches the chain held by another node
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Fetches the chain of the node at `address` (`host[:port]`)
    async fn fetch_chain(&self, address: &str) -> Result<PeerChain, NetworkError>;
}

/// Fetches chains over HTTP from `http://{address}/chain`
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    client: reqwest::Client,
}

impl HttpPeerClient {
    /// Creates a client; `None` leaves requests without a timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpPeerClient {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, address: &str) -> Result<PeerChain, NetworkError> {
        let url = format!("http://{}/chain", address);
        debug!("Fetching chain from {}", url);

        let response = self.client.get(&url).send().await.map_err(|err| NetworkError::Request {
            address: address.to_string(),
            reason: err.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                address: address.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<PeerChain>().await.map_err(|err| NetworkError::Malformed {
            address: address.to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_misspelled_length_key() {
        let genesis = serde_json::to_value(Block::genesis()).unwrap();
        let body = serde_json::json!({ "chain": [genesis], "lenght": 1 });

        let peer_chain: PeerChain = serde_json::from_value(body).unwrap();
        assert_eq!(peer_chain.length, 1);
        assert_eq!(peer_chain.chain.len(), 1);
    }

    #[test]
    fn test_rejects_missing_chain() {
        let body = serde_json::json!({ "length": 3 });

        assert!(serde_json::from_value::<PeerChain>(body).is_err());
    }

    #[test]
    fn test_length_mismatch() {
        let peer_chain = PeerChain {
            chain: vec![Block::genesis()],
            length: 5,
        };

        assert_eq!(
            peer_chain.ensure_consistent(),
            Err(NetworkError::LengthMismatch { reported: 5, actual: 1 })
        );
        assert!(PeerChain::new(vec![Block::genesis()]).ensure_consistent().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_peer() {
        let client = HttpPeerClient::new(Some(Duration::from_secs(2))).unwrap();

        // Port 9 (discard) on localhost is not expected to serve HTTP
        let result = client.fetch_chain("127.0.0.1:9").await;
        assert!(matches!(result, Err(NetworkError::Request { .. })));
    }
}
