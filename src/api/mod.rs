// API module
//
// This module contains the HTTP boundary of a node

pub mod error;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use crate::blockchain::{Blockchain, PeerClient};

// Re-export main components for easier access
pub use error::ApiError;
pub use routes::configure_routes;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// The node's ledger engine
    pub blockchain: Arc<Blockchain>,

    /// Client used to fetch peer chains during consensus
    pub peers: Arc<dyn PeerClient>,

    /// Identifier credited with mining rewards
    pub node_identifier: String,
}

impl AppState {
    pub fn new(blockchain: Arc<Blockchain>, peers: Arc<dyn PeerClient>, node_identifier: String) -> Self {
        AppState {
            blockchain,
            peers,
            node_identifier,
        }
    }
}
