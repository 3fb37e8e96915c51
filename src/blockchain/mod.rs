// Blockchain module
//
// This module contains the ledger engine of a node:
// - Block structure and block hashing
// - Proof of work search and verification
// - Chain, mempool and mining
// - Chain validation
// - Peer registry and remote chain fetching
// - Longest valid chain consensus

pub mod block;
pub mod chain;
pub mod consensus;
pub mod peer;
pub mod proof;
pub mod registry;
pub mod transaction;
pub mod validation;

// Re-export main components for easier access
pub use block::{hash, Block};
pub use chain::{Blockchain, MiningError};
pub use peer::{HttpPeerClient, NetworkError, PeerChain, PeerClient};
pub use registry::{NodeRegistry, RegistryError};
pub use transaction::Transaction;
pub use validation::{valid_chain, validate_chain, ChainError};
