use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::transaction::Transaction;

/// Proof stored in the genesis block
pub const GENESIS_PROOF: u64 = 100;

/// Previous hash stored in the genesis block, which has no predecessor
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Represents a block in the blockchain
///
/// Fields are declared in lexicographic order so that the serialized form is
/// canonical. Do not reorder them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Block {
    /// Position of the block in the chain, starting at 1
    pub index: u64,

    /// Hex digest of the previous block
    pub previous_hash: String,

    /// Proof of work relative to the previous block's proof
    pub proof: u64,

    /// Seconds since the Unix epoch when the block was created
    pub timestamp: f64,

    /// Transactions drained from the mempool when the block was created
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Creates a new block stamped with the current time
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `transactions` - The list of transactions to include in the block
    /// * `proof` - The proof of work
    /// * `previous_hash` - The hash of the previous block
    pub fn new(index: u64, transactions: Vec<Transaction>, proof: u64, previous_hash: String) -> Self {
        Block {
            index,
            previous_hash,
            proof,
            timestamp: now_seconds(),
            transactions,
        }
    }

    /// Creates the genesis block
    pub fn genesis() -> Self {
        Block::new(1, Vec::new(), GENESIS_PROOF, GENESIS_PREVIOUS_HASH.to_string())
    }

    /// Calculates the hash of the block
    ///
    /// # Returns
    ///
    /// The SHA-256 hash of the canonical JSON encoding as a hexadecimal string
    pub fn calculate_hash(&self) -> String {
        // Plain strings and numbers only; JSON encoding cannot fail
        let encoded = serde_json::to_vec(self).expect("block serializes to JSON");

        hex::encode(Sha256::digest(&encoded))
    }
}

/// Hashes a block
pub fn hash(block: &Block) -> String {
    block.calculate_hash()
}

fn now_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
