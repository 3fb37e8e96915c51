use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sender used for the synthetic transaction that rewards a miner
pub const REWARD_SENDER: &str = "0";

/// Amount credited to a miner for forging a block
pub const MINING_REWARD: f64 = 1.0;

/// Represents a transaction waiting in the mempool or recorded in a block
///
/// Fields are declared in lexicographic order. Block hashes are computed over
/// the serialized form, so the order must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Amount being transferred (not validated)
    pub amount: f64,

    /// Recipient's identifier
    pub recipient: String,

    /// Sender's identifier ("0" for mining rewards)
    pub sender: String,
}

impl Transaction {
    /// Creates a new transaction
    ///
    /// # Arguments
    ///
    /// * `sender` - The identifier of the sender
    /// * `recipient` - The identifier of the recipient
    /// * `amount` - The amount to transfer
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Transaction {
            amount,
            recipient: recipient.into(),
            sender: sender.into(),
        }
    }

    /// Creates the reward transaction paid to the node that mined a block
    pub fn new_reward(recipient: impl Into<String>) -> Self {
        Transaction::new(REWARD_SENDER, recipient, MINING_REWARD)
    }
}
