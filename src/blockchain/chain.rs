use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use thiserror::Error;

use super::block::{hash, Block};
use super::proof::proof_of_work_until;
use super::registry::{NodeRegistry, RegistryError};
use super::transaction::Transaction;

/// Errors that can occur while mining
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiningError {
    #[error("Mining was cancelled")]
    Cancelled,

    #[error("Chain tip moved from block {expected} while mining")]
    StaleTip { expected: u64 },
}

/// A single node's ledger engine
///
/// Owns the chain, the pending transactions and the peer registry. Lock
/// order is always chain, then pending transactions.
#[derive(Debug)]
pub struct Blockchain {
    /// The chain of blocks
    pub(super) chain: Mutex<Vec<Block>>,

    /// Pending transactions to be included in the next block
    pending_transactions: Mutex<Vec<Transaction>>,

    /// Known peers
    nodes: Mutex<NodeRegistry>,

    /// Bumped every time the chain is replaced by consensus
    pub(super) epoch: AtomicU64,

    /// Set once the node is shutting down
    shutdown: AtomicBool,
}

impl Default for Blockchain {
    fn default() -> Self {
        Blockchain::new()
    }
}

impl Blockchain {
    /// Creates a new blockchain with a genesis block
    pub fn new() -> Self {
        Blockchain {
            chain: Mutex::new(vec![Block::genesis()]),
            pending_transactions: Mutex::new(Vec::new()),
            nodes: Mutex::new(NodeRegistry::new()),
            epoch: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Gets the last block in the chain
    pub fn last_block(&self) -> Block {
        let chain = lock(&self.chain);
        // The chain always holds at least the genesis block
        chain[chain.len() - 1].clone()
    }

    /// Gets the entire blockchain
    pub fn get_chain(&self) -> Vec<Block> {
        lock(&self.chain).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.chain).len()
    }

    /// Gets all pending transactions
    pub fn get_pending_transactions(&self) -> Vec<Transaction> {
        lock(&self.pending_transactions).clone()
    }

    /// Creates a new block from the pending transactions and adds it to the chain
    ///
    /// # Arguments
    ///
    /// * `proof` - The proof given by the proof of work search
    /// * `previous_hash` - Hash of the previous block, computed from the last block when `None`
    ///
    /// # Returns
    ///
    /// The new block
    pub fn new_block(&self, proof: u64, previous_hash: Option<String>) -> Block {
        let mut chain = lock(&self.chain);
        let mut pending = lock(&self.pending_transactions);

        append_block(&mut chain, &mut pending, proof, previous_hash)
    }

    /// Adds a new transaction to the pending transactions
    ///
    /// # Returns
    ///
    /// The index of the block that will hold this transaction
    pub fn new_transaction(&self, sender: &str, recipient: &str, amount: f64) -> u64 {
        let chain = lock(&self.chain);
        lock(&self.pending_transactions).push(Transaction::new(sender, recipient, amount));

        // Block indexes always equal their position + 1
        let index = chain.len() as u64 + 1;
        info!("Queued transaction {} -> {} for block {}", sender, recipient, index);
        index
    }

    /// Mines a new block and rewards `miner`
    ///
    /// Searches a proof against the current tip, then adds the reward
    /// transaction and forges the block in one critical section. Gives up if
    /// the chain is replaced or the node shuts down during the search.
    pub fn mine(&self, miner: &str) -> Result<Block, MiningError> {
        let last_block = self.last_block();
        let last_hash = hash(&last_block);
        let start_epoch = self.epoch.load(Ordering::SeqCst);

        let proof = proof_of_work_until(last_block.proof, || {
            self.shutdown.load(Ordering::Relaxed) || self.epoch.load(Ordering::Relaxed) != start_epoch
        })
        .ok_or_else(|| {
            warn!("Mining on top of block {} was cancelled", last_block.index);
            MiningError::Cancelled
        })?;

        let mut chain = lock(&self.chain);
        let tip_moved = match chain.last() {
            Some(tip) => tip.index != last_block.index || hash(tip) != last_hash,
            None => true,
        };
        if tip_moved {
            warn!("Discarding proof {}: chain tip moved while mining", proof);
            return Err(MiningError::StaleTip {
                expected: last_block.index,
            });
        }

        let mut pending = lock(&self.pending_transactions);
        pending.push(Transaction::new_reward(miner));

        Ok(append_block(&mut chain, &mut pending, proof, Some(last_hash)))
    }

    /// Registers a peer
    ///
    /// # Returns
    ///
    /// The canonical `host[:port]` form of the address
    pub fn register_node(&self, address: &str) -> Result<String, RegistryError> {
        let location = lock(&self.nodes).register(address)?;
        info!("Registered node {}", location);
        Ok(location)
    }

    /// Registers several peers, all or nothing
    pub fn register_nodes<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Vec<String>, RegistryError> {
        let mut nodes = lock(&self.nodes);
        let mut staged = nodes.clone();

        for address in addresses {
            staged.register(address.as_ref())?;
        }

        *nodes = staged;
        info!("Registry now holds {} nodes", nodes.len());
        Ok(nodes.to_vec())
    }

    /// Gets the registered peers in scan order
    pub fn nodes(&self) -> Vec<String> {
        lock(&self.nodes).to_vec()
    }

    /// Stops any proof search in progress and refuses new ones
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Drains `pending` into a new block appended to `chain`
fn append_block(
    chain: &mut Vec<Block>,
    pending: &mut Vec<Transaction>,
    proof: u64,
    previous_hash: Option<String>,
) -> Block {
    let previous_hash = match previous_hash {
        Some(previous_hash) => previous_hash,
        None => chain.last().map(hash).unwrap_or_default(),
    };

    let block = Block::new(
        chain.len() as u64 + 1,
        std::mem::take(pending),
        proof,
        previous_hash,
    );
    chain.push(block.clone());

    info!(
        "Forged block {} with {} transactions (proof {})",
        block.index,
        block.transactions.len(),
        block.proof
    );
    block
}

/// Locks a mutex, recovering the data if another thread panicked while holding it
pub(super) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
