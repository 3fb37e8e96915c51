use std::sync::atomic::Ordering;

use log::{info, warn};

use super::block::Block;
use super::chain::{lock, Blockchain};
use super::peer::PeerClient;
use super::validation::validate_chain;

impl Blockchain {
    /// Longest valid chain rule
    ///
    /// Asks every registered node for its chain, one at a time, and keeps the
    /// longest valid one that beats our own length. Peers that cannot be
    /// reached or send an invalid chain are skipped. Nodes are scanned in
    /// address order and only a strictly longer chain displaces the current
    /// candidate, so among equally long chains the first address wins.
    ///
    /// # Returns
    ///
    /// true if our chain was replaced
    pub async fn resolve_conflicts(&self, client: &dyn PeerClient) -> bool {
        let neighbours = self.nodes();
        let mut max_length = self.len();
        let mut new_chain: Option<(String, Vec<Block>)> = None;

        for node in neighbours {
            let peer_chain = match client.fetch_chain(&node).await.and_then(|c| c.ensure_consistent()) {
                Ok(peer_chain) => peer_chain,
                Err(err) => {
                    warn!("Skipping node {}: {}", node, err);
                    continue;
                }
            };

            if peer_chain.length <= max_length {
                continue;
            }

            match validate_chain(&peer_chain.chain) {
                Ok(()) => {
                    max_length = peer_chain.length;
                    new_chain = Some((node, peer_chain.chain));
                }
                Err(err) => warn!("Rejecting chain from node {}: {}", node, err),
            }
        }

        let (node, candidate) = match new_chain {
            Some(found) => found,
            None => {
                info!("Our chain is authoritative");
                return false;
            }
        };

        let mut chain = lock(&self.chain);
        if candidate.len() <= chain.len() {
            info!(
                "Chain from node {} no longer longer than ours ({} <= {})",
                node,
                candidate.len(),
                chain.len()
            );
            return false;
        }

        info!(
            "Replacing chain of length {} with chain of length {} from node {}",
            chain.len(),
            candidate.len(),
            node
        );
        *chain = candidate;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        true
    }
}
