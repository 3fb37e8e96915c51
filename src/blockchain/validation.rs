use thiserror::Error;

use super::block::{hash, Block};
use super::proof::valid_proof;

/// Reasons a candidate chain is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Chain has no blocks")]
    EmptyChain,

    #[error("Block at position {position} has index {found}, expected {expected}")]
    UnexpectedIndex { position: usize, expected: u64, found: u64 },

    #[error("Block at position {position} does not link to the hash of its predecessor")]
    BrokenLink { position: usize },

    #[error("Block at position {position} has a proof that does not solve its predecessor's puzzle")]
    InvalidProof { position: usize },
}

/// Checks every link of a candidate chain
///
/// Walks the chain from the second block onward and fails on the first block
/// whose `previous_hash` or proof does not match its predecessor in the
/// candidate. Indexes must count up from 1 without gaps. Never touches local
/// state, so it is safe on untrusted input.
pub fn validate_chain(chain: &[Block]) -> Result<(), ChainError> {
    let genesis = chain.first().ok_or(ChainError::EmptyChain)?;
    if genesis.index != 1 {
        return Err(ChainError::UnexpectedIndex {
            position: 0,
            expected: 1,
            found: genesis.index,
        });
    }

    for (position, pair) in chain.windows(2).enumerate() {
        let (last_block, block) = (&pair[0], &pair[1]);

        // Indexes stay equal to position + 1, so they cannot overflow
        let expected = position as u64 + 2;
        if block.index != expected {
            return Err(ChainError::UnexpectedIndex {
                position: position + 1,
                expected,
                found: block.index,
            });
        }

        if block.previous_hash != hash(last_block) {
            return Err(ChainError::BrokenLink { position: position + 1 });
        }

        if !valid_proof(last_block.proof, block.proof) {
            return Err(ChainError::InvalidProof { position: position + 1 });
        }
    }

    Ok(())
}

/// Determines if a given chain is valid
pub fn valid_chain(chain: &[Block]) -> bool {
    validate_chain(chain).is_ok()
}
