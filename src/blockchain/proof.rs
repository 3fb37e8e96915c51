use sha2::{Digest, Sha256};

/// Number of leading zero hex digits a proof hash must have
pub const DIFFICULTY: usize = 4;

/// Validates a proof: does hash(last_proof, proof) start with DIFFICULTY zeros?
///
/// Both proofs are rendered as decimal strings and concatenated before hashing.
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    let guess = format!("{}{}", last_proof, proof);
    let guess_hash = hex::encode(Sha256::digest(guess.as_bytes()));

    guess_hash.starts_with(&"0".repeat(DIFFICULTY))
}

/// Finds the smallest proof that is valid relative to `last_proof`
///
/// Brute force from zero. Blocks the calling thread until a proof is found.
pub fn proof_of_work(last_proof: u64) -> u64 {
    let mut proof = 0;

    while !valid_proof(last_proof, proof) {
        proof += 1;
    }

    proof
}

/// Same search as [`proof_of_work`], but gives up as soon as `should_stop`
/// returns true. The predicate is polled before every attempt.
pub fn proof_of_work_until<F>(last_proof: u64, mut should_stop: F) -> Option<u64>
where
    F: FnMut() -> bool,
{
    let mut proof = 0;

    loop {
        if should_stop() {
            return None;
        }

        if valid_proof(last_proof, proof) {
            return Some(proof);
        }

        proof += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_proof_matches_digest_prefix() {
        for proof in 0..2000 {
            let digest = hex::encode(Sha256::digest(format!("100{}", proof).as_bytes()));
            assert_eq!(valid_proof(100, proof), digest.starts_with("0000"));
        }
    }

    #[test]
    fn test_proof_of_work_finds_smallest_proof() {
        let proof = proof_of_work(100);

        assert!(valid_proof(100, proof));
        assert!((0..proof).all(|candidate| !valid_proof(100, candidate)));
    }

    #[test]
    fn test_proof_of_work_until_matches_unbounded_search() {
        let proof = proof_of_work(7);

        assert_eq!(proof_of_work_until(7, || false), Some(proof));
    }

    #[test]
    fn test_proof_of_work_until_stops() {
        assert_eq!(proof_of_work_until(100, || true), None);

        // Stop right before the winning attempt
        let proof = proof_of_work(100);
        let mut polls = 0;
        let result = proof_of_work_until(100, || {
            polls += 1;
            polls > proof
        });
        assert_eq!(result, None);

        let mut polls = 0;
        let result = proof_of_work_until(100, || {
            polls += 1;
            polls > proof + 1
        });
        assert_eq!(result, Some(proof));
    }
}
