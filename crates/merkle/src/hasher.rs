//! Keccak256 hasher for the deposit tree

use tiny_keccak::{Hasher, Keccak};

/// Keccak256 hasher
pub struct Keccak256Hasher;

impl Keccak256Hasher {
    /// Hash two 32-byte values together
    pub fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        let mut hasher = Keccak::v256();
        hasher.update(left);
        hasher.update(right);
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        output
    }

    /// Hash an arbitrary byte string (used for leaf pre-images)
    pub fn hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Keccak::v256();
        hasher.update(data);
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_pair() {
        let left = [1u8; 32];
        let right = [2u8; 32];
        let hash = Keccak256Hasher::hash_pair(&left, &right);
        assert_ne!(hash, [0u8; 32]);
        assert_ne!(hash, Keccak256Hasher::hash_pair(&right, &left));
    }

    #[test]
    fn test_hash_pair_matches_concat() {
        let left = [3u8; 32];
        let right = [4u8; 32];
        let mut concat = [0u8; 64];
        concat[..32].copy_from_slice(&left);
        concat[32..].copy_from_slice(&right);
        assert_eq!(
            Keccak256Hasher::hash_pair(&left, &right),
            Keccak256Hasher::hash(&concat)
        );
    }
}
