//! Incremental Merkle tree for the deposit ledger
//!
//! This crate provides a fixed-depth (up to 32-level) append-only Merkle
//! tree. Key features:
//! - Sparse node store: only written nodes are kept, everything else reads
//!   as the zero value
//! - O(depth) insertion: each push rebuilds only the leaf-to-root path
//! - Branch proofs: sibling chains verifiable against the published root

mod tree;
mod proof;
mod hasher;

pub use tree::{IncrementalMerkleTree, MerkleError};
pub use proof::BranchProof;
pub use hasher::Keccak256Hasher;

/// Depth of the deposit tree (2^32 leaf capacity).
pub const DEPOSIT_TREE_DEPTH: usize = 32;

/// Value of every unwritten node. This is the all-zero value, not the hash
/// of empty input; zero children are valid hashing inputs.
pub const ZERO_HASH: [u8; 32] = [0u8; 32];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree() {
        let tree = IncrementalMerkleTree::new();
        assert_eq!(tree.root(), ZERO_HASH);
        assert_eq!(tree.leaf_count(), 0);
    }

    #[test]
    fn test_push_and_verify() {
        let mut tree = IncrementalMerkleTree::new();

        let leaf = Keccak256Hasher::hash(b"deposit data");
        let index = tree.push(leaf).unwrap();
        assert_eq!(index, 0);
        assert_ne!(tree.root(), ZERO_HASH);

        let proof = BranchProof::new(index, tree.branch(index).unwrap());
        assert!(proof.verify(&tree.root(), &leaf));
    }
}
