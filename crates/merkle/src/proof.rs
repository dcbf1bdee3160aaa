//! Branch proof verification

use serde::{Deserialize, Serialize};

use crate::{hasher::Keccak256Hasher, DEPOSIT_TREE_DEPTH};

/// Inclusion proof for one leaf slot: the sibling chain from the leaf's
/// immediate sibling up to the root's child level (deepest sibling first).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchProof {
    /// 0-based leaf slot being proven
    pub leaf_index: u64,
    /// Sibling hashes, one per tree level
    pub siblings: Vec<[u8; 32]>,
}

impl BranchProof {
    /// Create a proof from a leaf index and its sibling chain
    pub fn new(leaf_index: u64, siblings: Vec<[u8; 32]>) -> Self {
        Self {
            leaf_index,
            siblings,
        }
    }

    /// Verify this proof against a published root for the given leaf hash
    pub fn verify(&self, root: &[u8; 32], leaf_hash: &[u8; 32]) -> bool {
        let depth = self.siblings.len();
        if depth == 0 || depth > DEPOSIT_TREE_DEPTH {
            return false;
        }
        // The index must address a slot within a depth-sized tree.
        if self.leaf_index >> depth != 0 {
            return false;
        }

        self.compute_root(leaf_hash) == *root
    }

    /// Recompute the root implied by this proof and a leaf hash.
    ///
    /// At level `k`, bit `k` of the leaf index selects the side: 0 means
    /// the running hash is the left child and the sibling the right, 1
    /// means the reverse.
    pub fn compute_root(&self, leaf_hash: &[u8; 32]) -> [u8; 32] {
        let mut current = *leaf_hash;
        for (level, sibling) in self.siblings.iter().enumerate() {
            current = if (self.leaf_index >> level) & 1 == 0 {
                Keccak256Hasher::hash_pair(&current, sibling)
            } else {
                Keccak256Hasher::hash_pair(sibling, &current)
            };
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::IncrementalMerkleTree;

    #[test]
    fn test_every_inserted_leaf_verifies() {
        let mut tree = IncrementalMerkleTree::with_depth(4);
        let leaves: Vec<[u8; 32]> = (0..9u8).map(|i| Keccak256Hasher::hash(&[i])).collect();
        for leaf in &leaves {
            tree.push(*leaf).unwrap();
        }

        let root = tree.root();
        for (index, leaf) in leaves.iter().enumerate() {
            let proof = BranchProof::new(index as u64, tree.branch(index as u64).unwrap());
            assert!(proof.verify(&root, leaf), "leaf {index} failed to verify");
        }
    }

    #[test]
    fn test_wrong_leaf_rejected() {
        let mut tree = IncrementalMerkleTree::with_depth(4);
        let leaf = Keccak256Hasher::hash(b"honest");
        tree.push(leaf).unwrap();

        let proof = BranchProof::new(0, tree.branch(0).unwrap());
        assert!(!proof.verify(&tree.root(), &Keccak256Hasher::hash(b"forged")));
    }

    #[test]
    fn test_wrong_index_rejected() {
        let mut tree = IncrementalMerkleTree::with_depth(4);
        let leaf = Keccak256Hasher::hash(b"leaf");
        tree.push(leaf).unwrap();

        let proof = BranchProof::new(1, tree.branch(0).unwrap());
        assert!(!proof.verify(&tree.root(), &leaf));
    }

    #[test]
    fn test_malformed_siblings_rejected() {
        let mut tree = IncrementalMerkleTree::with_depth(4);
        let leaf = Keccak256Hasher::hash(b"leaf");
        tree.push(leaf).unwrap();
        let root = tree.root();

        let mut truncated = tree.branch(0).unwrap();
        truncated.pop();
        assert!(!BranchProof::new(0, truncated).verify(&root, &leaf));
        assert!(!BranchProof::new(0, Vec::new()).verify(&root, &leaf));
    }
}
