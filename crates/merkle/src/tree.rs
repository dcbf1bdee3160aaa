//! Incremental Merkle tree implementation

use std::collections::HashMap;

use thiserror::Error;

use crate::{hasher::Keccak256Hasher, DEPOSIT_TREE_DEPTH, ZERO_HASH};

/// Tree errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// Every leaf slot has been used
    #[error("tree capacity exhausted")]
    CapacityExhausted,
    /// Branch query for a slot outside the tree
    #[error("leaf index {leaf_index} out of range for capacity {capacity}")]
    LeafIndexOutOfRange { leaf_index: u64, capacity: u64 },
}

/// Append-only Merkle tree over a sparse node store.
///
/// Nodes are addressed 1-based: the root is address 1, the children of `p`
/// are `2p` and `2p + 1`, and the leaves of a depth-`d` tree occupy
/// `[2^d, 2^(d+1))`. Unwritten addresses read as [`ZERO_HASH`]. Leaves are
/// assigned left to right in insertion order and each push rebuilds the
/// `d` ancestors on the path to the root.
#[derive(Clone, Debug)]
pub struct IncrementalMerkleTree {
    /// Written nodes: address -> hash
    nodes: HashMap<u64, [u8; 32]>,
    /// Number of leaves inserted so far
    leaf_count: u64,
    /// Tree depth
    depth: usize,
}

impl IncrementalMerkleTree {
    /// Create an empty tree at the full deposit depth (2^32 leaves)
    pub fn new() -> Self {
        Self::with_depth(DEPOSIT_TREE_DEPTH)
    }

    /// Create an empty tree with a reduced depth. Panics if `depth` is 0 or
    /// larger than [`DEPOSIT_TREE_DEPTH`].
    pub fn with_depth(depth: usize) -> Self {
        assert!(
            depth >= 1 && depth <= DEPOSIT_TREE_DEPTH,
            "tree depth must be in 1..={DEPOSIT_TREE_DEPTH}"
        );
        Self {
            nodes: HashMap::new(),
            leaf_count: 0,
            depth,
        }
    }

    /// Get the root hash (address 1); [`ZERO_HASH`] before any push
    pub fn root(&self) -> [u8; 32] {
        self.node(1)
    }

    /// Number of leaves inserted so far
    pub fn leaf_count(&self) -> u64 {
        self.leaf_count
    }

    /// Total number of leaf slots (2^depth)
    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    /// Whether every leaf slot has been used
    pub fn is_full(&self) -> bool {
        self.leaf_count == self.capacity()
    }

    /// Node address the next push will write to
    pub fn next_leaf_address(&self) -> u64 {
        self.capacity() + self.leaf_count
    }

    /// Read a node by address, defaulting unwritten nodes to [`ZERO_HASH`]
    pub fn node(&self, address: u64) -> [u8; 32] {
        self.nodes.get(&address).copied().unwrap_or(ZERO_HASH)
    }

    /// Append a leaf hash at the next free slot and rebuild its ancestor
    /// chain. Returns the 0-based leaf index.
    pub fn push(&mut self, leaf: [u8; 32]) -> Result<u64, MerkleError> {
        if self.is_full() {
            return Err(MerkleError::CapacityExhausted);
        }

        let mut address = self.next_leaf_address();
        self.nodes.insert(address, leaf);

        // Walk up to the root, rehashing each parent over its current
        // children. The untouched sibling may still be ZERO_HASH.
        for _ in 0..self.depth {
            address /= 2;
            let parent =
                Keccak256Hasher::hash_pair(&self.node(2 * address), &self.node(2 * address + 1));
            self.nodes.insert(address, parent);
        }

        let index = self.leaf_count;
        self.leaf_count += 1;
        Ok(index)
    }

    /// Collect the sibling chain for a leaf slot, deepest sibling first.
    ///
    /// The slot does not need to hold an inserted leaf: unwritten nodes
    /// contribute [`ZERO_HASH`], so the result is well-defined for every
    /// in-range index.
    pub fn branch(&self, leaf_index: u64) -> Result<Vec<[u8; 32]>, MerkleError> {
        if leaf_index >= self.capacity() {
            return Err(MerkleError::LeafIndexOutOfRange {
                leaf_index,
                capacity: self.capacity(),
            });
        }

        let mut address = self.capacity() + leaf_index;
        let mut siblings = Vec::with_capacity(self.depth);
        for _ in 0..self.depth {
            siblings.push(self.node(address ^ 1));
            address /= 2;
        }
        Ok(siblings)
    }

    /// Tree depth
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for IncrementalMerkleTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Recompute the root from scratch over the full leaf layer.
    fn naive_root(leaves: &[[u8; 32]], depth: usize) -> [u8; 32] {
        let mut level: Vec<[u8; 32]> = leaves.to_vec();
        level.resize(1 << depth, ZERO_HASH);
        for _ in 0..depth {
            level = level
                .chunks(2)
                .map(|pair| Keccak256Hasher::hash_pair(&pair[0], &pair[1]))
                .collect();
        }
        level[0]
    }

    #[test]
    fn test_root_matches_naive_recompute() {
        let depth = 4;
        let mut tree = IncrementalMerkleTree::with_depth(depth);
        let mut leaves = Vec::new();

        for i in 0..11u8 {
            let leaf = Keccak256Hasher::hash(&[i]);
            leaves.push(leaf);
            tree.push(leaf).unwrap();
            assert_eq!(tree.root(), naive_root(&leaves, depth));
        }
    }

    #[test]
    fn test_branch_of_uninserted_leaf() {
        let tree = IncrementalMerkleTree::with_depth(4);
        let branch = tree.branch(7).unwrap();
        assert_eq!(branch.len(), 4);
        assert!(branch.iter().all(|sibling| *sibling == ZERO_HASH));
    }

    #[test]
    fn test_branch_index_out_of_range() {
        let tree = IncrementalMerkleTree::with_depth(4);
        assert_eq!(
            tree.branch(16),
            Err(MerkleError::LeafIndexOutOfRange {
                leaf_index: 16,
                capacity: 16,
            })
        );
    }

    #[test]
    fn test_capacity_exhausted() {
        let mut tree = IncrementalMerkleTree::with_depth(2);
        for i in 0..4u8 {
            tree.push(Keccak256Hasher::hash(&[i])).unwrap();
        }
        assert!(tree.is_full());

        let root = tree.root();
        assert_eq!(
            tree.push(Keccak256Hasher::hash(b"overflow")),
            Err(MerkleError::CapacityExhausted)
        );
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.root(), root);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let mut tree = IncrementalMerkleTree::with_depth(4);
        tree.push(Keccak256Hasher::hash(b"leaf")).unwrap();
        assert_eq!(tree.root(), tree.root());
        assert_eq!(tree.branch(0), tree.branch(0));
    }
}
