//! The deposit ledger

use deposit_merkle::{IncrementalMerkleTree, Keccak256Hasher, DEPOSIT_TREE_DEPTH};

use crate::error::LedgerError;
use crate::event::{ChainStartEvent, DepositEvent, EventSink};
use crate::types::{
    DepositData, Gwei, Hash, MAX_DEPOSIT_GWEI, MAX_DEPOSIT_INPUT_LEN, MIN_DEPOSIT_GWEI,
    SECONDS_PER_DAY,
};

/// Append-only deposit ledger.
///
/// Owns the incremental Merkle tree, the deposit counters, and the one-shot
/// chain-start flag. Single writer: all mutation goes through
/// [`DepositLedger::deposit`]; embedders that share the ledger across
/// threads wrap it in a lock so reads are linearized against insertions.
#[derive(Clone, Debug)]
pub struct DepositLedger {
    /// Leaf store and root maintenance
    tree: IncrementalMerkleTree,
    /// Deposits whose amount equalled [`MAX_DEPOSIT_GWEI`]
    full_deposit_count: u64,
    /// Full-value deposits required to signal chain start
    chain_start_threshold: u64,
    /// Set when the chain-start event has been emitted. Persisted state,
    /// not inferred from the counter, so the signal stays one-shot even if
    /// a replay path ever revisits the counter.
    chain_started: bool,
}

impl DepositLedger {
    /// Create a ledger over the full-depth (2^32 leaf) tree.
    ///
    /// A `chain_start_threshold` of 0 arms the signal immediately: it fires
    /// on the first full-value deposit.
    pub fn new(chain_start_threshold: u64) -> Self {
        Self::with_tree_depth(chain_start_threshold, DEPOSIT_TREE_DEPTH)
    }

    /// Create a ledger over a reduced-depth tree
    pub fn with_tree_depth(chain_start_threshold: u64, depth: usize) -> Self {
        Self {
            tree: IncrementalMerkleTree::with_depth(depth),
            full_deposit_count: 0,
            chain_start_threshold,
            chain_started: false,
        }
    }

    /// Current root; the all-zero hash before any deposit. Pure read.
    pub fn get_root(&self) -> Hash {
        self.tree.root()
    }

    /// Record one deposit and return its 0-based leaf index.
    ///
    /// Validation happens before any mutation, so a rejection leaves the
    /// ledger untouched. On success the sink receives one [`DepositEvent`],
    /// plus the one-time [`ChainStartEvent`] if this deposit is the one
    /// that meets the full-deposit threshold.
    pub fn deposit(
        &mut self,
        amount_gwei: Gwei,
        timestamp: u64,
        input: Vec<u8>,
        sink: &mut dyn EventSink,
    ) -> Result<u64, LedgerError> {
        if self.tree.is_full() {
            return Err(LedgerError::CapacityExhausted);
        }
        if amount_gwei < MIN_DEPOSIT_GWEI || amount_gwei > MAX_DEPOSIT_GWEI {
            return Err(LedgerError::InvalidAmount { amount_gwei });
        }
        if input.len() > MAX_DEPOSIT_INPUT_LEN {
            return Err(LedgerError::InputTooLarge { len: input.len() });
        }

        let data = DepositData::new(amount_gwei, timestamp, input).encode();
        let previous_root = self.tree.root();
        let leaf_address = self.tree.next_leaf_address();

        let leaf_index = self
            .tree
            .push(Keccak256Hasher::hash(&data))
            .map_err(|_| LedgerError::CapacityExhausted)?;

        sink.on_deposit(DepositEvent {
            previous_root,
            data,
            merkle_tree_index: leaf_address.to_be_bytes(),
        });

        if amount_gwei == MAX_DEPOSIT_GWEI {
            self.full_deposit_count += 1;
            if !self.chain_started && self.full_deposit_count >= self.chain_start_threshold {
                self.chain_started = true;
                let day_boundary = timestamp - timestamp % SECONDS_PER_DAY + SECONDS_PER_DAY;
                sink.on_chain_start(ChainStartEvent {
                    root: self.tree.root(),
                    time: day_boundary.to_be_bytes(),
                });
            }
        }

        Ok(leaf_index)
    }

    /// Sibling chain for a leaf slot, deepest sibling first. Pure read.
    ///
    /// The slot need not hold an inserted deposit; unpopulated levels
    /// contribute the all-zero hash.
    pub fn get_branch(&self, leaf_index: u64) -> Result<Vec<Hash>, LedgerError> {
        self.tree
            .branch(leaf_index)
            .map_err(|_| LedgerError::InvalidLeafIndex { leaf_index })
    }

    /// Number of deposits recorded so far
    pub fn deposit_count(&self) -> u64 {
        self.tree.leaf_count()
    }

    /// Number of deposits of exactly [`MAX_DEPOSIT_GWEI`]
    pub fn full_deposit_count(&self) -> u64 {
        self.full_deposit_count
    }

    /// Whether the chain-start signal has fired
    pub fn chain_started(&self) -> bool {
        self.chain_started
    }

    /// The configured full-deposit threshold
    pub fn chain_start_threshold(&self) -> u64 {
        self.chain_start_threshold
    }
}
