//! Ledger error taxonomy

use thiserror::Error;

use crate::types::Gwei;

/// Rejections surfaced by the deposit ledger.
///
/// Every variant is raised before any mutation: a rejected call leaves the
/// ledger in its prior state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Amount outside the accepted deposit range
    #[error("deposit amount {amount_gwei} gwei outside accepted range")]
    InvalidAmount { amount_gwei: Gwei },
    /// Opaque deposit input over the 2048-byte bound
    #[error("deposit input of {len} bytes exceeds maximum")]
    InputTooLarge { len: usize },
    /// Every leaf slot of the deposit tree has been used
    #[error("deposit tree capacity exhausted")]
    CapacityExhausted,
    /// Branch query for a slot outside the tree
    #[error("leaf index {leaf_index} out of range")]
    InvalidLeafIndex { leaf_index: u64 },
}
