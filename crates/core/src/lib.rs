//! Deposit ledger core logic
//!
//! This crate layers deposit semantics over the incremental Merkle tree:
//! - Amount and payload validation
//! - Deterministic big-endian deposit-data encoding
//! - Deposit counters and the one-time chain-start signal
//! - Event types handed to an external sink

pub mod types;
pub mod error;
pub mod event;
pub mod ledger;

pub use types::{
    DepositData, Gwei, Hash, MAX_DEPOSIT_DATA_LEN, MAX_DEPOSIT_GWEI, MAX_DEPOSIT_INPUT_LEN,
    MIN_DEPOSIT_GWEI, SECONDS_PER_DAY,
};
pub use error::LedgerError;
pub use event::{ChainStartEvent, DepositEvent, EventSink, RecordingSink};
pub use ledger::DepositLedger;
