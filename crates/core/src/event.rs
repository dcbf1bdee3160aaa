//! Ledger events and the sink seam
//!
//! The ledger decides what to emit and when; transport is the sink's
//! concern. Field encodings are part of the compatibility surface external
//! verifiers depend on.

use serde::{Deserialize, Serialize};

use crate::types::Hash;

/// Emitted on every accepted deposit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    /// Root as it stood immediately before this deposit's leaf was written
    pub previous_root: Hash,
    /// The full encoded leaf pre-image (amount, timestamp, input)
    pub data: Vec<u8>,
    /// Big-endian node address of the leaf (2^depth + leaf index)
    pub merkle_tree_index: [u8; 8],
}

/// Emitted exactly once, when the full-deposit threshold is first met
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStartEvent {
    /// Root after the triggering deposit
    pub root: Hash,
    /// Big-endian start of the UTC day strictly after the triggering
    /// deposit's timestamp
    pub time: [u8; 8],
}

/// Receiver for ledger notifications
pub trait EventSink {
    /// A deposit was accepted
    fn on_deposit(&mut self, event: DepositEvent);
    /// The chain-start threshold was reached
    fn on_chain_start(&mut self, event: ChainStartEvent);
}

/// Sink that buffers events for later inspection or forwarding
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    /// Deposit events in emission order
    pub deposits: Vec<DepositEvent>,
    /// The chain-start event, if it fired
    pub chain_start: Option<ChainStartEvent>,
}

impl EventSink for RecordingSink {
    fn on_deposit(&mut self, event: DepositEvent) {
        self.deposits.push(event);
    }

    fn on_chain_start(&mut self, event: ChainStartEvent) {
        self.chain_start = Some(event);
    }
}
