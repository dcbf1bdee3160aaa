//! Common types and the deposit-data encoding

use serde::{Deserialize, Serialize};

/// 32-byte hash type
pub type Hash = [u8; 32];

/// Amount type, denominated in gwei (the smallest value unit here)
pub type Gwei = u64;

/// Smallest accepted deposit
pub const MIN_DEPOSIT_GWEI: Gwei = 1_000_000_000;

/// Largest accepted deposit; deposits of exactly this amount count toward
/// the chain-start threshold
pub const MAX_DEPOSIT_GWEI: Gwei = 32_000_000_000;

/// Seconds in a UTC day, used for the chain-start day boundary
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Upper bound on the caller-supplied opaque deposit input
pub const MAX_DEPOSIT_INPUT_LEN: usize = 2048;

/// Upper bound on the encoded leaf pre-image (amount + timestamp + input)
pub const MAX_DEPOSIT_DATA_LEN: usize = MAX_DEPOSIT_INPUT_LEN + 16;

/// One deposit's leaf pre-image, before hashing.
///
/// The encoded layout is fixed and independent of the input's internal
/// structure: 8-byte big-endian amount, 8-byte big-endian timestamp, then
/// the raw input bytes. External verifiers re-derive leaf hashes from this
/// exact layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositData {
    /// Deposit amount in gwei
    pub amount_gwei: Gwei,
    /// Acceptance timestamp, seconds since epoch
    pub timestamp: u64,
    /// Opaque caller payload; the ledger never interprets it
    pub input: Vec<u8>,
}

impl DepositData {
    /// Create a leaf pre-image from its fields
    pub fn new(amount_gwei: Gwei, timestamp: u64, input: Vec<u8>) -> Self {
        Self {
            amount_gwei,
            timestamp,
            input,
        }
    }

    /// Encode to the fixed wire layout
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.input.len());
        out.extend_from_slice(&self.amount_gwei.to_be_bytes());
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out.extend_from_slice(&self.input);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let data = DepositData::new(MIN_DEPOSIT_GWEI, 7, vec![0xaa, 0xbb]);
        let encoded = data.encode();

        assert_eq!(encoded.len(), 18);
        assert_eq!(&encoded[0..8], &MIN_DEPOSIT_GWEI.to_be_bytes());
        assert_eq!(&encoded[8..16], &[0, 0, 0, 0, 0, 0, 0, 7]);
        assert_eq!(&encoded[16..], &[0xaa, 0xbb]);
    }

    #[test]
    fn test_encode_empty_input() {
        let data = DepositData::new(MAX_DEPOSIT_GWEI, 0, Vec::new());
        assert_eq!(data.encode().len(), 16);
    }
}
