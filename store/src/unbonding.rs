//! Unbonding queue storage trait.

use crate::agent::AgentSource;
use crate::StoreError;
use interstake_types::{Address, Coin, Timestamp, ValidatorAddress};
use serde::{Deserialize, Serialize};

/// Position of an entry in the queue: completion time, then insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnbondingKey {
    pub completion_time: Timestamp,
    pub sequence: u64,
}

impl UnbondingKey {
    /// Big-endian encoding; byte order equals sweep order.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.completion_time.as_secs().to_be_bytes());
        out[8..].copy_from_slice(&self.sequence.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 16 {
            return None;
        }
        let mut time = [0u8; 8];
        let mut seq = [0u8; 8];
        time.copy_from_slice(&bytes[..8]);
        seq.copy_from_slice(&bytes[8..]);
        Some(Self {
            completion_time: Timestamp::new(u64::from_be_bytes(time)),
            sequence: u64::from_be_bytes(seq),
        })
    }
}

/// A pending, time-locked withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingEntry {
    /// Insertion sequence, unique across the queue's lifetime.
    pub sequence: u64,
    pub owner: Address,
    pub validator: ValidatorAddress,
    pub source: AgentSource,
    /// Equivalent stake debited from the agent on maturity.
    pub equivalent_amount: u128,
    /// Coins released to `owner` on maturity.
    pub balance: Coin,
    pub completion_time: Timestamp,
    pub creation_height: u64,
}

impl UnbondingEntry {
    pub fn key(&self) -> UnbondingKey {
        UnbondingKey {
            completion_time: self.completion_time,
            sequence: self.sequence,
        }
    }
}

/// Keyed by `(completion_time, sequence)`.
pub trait UnbondingStore {
    fn put_unbonding(&self, entry: &UnbondingEntry) -> Result<(), StoreError>;
    fn get_unbonding(&self, key: &UnbondingKey) -> Result<Option<UnbondingEntry>, StoreError>;
    fn delete_unbonding(&self, key: &UnbondingKey) -> Result<(), StoreError>;

    /// Entries with `completion_time <= now`, in key order.
    fn iter_due_unbondings(&self, now: Timestamp) -> Result<Vec<UnbondingEntry>, StoreError>;

    /// Every queued entry, in key order.
    fn iter_unbondings(&self) -> Result<Vec<UnbondingEntry>, StoreError>;

    /// Allocate the next insertion sequence number.
    fn next_unbonding_sequence(&self) -> Result<u64, StoreError>;

    fn unbonding_count(&self) -> Result<u64, StoreError> {
        self.iter_unbondings().map(|v| v.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(time: u64, sequence: u64) -> UnbondingKey {
        UnbondingKey {
            completion_time: Timestamp::new(time),
            sequence,
        }
    }

    #[test]
    fn byte_order_matches_key_order() {
        let keys = [key(5, 9), key(5, 10), key(6, 0), key(256, 1), key(u64::MAX, 0)];
        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].to_bytes() < pair[1].to_bytes());
        }
    }

    #[test]
    fn key_bytes_decode() {
        let k = key(1_700_000_000, 42);
        assert_eq!(UnbondingKey::from_bytes(&k.to_bytes()), Some(k));
        assert_eq!(UnbondingKey::from_bytes(&[0u8; 15]), None);
    }
}
