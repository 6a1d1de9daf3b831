//! LMDB implementation of UnbondingStore.
//!
//! Key format: [`UnbondingKey::to_bytes`], i.e. big-endian completion time
//! followed by big-endian sequence, so a forward cursor walks the queue in
//! sweep order.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use interstake_store::{StoreError, UnbondingEntry, UnbondingKey, UnbondingStore};
use interstake_types::Timestamp;

use crate::LmdbError;

const SEQUENCE_KEY: &[u8] = b"unbonding_sequence";

pub struct LmdbUnbondingStore {
    pub(crate) env: Arc<Env>,
    pub(crate) unbonding_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbUnbondingStore {
    fn decode_all<'t>(
        iter: impl Iterator<Item = heed::Result<(&'t [u8], &'t [u8])>>,
    ) -> Result<Vec<UnbondingEntry>, StoreError> {
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            let entry: UnbondingEntry = bincode::deserialize(val).map_err(LmdbError::from)?;
            results.push(entry);
        }
        Ok(results)
    }
}

impl UnbondingStore for LmdbUnbondingStore {
    fn put_unbonding(&self, entry: &UnbondingEntry) -> Result<(), StoreError> {
        let key = entry.key().to_bytes();
        let bytes = bincode::serialize(entry).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.unbonding_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_unbonding(&self, key: &UnbondingKey) -> Result<Option<UnbondingEntry>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .unbonding_db
            .get(&rtxn, &key.to_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let entry: UnbondingEntry = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    fn delete_unbonding(&self, key: &UnbondingKey) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.unbonding_db
            .delete(&mut wtxn, &key.to_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_due_unbondings(&self, now: Timestamp) -> Result<Vec<UnbondingEntry>, StoreError> {
        let upper = UnbondingKey {
            completion_time: now,
            sequence: u64::MAX,
        }
        .to_bytes();
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bounds = (Bound::Unbounded, Bound::Included(upper.as_slice()));
        let iter = self
            .unbonding_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        Self::decode_all(iter)
    }

    fn iter_unbondings(&self) -> Result<Vec<UnbondingEntry>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.unbonding_db.iter(&rtxn).map_err(LmdbError::from)?;
        Self::decode_all(iter)
    }

    fn next_unbonding_sequence(&self) -> Result<u64, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current = match self
            .meta_db
            .get(&wtxn, SEQUENCE_KEY)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                    StoreError::Corruption("unbonding sequence has unexpected length".into())
                })?;
                u64::from_be_bytes(arr)
            }
            None => 0,
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| StoreError::Corruption("unbonding sequence exhausted".into()))?;
        self.meta_db
            .put(&mut wtxn, SEQUENCE_KEY, &next.to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(current)
    }

    fn unbonding_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.unbonding_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
