//! LMDB implementation of DepositStore.
//!
//! Key format: `owner ++ 0x00 ++ validator ++ 0x00 ++ source.key_bytes()`.
//! Neither address contains a NUL byte, so an owner prefix scan returns
//! exactly one owner's records.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use interstake_store::{AgentSource, DepositRecord, DepositStore, StoreError};
use interstake_types::{Address, ValidatorAddress};

use crate::LmdbError;

pub struct LmdbDepositStore {
    pub(crate) env: Arc<Env>,
    pub(crate) deposits_db: Database<Bytes, Bytes>,
}

fn owner_prefix(owner: &Address) -> Vec<u8> {
    let mut key = owner.as_str().as_bytes().to_vec();
    key.push(0x00);
    key
}

pub(crate) fn deposit_key(
    owner: &Address,
    validator: &ValidatorAddress,
    source: &AgentSource,
) -> Vec<u8> {
    let mut key = owner_prefix(owner);
    key.extend_from_slice(validator.as_str().as_bytes());
    key.push(0x00);
    key.extend_from_slice(&source.key_bytes());
    key
}

fn decode_all<'t>(
    iter: impl Iterator<Item = heed::Result<(&'t [u8], &'t [u8])>>,
) -> Result<Vec<DepositRecord>, StoreError> {
    let mut results = Vec::new();
    for entry in iter {
        let (_key, val) = entry.map_err(LmdbError::from)?;
        let record: DepositRecord = bincode::deserialize(val).map_err(LmdbError::from)?;
        results.push(record);
    }
    Ok(results)
}

impl DepositStore for LmdbDepositStore {
    fn get_deposit(
        &self,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<DepositRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .deposits_db
            .get(&rtxn, &deposit_key(owner, validator, source))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn put_deposit(&self, record: &DepositRecord) -> Result<(), StoreError> {
        let key = deposit_key(&record.owner, &record.validator, &record.source);
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.deposits_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_deposits_for_owner(&self, owner: &Address) -> Result<Vec<DepositRecord>, StoreError> {
        let prefix = owner_prefix(owner);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .deposits_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        decode_all(iter)
    }

    fn iter_deposits(&self) -> Result<Vec<DepositRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.deposits_db.iter(&rtxn).map_err(LmdbError::from)?;
        decode_all(iter)
    }
}
