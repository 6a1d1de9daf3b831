//! LMDB implementation of BalanceStore.
//!
//! Balances are keyed `address ++ 0x00 ++ denom` with a 16-byte big-endian
//! value. Account existence lives in its own database.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use interstake_store::{BalanceStore, StoreError};
use interstake_types::{Address, Denom};

use crate::LmdbError;

pub struct LmdbBalanceStore {
    pub(crate) env: Arc<Env>,
    pub(crate) balances_db: Database<Bytes, Bytes>,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
}

pub(crate) fn balance_key(address: &Address, denom: &Denom) -> Vec<u8> {
    let a = address.as_str().as_bytes();
    let d = denom.as_str().as_bytes();
    let mut key = Vec::with_capacity(a.len() + 1 + d.len());
    key.extend_from_slice(a);
    key.push(0x00);
    key.extend_from_slice(d);
    key
}

impl BalanceStore for LmdbBalanceStore {
    fn get_balance(&self, address: &Address, denom: &Denom) -> Result<u128, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .balances_db
            .get(&rtxn, &balance_key(address, denom))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let arr: [u8; 16] = bytes.try_into().map_err(|_| {
                    StoreError::Serialization("invalid balance bytes length".into())
                })?;
                Ok(u128::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    fn put_balance(&self, address: &Address, denom: &Denom, amount: u128) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.balances_db
            .put(&mut wtxn, &balance_key(address, denom), &amount.to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn account_exists(&self, address: &Address) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .accounts_db
            .get(&rtxn, address.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        Ok(found)
    }

    fn put_account(&self, address: &Address) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.accounts_db
            .put(&mut wtxn, address.as_str().as_bytes(), &[])
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
