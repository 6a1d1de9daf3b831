//! Commits a [`WriteBatch`] inside a single LMDB write transaction.
//!
//! If any staged write fails the transaction is dropped uncommitted and
//! LMDB rolls every earlier write in it back.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RwTxn};

use interstake_store::{BatchStore, StoreError, WriteBatch, WriteOp};

use crate::agent::agent_key;
use crate::balance::balance_key;
use crate::deposit::deposit_key;
use crate::LmdbError;

pub struct LmdbBatchStore {
    pub(crate) env: Arc<Env>,
    pub(crate) agents_db: Database<Bytes, Bytes>,
    pub(crate) deposits_db: Database<Bytes, Bytes>,
    pub(crate) unbonding_db: Database<Bytes, Bytes>,
    pub(crate) balances_db: Database<Bytes, Bytes>,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
}

impl LmdbBatchStore {
    fn apply(&self, wtxn: &mut RwTxn<'_>, op: &WriteOp) -> Result<(), LmdbError> {
        match op {
            WriteOp::PutAgent(agent) => {
                let bytes = bincode::serialize(agent)?;
                self.agents_db
                    .put(wtxn, &agent_key(&agent.validator, &agent.source), &bytes)?;
            }
            WriteOp::PutDeposit(record) => {
                let bytes = bincode::serialize(record)?;
                let key = deposit_key(&record.owner, &record.validator, &record.source);
                self.deposits_db.put(wtxn, &key, &bytes)?;
            }
            WriteOp::DeleteDeposit {
                owner,
                validator,
                source,
            } => {
                self.deposits_db
                    .delete(wtxn, &deposit_key(owner, validator, source))?;
            }
            WriteOp::PutUnbonding(entry) => {
                let bytes = bincode::serialize(entry)?;
                self.unbonding_db
                    .put(wtxn, &entry.key().to_bytes(), &bytes)?;
            }
            WriteOp::DeleteUnbonding(key) => {
                self.unbonding_db.delete(wtxn, &key.to_bytes())?;
            }
            WriteOp::PutBalance {
                address,
                denom,
                amount,
            } => {
                self.balances_db
                    .put(wtxn, &balance_key(address, denom), &amount.to_be_bytes())?;
            }
            WriteOp::PutAccount(address) => {
                self.accounts_db
                    .put(wtxn, address.as_str().as_bytes(), &[])?;
            }
        }
        Ok(())
    }
}

impl BatchStore for LmdbBatchStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let ops = batch.into_ops();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for op in &ops {
            self.apply(&mut wtxn, op)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(ops = ops.len(), "committed write batch");
        Ok(())
    }
}
