//! LMDB implementation of SourceChainStore.
//!
//! Key: `chain_id` bytes. Value: bincode-encoded [`SourceChain`].

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use interstake_store::{SourceChain, SourceChainStore, StoreError};
use interstake_types::ChainId;

use crate::LmdbError;

pub struct LmdbSourceChainStore {
    pub(crate) env: Arc<Env>,
    pub(crate) source_chains_db: Database<Bytes, Bytes>,
}

impl SourceChainStore for LmdbSourceChainStore {
    fn put_source_chain(&self, chain: &SourceChain) -> Result<(), StoreError> {
        let bytes = bincode::serialize(chain).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.source_chains_db
            .put(&mut wtxn, chain.chain_id.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_source_chain(&self, chain_id: &ChainId) -> Result<Option<SourceChain>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .source_chains_db
            .get(&rtxn, chain_id.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let chain: SourceChain = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(chain))
            }
            None => Ok(None),
        }
    }

    fn source_chain_exists(&self, chain_id: &ChainId) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .source_chains_db
            .get(&rtxn, chain_id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        Ok(found)
    }

    fn iter_source_chains(&self) -> Result<Vec<SourceChain>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .source_chains_db
            .iter(&rtxn)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            let chain: SourceChain = bincode::deserialize(val).map_err(LmdbError::from)?;
            results.push(chain);
        }
        Ok(results)
    }
}
