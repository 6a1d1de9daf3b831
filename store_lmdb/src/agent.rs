//! LMDB implementation of AgentStore.
//!
//! Key format: `validator.as_str() ++ 0x00 ++ source.key_bytes()`. Addresses
//! never contain a NUL byte, so the validator prefix is unambiguous and a
//! prefix scan returns exactly one validator's agents.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use interstake_store::{AgentSource, AgentStore, MultiStakingAgent, StoreError};
use interstake_types::ValidatorAddress;

use crate::LmdbError;

pub struct LmdbAgentStore {
    pub(crate) env: Arc<Env>,
    pub(crate) agents_db: Database<Bytes, Bytes>,
}

fn validator_prefix(validator: &ValidatorAddress) -> Vec<u8> {
    let v = validator.as_str().as_bytes();
    let mut key = Vec::with_capacity(v.len() + 1);
    key.extend_from_slice(v);
    key.push(0x00);
    key
}

pub(crate) fn agent_key(validator: &ValidatorAddress, source: &AgentSource) -> Vec<u8> {
    let mut key = validator_prefix(validator);
    key.extend_from_slice(&source.key_bytes());
    key
}

impl AgentStore for LmdbAgentStore {
    fn get_agent(
        &self,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<MultiStakingAgent>, StoreError> {
        let key = agent_key(validator, source);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.agents_db.get(&rtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => {
                let agent: MultiStakingAgent =
                    bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(agent))
            }
            None => Ok(None),
        }
    }

    fn put_agent(&self, agent: &MultiStakingAgent) -> Result<(), StoreError> {
        let key = agent_key(&agent.validator, &agent.source);
        let bytes = bincode::serialize(agent).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.agents_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_agents_for_validator(
        &self,
        validator: &ValidatorAddress,
    ) -> Result<Vec<MultiStakingAgent>, StoreError> {
        let prefix = validator_prefix(validator);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .agents_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            let agent: MultiStakingAgent = bincode::deserialize(val).map_err(LmdbError::from)?;
            results.push(agent);
        }
        Ok(results)
    }

    fn iter_agents(&self) -> Result<Vec<MultiStakingAgent>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.agents_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            let agent: MultiStakingAgent = bincode::deserialize(val).map_err(LmdbError::from)?;
            results.push(agent);
        }
        Ok(results)
    }
}
