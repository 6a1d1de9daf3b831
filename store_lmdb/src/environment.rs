//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::{
    LmdbAgentStore, LmdbBalanceStore, LmdbBatchStore, LmdbDepositStore, LmdbError,
    LmdbMetaStore, LmdbSourceChainStore, LmdbUnbondingStore,
};

const DB_SOURCE_CHAINS: &str = "source_chains";
const DB_AGENTS: &str = "agents";
const DB_DEPOSITS: &str = "deposits";
const DB_UNBONDING: &str = "unbonding";
const DB_BALANCES: &str = "balances";
const DB_ACCOUNTS: &str = "accounts";
const DB_META: &str = "meta";

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    source_chains_db: Database<Bytes, Bytes>,
    agents_db: Database<Bytes, Bytes>,
    deposits_db: Database<Bytes, Bytes>,
    unbonding_db: Database<Bytes, Bytes>,
    balances_db: Database<Bytes, Bytes>,
    accounts_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per process and path; no
        // other handle to the same files is created while this one lives.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let source_chains_db = env.create_database(&mut wtxn, Some(DB_SOURCE_CHAINS))?;
        let agents_db = env.create_database(&mut wtxn, Some(DB_AGENTS))?;
        let deposits_db = env.create_database(&mut wtxn, Some(DB_DEPOSITS))?;
        let unbonding_db = env.create_database(&mut wtxn, Some(DB_UNBONDING))?;
        let balances_db = env.create_database(&mut wtxn, Some(DB_BALANCES))?;
        let accounts_db = env.create_database(&mut wtxn, Some(DB_ACCOUNTS))?;
        let meta_db = env.create_database(&mut wtxn, Some(DB_META))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            source_chains_db,
            agents_db,
            deposits_db,
            unbonding_db,
            balances_db,
            accounts_db,
            meta_db,
        })
    }

    pub fn source_chain_store(&self) -> LmdbSourceChainStore {
        LmdbSourceChainStore {
            env: Arc::clone(&self.env),
            source_chains_db: self.source_chains_db,
        }
    }

    pub fn agent_store(&self) -> LmdbAgentStore {
        LmdbAgentStore {
            env: Arc::clone(&self.env),
            agents_db: self.agents_db,
        }
    }

    pub fn deposit_store(&self) -> LmdbDepositStore {
        LmdbDepositStore {
            env: Arc::clone(&self.env),
            deposits_db: self.deposits_db,
        }
    }

    pub fn unbonding_store(&self) -> LmdbUnbondingStore {
        LmdbUnbondingStore {
            env: Arc::clone(&self.env),
            unbonding_db: self.unbonding_db,
            meta_db: self.meta_db,
        }
    }

    pub fn balance_store(&self) -> LmdbBalanceStore {
        LmdbBalanceStore {
            env: Arc::clone(&self.env),
            balances_db: self.balances_db,
            accounts_db: self.accounts_db,
        }
    }

    /// Atomic commits across the agent, deposit, unbonding and bank
    /// keyspaces.
    pub fn batch_store(&self) -> LmdbBatchStore {
        LmdbBatchStore {
            env: Arc::clone(&self.env),
            agents_db: self.agents_db,
            deposits_db: self.deposits_db,
            unbonding_db: self.unbonding_db,
            balances_db: self.balances_db,
            accounts_db: self.accounts_db,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }
}
