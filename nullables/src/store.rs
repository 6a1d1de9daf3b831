//! Nullable store: thread-safe in-memory storage for testing.
//!
//! Ordered maps stand in for LMDB so iteration order matches the on-disk
//! key order. Batch commits can be made to fail on demand.

use interstake_store::{
    AgentSource, AgentStore, BalanceStore, BatchStore, DepositRecord, DepositStore,
    MultiStakingAgent, SourceChain, SourceChainStore, StoreError, UnbondingEntry, UnbondingKey,
    UnbondingStore, WriteBatch, WriteOp,
};
use interstake_types::{Address, ChainId, Denom, Timestamp, ValidatorAddress};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type DepositKey = (Address, ValidatorAddress, AgentSource);

/// An in-memory implementation of every store trait.
#[derive(Default)]
pub struct NullStore {
    source_chains: Mutex<BTreeMap<ChainId, SourceChain>>,
    agents: Mutex<BTreeMap<(ValidatorAddress, AgentSource), MultiStakingAgent>>,
    deposits: Mutex<BTreeMap<DepositKey, DepositRecord>>,
    unbondings: Mutex<BTreeMap<UnbondingKey, UnbondingEntry>>,
    unbonding_sequence: Mutex<u64>,
    balances: Mutex<BTreeMap<(Address, Denom), u128>>,
    accounts: Mutex<BTreeSet<Address>>,
    fail_commits: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every batch commit fails and writes nothing.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

impl SourceChainStore for NullStore {
    fn put_source_chain(&self, chain: &SourceChain) -> Result<(), StoreError> {
        self.source_chains
            .lock()
            .unwrap()
            .insert(chain.chain_id.clone(), chain.clone());
        Ok(())
    }

    fn get_source_chain(&self, chain_id: &ChainId) -> Result<Option<SourceChain>, StoreError> {
        Ok(self.source_chains.lock().unwrap().get(chain_id).cloned())
    }

    fn source_chain_exists(&self, chain_id: &ChainId) -> Result<bool, StoreError> {
        Ok(self.source_chains.lock().unwrap().contains_key(chain_id))
    }

    fn iter_source_chains(&self) -> Result<Vec<SourceChain>, StoreError> {
        Ok(self.source_chains.lock().unwrap().values().cloned().collect())
    }
}

impl AgentStore for NullStore {
    fn get_agent(
        &self,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<MultiStakingAgent>, StoreError> {
        Ok(self
            .agents
            .lock()
            .unwrap()
            .get(&(validator.clone(), source.clone()))
            .cloned())
    }

    fn put_agent(&self, agent: &MultiStakingAgent) -> Result<(), StoreError> {
        self.agents.lock().unwrap().insert(
            (agent.validator.clone(), agent.source.clone()),
            agent.clone(),
        );
        Ok(())
    }

    fn iter_agents_for_validator(
        &self,
        validator: &ValidatorAddress,
    ) -> Result<Vec<MultiStakingAgent>, StoreError> {
        Ok(self
            .agents
            .lock()
            .unwrap()
            .values()
            .filter(|a| &a.validator == validator)
            .cloned()
            .collect())
    }

    fn iter_agents(&self) -> Result<Vec<MultiStakingAgent>, StoreError> {
        Ok(self.agents.lock().unwrap().values().cloned().collect())
    }
}

impl UnbondingStore for NullStore {
    fn put_unbonding(&self, entry: &UnbondingEntry) -> Result<(), StoreError> {
        self.unbondings
            .lock()
            .unwrap()
            .insert(entry.key(), entry.clone());
        Ok(())
    }

    fn get_unbonding(&self, key: &UnbondingKey) -> Result<Option<UnbondingEntry>, StoreError> {
        Ok(self.unbondings.lock().unwrap().get(key).cloned())
    }

    fn delete_unbonding(&self, key: &UnbondingKey) -> Result<(), StoreError> {
        self.unbondings.lock().unwrap().remove(key);
        Ok(())
    }

    fn iter_due_unbondings(&self, now: Timestamp) -> Result<Vec<UnbondingEntry>, StoreError> {
        let upper = UnbondingKey {
            completion_time: now,
            sequence: u64::MAX,
        };
        Ok(self
            .unbondings
            .lock()
            .unwrap()
            .range(..=upper)
            .map(|(_, e)| e.clone())
            .collect())
    }

    fn iter_unbondings(&self) -> Result<Vec<UnbondingEntry>, StoreError> {
        Ok(self.unbondings.lock().unwrap().values().cloned().collect())
    }

    fn next_unbonding_sequence(&self) -> Result<u64, StoreError> {
        let mut seq = self.unbonding_sequence.lock().unwrap();
        let current = *seq;
        *seq += 1;
        Ok(current)
    }
}

impl BalanceStore for NullStore {
    fn get_balance(&self, address: &Address, denom: &Denom) -> Result<u128, StoreError> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&(address.clone(), denom.clone()))
            .copied()
            .unwrap_or(0))
    }

    fn put_balance(&self, address: &Address, denom: &Denom, amount: u128) -> Result<(), StoreError> {
        self.balances
            .lock()
            .unwrap()
            .insert((address.clone(), denom.clone()), amount);
        Ok(())
    }

    fn account_exists(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self.accounts.lock().unwrap().contains(address))
    }

    fn put_account(&self, address: &Address) -> Result<(), StoreError> {
        self.accounts.lock().unwrap().insert(address.clone());
        Ok(())
    }
}

impl DepositStore for NullStore {
    fn get_deposit(
        &self,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<DepositRecord>, StoreError> {
        Ok(self
            .deposits
            .lock()
            .unwrap()
            .get(&(owner.clone(), validator.clone(), source.clone()))
            .cloned())
    }

    fn put_deposit(&self, record: &DepositRecord) -> Result<(), StoreError> {
        self.deposits.lock().unwrap().insert(
            (
                record.owner.clone(),
                record.validator.clone(),
                record.source.clone(),
            ),
            record.clone(),
        );
        Ok(())
    }

    fn iter_deposits_for_owner(&self, owner: &Address) -> Result<Vec<DepositRecord>, StoreError> {
        Ok(self
            .deposits
            .lock()
            .unwrap()
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect())
    }

    fn iter_deposits(&self) -> Result<Vec<DepositRecord>, StoreError> {
        Ok(self.deposits.lock().unwrap().values().cloned().collect())
    }
}

impl BatchStore for NullStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("commit rejected".into()));
        }
        // Lock order matches field order.
        let mut agents = self.agents.lock().unwrap();
        let mut deposits = self.deposits.lock().unwrap();
        let mut unbondings = self.unbondings.lock().unwrap();
        let mut balances = self.balances.lock().unwrap();
        let mut accounts = self.accounts.lock().unwrap();
        for op in batch.into_ops() {
            match op {
                WriteOp::PutAgent(a) => {
                    agents.insert((a.validator.clone(), a.source.clone()), a);
                }
                WriteOp::PutDeposit(r) => {
                    deposits.insert((r.owner.clone(), r.validator.clone(), r.source.clone()), r);
                }
                WriteOp::DeleteDeposit {
                    owner,
                    validator,
                    source,
                } => {
                    deposits.remove(&(owner, validator, source));
                }
                WriteOp::PutUnbonding(e) => {
                    unbondings.insert(e.key(), e);
                }
                WriteOp::DeleteUnbonding(key) => {
                    unbondings.remove(&key);
                }
                WriteOp::PutBalance {
                    address,
                    denom,
                    amount,
                } => {
                    balances.insert((address, denom), amount);
                }
                WriteOp::PutAccount(address) => {
                    accounts.insert(address);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::parse("istake1dave00").unwrap()
    }

    fn denom() -> Denom {
        Denom::parse("ibc/COINX").unwrap()
    }

    #[test]
    fn batch_applies_in_order() {
        let store = NullStore::new();
        let mut batch = WriteBatch::new();
        batch.put_account(&owner());
        batch.put_balance(&owner(), &denom(), 5);
        batch.put_balance(&owner(), &denom(), 7);
        store.commit(batch).unwrap();

        assert!(store.account_exists(&owner()).unwrap());
        assert_eq!(store.get_balance(&owner(), &denom()).unwrap(), 7);
    }

    #[test]
    fn failing_commit_writes_nothing() {
        let store = NullStore::new();
        store.fail_commits(true);
        let mut batch = WriteBatch::new();
        batch.put_balance(&owner(), &denom(), 5);
        assert!(matches!(store.commit(batch), Err(StoreError::Backend(_))));
        assert_eq!(store.get_balance(&owner(), &denom()).unwrap(), 0);

        store.fail_commits(false);
        let mut batch = WriteBatch::new();
        batch.put_balance(&owner(), &denom(), 5);
        store.commit(batch).unwrap();
        assert_eq!(store.get_balance(&owner(), &denom()).unwrap(), 5);
    }
}
