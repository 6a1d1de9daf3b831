//! Agent ledger operations.

use std::sync::Arc;

use interstake_equivalence::EquivalenceCalculator;
use interstake_store::{
    AgentSource, AgentStore, DepositRecord, DepositStore, MultiStakingAgent, WriteBatch,
};
use interstake_types::{mul_div_ceil, Address, Coin, Denom, ValidatorAddress};

use crate::LedgerError;

/// Sole writer of the agent and deposit keyspaces.
///
/// The `stage_*` methods read through `batch` first, so several staged
/// changes to the same row compose. Nothing is visible until the caller
/// commits the batch.
pub struct AgentLedger {
    store: Arc<dyn AgentStore + Send + Sync>,
    deposits: Arc<dyn DepositStore + Send + Sync>,
    calculator: EquivalenceCalculator,
    bond_denom: Denom,
}

impl AgentLedger {
    pub fn new(
        store: Arc<dyn AgentStore + Send + Sync>,
        deposits: Arc<dyn DepositStore + Send + Sync>,
        calculator: EquivalenceCalculator,
        bond_denom: Denom,
    ) -> Self {
        Self {
            store,
            deposits,
            calculator,
            bond_denom,
        }
    }

    pub fn bond_denom(&self) -> &Denom {
        &self.bond_denom
    }

    /// The row for `(validator, source)`, or `None` before the first credit.
    pub fn get_agent(
        &self,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<MultiStakingAgent>, LedgerError> {
        Ok(self.store.get_agent(validator, source)?)
    }

    /// Current equivalent stake for `(validator, source)`; zero if no row exists.
    pub fn balance(
        &self,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<u128, LedgerError> {
        Ok(self
            .get_agent(validator, source)?
            .map(|a| a.equivalent_amount)
            .unwrap_or(0))
    }

    /// Increase the row's equivalent stake, creating the row if absent.
    pub fn credit(
        &self,
        validator: &ValidatorAddress,
        source: &AgentSource,
        amount: u128,
    ) -> Result<MultiStakingAgent, LedgerError> {
        let agent = credited(self.store.get_agent(validator, source)?, validator, source, amount)?;
        self.store.put_agent(&agent)?;
        tracing::debug!(%validator, %source, amount, total = agent.equivalent_amount, "credited agent");
        Ok(agent)
    }

    /// Decrease the row's equivalent stake.
    ///
    /// Fails with [`LedgerError::InsufficientBalance`] without touching the
    /// store when `amount` exceeds the current balance.
    pub fn debit(
        &self,
        validator: &ValidatorAddress,
        source: &AgentSource,
        amount: u128,
    ) -> Result<MultiStakingAgent, LedgerError> {
        let agent = debited(self.store.get_agent(validator, source)?, validator, source, amount)?;
        self.store.put_agent(&agent)?;
        tracing::debug!(%validator, %source, amount, total = agent.equivalent_amount, "debited agent");
        Ok(agent)
    }

    /// [`credit`](Self::credit) into `batch`.
    pub fn stage_credit(
        &self,
        batch: &mut WriteBatch,
        validator: &ValidatorAddress,
        source: &AgentSource,
        amount: u128,
    ) -> Result<MultiStakingAgent, LedgerError> {
        let current = self.staged_or_stored_agent(batch, validator, source)?;
        let agent = credited(current, validator, source, amount)?;
        batch.put_agent(agent.clone());
        Ok(agent)
    }

    /// [`debit`](Self::debit) into `batch`. `batch` is untouched on error.
    pub fn stage_debit(
        &self,
        batch: &mut WriteBatch,
        validator: &ValidatorAddress,
        source: &AgentSource,
        amount: u128,
    ) -> Result<MultiStakingAgent, LedgerError> {
        let current = self.staged_or_stored_agent(batch, validator, source)?;
        let agent = debited(current, validator, source, amount)?;
        batch.put_agent(agent.clone());
        Ok(agent)
    }

    /// Credit the agent row and record that `owner` put `coins` in for
    /// `equivalent_amount` of it. Returns the staged agent row.
    pub fn stage_deposit(
        &self,
        batch: &mut WriteBatch,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
        coins: u128,
        equivalent_amount: u128,
    ) -> Result<MultiStakingAgent, LedgerError> {
        let overflow = || LedgerError::Overflow {
            validator: validator.clone(),
            agent_source: source.clone(),
        };
        let mut record = self
            .staged_or_stored_deposit(batch, owner, validator, source)?
            .unwrap_or_else(|| DepositRecord {
                owner: owner.clone(),
                validator: validator.clone(),
                source: source.clone(),
                coins: 0,
                equivalent_amount: 0,
            });
        record.coins = record.coins.checked_add(coins).ok_or_else(overflow)?;
        record.equivalent_amount = record
            .equivalent_amount
            .checked_add(equivalent_amount)
            .ok_or_else(overflow)?;

        let agent = self.stage_credit(batch, validator, source, equivalent_amount)?;
        batch.put_deposit(record);
        Ok(agent)
    }

    /// Take `coins` back out of `owner`'s deposit and return the equivalent
    /// stake they stand for.
    ///
    /// A partial withdrawal is charged `ceil(equivalent × coins / deposited)`;
    /// withdrawing everything that is left is charged exactly what is left,
    /// so the record never ends with stake but no coins. The record is
    /// reduced (or removed once empty) in `batch`, which reserves the amount
    /// against further requests.
    pub fn stage_redemption(
        &self,
        batch: &mut WriteBatch,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
        coins: u128,
    ) -> Result<u128, LedgerError> {
        let record = self
            .staged_or_stored_deposit(batch, owner, validator, source)?
            .filter(|r| r.coins > 0)
            .ok_or_else(|| LedgerError::NoDeposit {
                owner: owner.clone(),
                validator: validator.clone(),
                agent_source: source.clone(),
            })?;
        if coins > record.coins {
            return Err(LedgerError::ExceedsDeposit {
                owner: owner.clone(),
                validator: validator.clone(),
                agent_source: source.clone(),
                requested: coins,
                deposited: record.coins,
            });
        }

        let equivalent = if coins == record.coins {
            record.equivalent_amount
        } else {
            mul_div_ceil(record.equivalent_amount, coins, record.coins)
                .map(|e| e.min(record.equivalent_amount))
                .ok_or_else(|| LedgerError::Overflow {
                    validator: validator.clone(),
                    agent_source: source.clone(),
                })?
        };

        let remaining = DepositRecord {
            coins: record.coins - coins,
            equivalent_amount: record.equivalent_amount - equivalent,
            ..record
        };
        if remaining.coins == 0 {
            batch.delete_deposit(owner, validator, source);
        } else {
            batch.put_deposit(remaining);
        }
        Ok(equivalent)
    }

    pub fn get_deposit(
        &self,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<DepositRecord>, LedgerError> {
        Ok(self.deposits.get_deposit(owner, validator, source)?)
    }

    /// One owner's open deposits, ordered by validator then source.
    pub fn deposits_of(&self, owner: &Address) -> Result<Vec<DepositRecord>, LedgerError> {
        Ok(self.deposits.iter_deposits_for_owner(owner)?)
    }

    pub fn list_deposits(&self) -> Result<Vec<DepositRecord>, LedgerError> {
        Ok(self.deposits.iter_deposits()?)
    }

    /// Write an exported record as-is. The agent rows are imported separately.
    pub fn import_deposit(&self, record: &DepositRecord) -> Result<(), LedgerError> {
        Ok(self.deposits.put_deposit(record)?)
    }

    /// Every source contributing to `validator`, in store key order.
    ///
    /// The returned vector is a snapshot; calling again restarts from the
    /// current state.
    pub fn list_by_validator(
        &self,
        validator: &ValidatorAddress,
    ) -> Result<Vec<MultiStakingAgent>, LedgerError> {
        Ok(self.store.iter_agents_for_validator(validator)?)
    }

    /// Every agent row, ordered by validator then source.
    pub fn list_all(&self) -> Result<Vec<MultiStakingAgent>, LedgerError> {
        Ok(self.store.iter_agents()?)
    }

    /// Sum of a validator's equivalent stake across all sources.
    pub fn total_equivalent(&self, validator: &ValidatorAddress) -> Result<u128, LedgerError> {
        self.list_by_validator(validator)?
            .iter()
            .try_fold(0u128, |acc, a| acc.checked_add(a.equivalent_amount))
            .ok_or_else(|| LedgerError::Overflow {
                validator: validator.clone(),
                agent_source: AgentSource::Native,
            })
    }

    /// How much bonding-denom delegation a deposit of `coin` produces.
    pub fn expected_delegation_amount(&self, coin: &Coin) -> Result<Coin, LedgerError> {
        Ok(self.calculator.equivalent_coin(coin, &self.bond_denom)?)
    }

    fn staged_or_stored_agent(
        &self,
        batch: &WriteBatch,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<MultiStakingAgent>, LedgerError> {
        match batch.staged_agent(validator, source) {
            Some(agent) => Ok(Some(agent.clone())),
            None => self.get_agent(validator, source),
        }
    }

    fn staged_or_stored_deposit(
        &self,
        batch: &WriteBatch,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<DepositRecord>, LedgerError> {
        match batch.staged_deposit(owner, validator, source) {
            Some(staged) => Ok(staged.cloned()),
            None => self.get_deposit(owner, validator, source),
        }
    }
}

fn credited(
    existing: Option<MultiStakingAgent>,
    validator: &ValidatorAddress,
    source: &AgentSource,
    amount: u128,
) -> Result<MultiStakingAgent, LedgerError> {
    let mut agent = existing.unwrap_or_else(|| MultiStakingAgent {
        validator: validator.clone(),
        source: source.clone(),
        equivalent_amount: 0,
    });
    agent.equivalent_amount =
        agent
            .equivalent_amount
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow {
                validator: validator.clone(),
                agent_source: source.clone(),
            })?;
    Ok(agent)
}

fn debited(
    existing: Option<MultiStakingAgent>,
    validator: &ValidatorAddress,
    source: &AgentSource,
    amount: u128,
) -> Result<MultiStakingAgent, LedgerError> {
    let available = existing.as_ref().map(|a| a.equivalent_amount).unwrap_or(0);
    let remaining = available
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::InsufficientBalance {
            validator: validator.clone(),
            agent_source: source.clone(),
            needed: amount,
            available,
        })?;
    let mut agent = existing.unwrap_or_else(|| MultiStakingAgent {
        validator: validator.clone(),
        source: source.clone(),
        equivalent_amount: 0,
    });
    agent.equivalent_amount = remaining;
    Ok(agent)
}
