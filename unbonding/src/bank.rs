//! Fund movement.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use interstake_store::{BalanceStore, BatchStore, WriteBatch};
use interstake_types::{Address, Coin, Denom};

use crate::BankError;

/// The host chain's bank, reduced to what deposits and settlement need.
///
/// Transfers are staged into a [`WriteBatch`] so they land together with the
/// ledger and queue writes they belong to.
pub trait Bank {
    fn balance(&self, address: &Address, denom: &Denom) -> Result<u128, BankError>;

    fn has_account(&self, address: &Address) -> Result<bool, BankError>;

    /// Move `coin` from `from` to `to` in `batch`, creating the recipient
    /// account if it does not exist. `batch` is untouched on error.
    fn stage_transfer(
        &self,
        batch: &mut WriteBatch,
        from: &Address,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), BankError>;
}

/// [`Bank`] over a [`BalanceStore`]. Used by the daemon, which has no host
/// chain bank to talk to.
pub struct StoreBank {
    store: Arc<dyn BalanceStore + Send + Sync>,
    batches: Arc<dyn BatchStore + Send + Sync>,
    /// Addresses that may not receive funds.
    blocked: RwLock<BTreeSet<Address>>,
}

impl StoreBank {
    pub fn new(
        store: Arc<dyn BalanceStore + Send + Sync>,
        batches: Arc<dyn BatchStore + Send + Sync>,
    ) -> Self {
        Self {
            store,
            batches,
            blocked: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn block(&self, address: &Address) {
        if let Ok(mut blocked) = self.blocked.write() {
            blocked.insert(address.clone());
        }
    }

    pub fn unblock(&self, address: &Address) {
        if let Ok(mut blocked) = self.blocked.write() {
            blocked.remove(address);
        }
    }

    pub fn is_blocked(&self, address: &Address) -> bool {
        self.blocked
            .read()
            .map(|blocked| blocked.contains(address))
            .unwrap_or(false)
    }

    /// Create `coin` out of thin air in `address`. Genesis, the operator CLI
    /// and tests only.
    pub fn mint(&self, address: &Address, coin: &Coin) -> Result<u128, BankError> {
        let mut batch = WriteBatch::new();
        if !self.store.account_exists(address)? {
            batch.put_account(address);
        }
        let updated = self
            .store
            .get_balance(address, &coin.denom)?
            .checked_add(coin.amount)
            .ok_or_else(|| BankError::Overflow {
                address: address.clone(),
                denom: coin.denom.clone(),
            })?;
        batch.put_balance(address, &coin.denom, updated);
        self.batches.commit(batch)?;
        tracing::debug!(%address, %coin, total = updated, "minted");
        Ok(updated)
    }

    fn staged_balance(
        &self,
        batch: &WriteBatch,
        address: &Address,
        denom: &Denom,
    ) -> Result<u128, BankError> {
        match batch.staged_balance(address, denom) {
            Some(amount) => Ok(amount),
            None => Ok(self.store.get_balance(address, denom)?),
        }
    }
}

impl Bank for StoreBank {
    fn balance(&self, address: &Address, denom: &Denom) -> Result<u128, BankError> {
        Ok(self.store.get_balance(address, denom)?)
    }

    fn has_account(&self, address: &Address) -> Result<bool, BankError> {
        Ok(self.store.account_exists(address)?)
    }

    fn stage_transfer(
        &self,
        batch: &mut WriteBatch,
        from: &Address,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), BankError> {
        if coin.is_zero() || from == to {
            return Ok(());
        }
        if self.is_blocked(to) {
            return Err(BankError::Blocked(to.clone()));
        }

        let available = self.staged_balance(batch, from, &coin.denom)?;
        let remaining = available
            .checked_sub(coin.amount)
            .ok_or_else(|| BankError::InsufficientFunds {
                address: from.clone(),
                denom: coin.denom.clone(),
                needed: coin.amount,
                available,
            })?;
        let credited = self
            .staged_balance(batch, to, &coin.denom)?
            .checked_add(coin.amount)
            .ok_or_else(|| BankError::Overflow {
                address: to.clone(),
                denom: coin.denom.clone(),
            })?;
        let create_account = !batch.stages_account(to) && !self.store.account_exists(to)?;

        if create_account {
            batch.put_account(to);
        }
        batch.put_balance(from, &coin.denom, remaining);
        batch.put_balance(to, &coin.denom, credited);
        Ok(())
    }
}
