//! Balance storage trait backing the store-level bank.

use crate::StoreError;
use interstake_types::{Address, Denom};

/// Per-`(address, denom)` balances plus account existence.
pub trait BalanceStore {
    fn get_balance(&self, address: &Address, denom: &Denom) -> Result<u128, StoreError>;
    fn put_balance(&self, address: &Address, denom: &Denom, amount: u128) -> Result<(), StoreError>;
    fn account_exists(&self, address: &Address) -> Result<bool, StoreError>;
    fn put_account(&self, address: &Address) -> Result<(), StoreError>;
}
