//! Per-depositor stake records.

use crate::agent::AgentSource;
use crate::StoreError;
use interstake_types::{Address, ValidatorAddress};
use serde::{Deserialize, Serialize};

/// What one owner has put into one agent row and not yet asked back.
///
/// `coins` is in the source's denom (the IBC voucher, or the bond denom for
/// `Native`); `equivalent_amount` is the share of the agent row those coins
/// were credited with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRecord {
    pub owner: Address,
    pub validator: ValidatorAddress,
    pub source: AgentSource,
    pub coins: u128,
    pub equivalent_amount: u128,
}

/// Keyed by `(owner, validator, source)`.
pub trait DepositStore {
    fn get_deposit(
        &self,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<DepositRecord>, StoreError>;

    fn put_deposit(&self, record: &DepositRecord) -> Result<(), StoreError>;

    /// One owner's records, ordered by validator then source.
    fn iter_deposits_for_owner(&self, owner: &Address) -> Result<Vec<DepositRecord>, StoreError>;

    /// Every record, ordered by owner, validator, source.
    fn iter_deposits(&self) -> Result<Vec<DepositRecord>, StoreError>;
}
