//! Write batching: stage writes across keyspaces and commit them together.
//!
//! Engines read through their own store traits, stage every resulting
//! write into one [`WriteBatch`], and hand it to a [`BatchStore`]. Either
//! every staged write lands or none does. Dropping a batch discards it.

use crate::agent::{AgentSource, MultiStakingAgent};
use crate::deposit::DepositRecord;
use crate::unbonding::{UnbondingEntry, UnbondingKey};
use crate::StoreError;
use interstake_types::{Address, Denom, ValidatorAddress};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    PutAgent(MultiStakingAgent),
    PutDeposit(DepositRecord),
    DeleteDeposit {
        owner: Address,
        validator: ValidatorAddress,
        source: AgentSource,
    },
    PutUnbonding(UnbondingEntry),
    DeleteUnbonding(UnbondingKey),
    PutBalance {
        address: Address,
        denom: Denom,
        amount: u128,
    },
    PutAccount(Address),
}

/// Ordered list of staged writes. Later writes to the same key win.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    // ── Staging ─────────────────────────────────────────────────────────

    pub fn put_agent(&mut self, agent: MultiStakingAgent) {
        self.ops.push(WriteOp::PutAgent(agent));
    }

    pub fn put_deposit(&mut self, record: DepositRecord) {
        self.ops.push(WriteOp::PutDeposit(record));
    }

    pub fn delete_deposit(
        &mut self,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) {
        self.ops.push(WriteOp::DeleteDeposit {
            owner: owner.clone(),
            validator: validator.clone(),
            source: source.clone(),
        });
    }

    pub fn put_unbonding(&mut self, entry: UnbondingEntry) {
        self.ops.push(WriteOp::PutUnbonding(entry));
    }

    pub fn delete_unbonding(&mut self, key: UnbondingKey) {
        self.ops.push(WriteOp::DeleteUnbonding(key));
    }

    pub fn put_balance(&mut self, address: &Address, denom: &Denom, amount: u128) {
        self.ops.push(WriteOp::PutBalance {
            address: address.clone(),
            denom: denom.clone(),
            amount,
        });
    }

    pub fn put_account(&mut self, address: &Address) {
        self.ops.push(WriteOp::PutAccount(address.clone()));
    }

    // ── Read-your-writes ────────────────────────────────────────────────
    //
    // Staging code must consult these before the store, otherwise two
    // updates to the same key within one batch would both start from the
    // committed value.

    /// Latest staged row for `(validator, source)`.
    pub fn staged_agent(
        &self,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Option<&MultiStakingAgent> {
        self.ops.iter().rev().find_map(|op| match op {
            WriteOp::PutAgent(a) if &a.validator == validator && &a.source == source => Some(a),
            _ => None,
        })
    }

    /// Latest staged state of a deposit record: `Some(None)` if it was
    /// staged for deletion, `None` if the batch never touched it.
    pub fn staged_deposit(
        &self,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Option<Option<&DepositRecord>> {
        self.ops.iter().rev().find_map(|op| match op {
            WriteOp::PutDeposit(r)
                if &r.owner == owner && &r.validator == validator && &r.source == source =>
            {
                Some(Some(r))
            }
            WriteOp::DeleteDeposit {
                owner: o,
                validator: v,
                source: s,
            } if o == owner && v == validator && s == source => Some(None),
            _ => None,
        })
    }

    /// Latest staged balance of `address` in `denom`.
    pub fn staged_balance(&self, address: &Address, denom: &Denom) -> Option<u128> {
        self.ops.iter().rev().find_map(|op| match op {
            WriteOp::PutBalance {
                address: a,
                denom: d,
                amount,
            } if a == address && d == denom => Some(*amount),
            _ => None,
        })
    }

    pub fn stages_account(&self, address: &Address) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, WriteOp::PutAccount(a) if a == address))
    }
}

/// Applies a [`WriteBatch`] atomically.
pub trait BatchStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
