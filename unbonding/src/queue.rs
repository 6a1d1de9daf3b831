//! Time-ordered unbonding queue and its end-of-block sweep.

use std::sync::Arc;

use interstake_multistaking::AgentLedger;
use interstake_store::{
    AgentSource, BatchStore, UnbondingEntry, UnbondingKey, UnbondingStore, WriteBatch,
};
use interstake_types::{Address, BlockContext, Coin, ErrorKind, Timestamp, ValidatorAddress};

use crate::bank::Bank;
use crate::error::UnbondingError;

/// Observable state of a queued entry at a given block time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// Still time-locked.
    Pending,
    /// Completion time reached, waiting for a sweep to settle it.
    Matured,
    /// Debited and released; no longer queued.
    Settled,
}

/// An entry the sweep could not settle. It stays queued.
#[derive(Clone, Debug)]
pub struct FailedSettlement {
    pub key: UnbondingKey,
    pub owner: Address,
    pub kind: ErrorKind,
    pub reason: String,
}

/// What one call to [`UnbondingQueue::end_block`] did, in sweep order.
#[derive(Clone, Debug, Default)]
pub struct SweepReport {
    pub settled: Vec<UnbondingEntry>,
    pub failed: Vec<FailedSettlement>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty() && self.failed.is_empty()
    }
}

/// Sole writer of the unbonding keyspace.
pub struct UnbondingQueue {
    store: Arc<dyn UnbondingStore + Send + Sync>,
    batches: Arc<dyn BatchStore + Send + Sync>,
    ledger: Arc<AgentLedger>,
    bank: Arc<dyn Bank + Send + Sync>,
    /// Escrow account funds are released from.
    module_account: Address,
    unbonding_time_secs: u64,
}

impl UnbondingQueue {
    pub fn new(
        store: Arc<dyn UnbondingStore + Send + Sync>,
        batches: Arc<dyn BatchStore + Send + Sync>,
        ledger: Arc<AgentLedger>,
        bank: Arc<dyn Bank + Send + Sync>,
        module_account: Address,
        unbonding_time_secs: u64,
    ) -> Self {
        Self {
            store,
            batches,
            ledger,
            bank,
            module_account,
            unbonding_time_secs,
        }
    }

    pub fn unbonding_time_secs(&self) -> u64 {
        self.unbonding_time_secs
    }

    /// Queue the withdrawal of `coin` from `owner`'s deposit with
    /// `(validator, source)`, maturing `unbonding_time_secs` after the
    /// current block time.
    ///
    /// The deposit record is reduced and the entry written in one commit, so
    /// the same coins can never be requested twice. Requests exceeding what
    /// the owner deposited, or what the agent row still holds beyond already
    /// queued entries, are rejected with nothing written.
    pub fn redeem(
        &self,
        owner: &Address,
        validator: &ValidatorAddress,
        source: &AgentSource,
        coin: &Coin,
        ctx: BlockContext,
    ) -> Result<UnbondingEntry, UnbondingError> {
        if coin.is_zero() {
            return Err(UnbondingError::InvalidParameter(
                "unbonding amount must be positive".to_string(),
            ));
        }

        let mut batch = WriteBatch::new();
        let equivalent = self
            .ledger
            .stage_redemption(&mut batch, owner, validator, source, coin.amount)?;

        let held = self.ledger.balance(validator, source)?;
        let queued = self.pending_for(validator, source)?;
        let free = held.saturating_sub(queued);
        if equivalent > free {
            return Err(UnbondingError::OverCommitted {
                validator: validator.clone(),
                agent_source: source.clone(),
                requested: equivalent,
                free,
            });
        }

        let entry = UnbondingEntry {
            sequence: self.store.next_unbonding_sequence()?,
            owner: owner.clone(),
            validator: validator.clone(),
            source: source.clone(),
            equivalent_amount: equivalent,
            balance: coin.clone(),
            completion_time: ctx.time.saturating_add_secs(self.unbonding_time_secs),
            creation_height: ctx.height,
        };
        batch.put_unbonding(entry.clone());
        self.batches.commit(batch)?;

        tracing::info!(
            sequence = entry.sequence,
            owner = %entry.owner,
            validator = %entry.validator,
            source = %entry.source,
            amount = %entry.balance,
            equivalent = entry.equivalent_amount,
            completion_time = %entry.completion_time,
            "unbonding queued"
        );
        Ok(entry)
    }

    /// Sum of equivalent amounts still queued for `(validator, source)`.
    pub fn pending_for(
        &self,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<u128, UnbondingError> {
        Ok(self
            .store
            .iter_unbondings()?
            .iter()
            .filter(|e| &e.validator == validator && &e.source == source)
            .fold(0u128, |acc, e| acc.saturating_add(e.equivalent_amount)))
    }

    /// Every queued entry in sweep order.
    pub fn list_pending(&self) -> Result<Vec<UnbondingEntry>, UnbondingError> {
        Ok(self.store.iter_unbondings()?)
    }

    pub fn pending_count(&self) -> Result<u64, UnbondingError> {
        Ok(self.store.unbonding_count()?)
    }

    /// State of a previously issued entry at block time `now`. Keys that are
    /// no longer queued read as settled.
    pub fn entry_state(
        &self,
        key: &UnbondingKey,
        now: Timestamp,
    ) -> Result<EntryState, UnbondingError> {
        Ok(match self.store.get_unbonding(key)? {
            None => EntryState::Settled,
            Some(entry) if entry.completion_time.is_reached(now) => EntryState::Matured,
            Some(_) => EntryState::Pending,
        })
    }

    /// Re-queue an exported entry under a freshly allocated sequence.
    ///
    /// Callers import in sweep order so relative order is preserved.
    pub fn import_entry(&self, mut entry: UnbondingEntry) -> Result<UnbondingEntry, UnbondingError> {
        entry.sequence = self.store.next_unbonding_sequence()?;
        self.store.put_unbonding(&entry)?;
        Ok(entry)
    }

    /// Settle every entry whose completion time has been reached, oldest
    /// first, ties broken by insertion order.
    ///
    /// Each entry is settled independently: a failure is recorded in the
    /// report, leaves that entry queued with its agent row untouched, and the
    /// sweep moves on. Only a failure to read the queue itself is returned
    /// as an error.
    pub fn end_block(&self, ctx: BlockContext) -> Result<SweepReport, UnbondingError> {
        let due = self.store.iter_due_unbondings(ctx.time)?;
        let mut report = SweepReport::default();

        for entry in due {
            let key = entry.key();
            match self.settle(&entry) {
                Ok(()) => {
                    tracing::info!(
                        sequence = entry.sequence,
                        owner = %entry.owner,
                        validator = %entry.validator,
                        source = %entry.source,
                        amount = %entry.balance,
                        height = ctx.height,
                        "unbonding settled"
                    );
                    report.settled.push(entry);
                }
                Err(e) => {
                    tracing::warn!(
                        sequence = entry.sequence,
                        owner = %entry.owner,
                        validator = %entry.validator,
                        source = %entry.source,
                        error = %e,
                        "unbonding settlement failed, entry stays queued"
                    );
                    report.failed.push(FailedSettlement {
                        key,
                        owner: entry.owner.clone(),
                        kind: e.kind(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                settled = report.settled.len(),
                failed = report.failed.len(),
                "unbonding sweep done"
            );
        }
        Ok(report)
    }

    /// Debit, dequeue and release in a single commit. On any error nothing
    /// is written.
    fn settle(&self, entry: &UnbondingEntry) -> Result<(), UnbondingError> {
        let mut batch = WriteBatch::new();
        self.ledger.stage_debit(
            &mut batch,
            &entry.validator,
            &entry.source,
            entry.equivalent_amount,
        )?;
        batch.delete_unbonding(entry.key());
        self.bank
            .stage_transfer(&mut batch, &self.module_account, &entry.owner, &entry.balance)?;
        self.batches.commit(batch)?;
        Ok(())
    }
}
