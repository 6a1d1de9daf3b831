//! Unbonding queue.
//!
//! Withdrawal requests are checked against the owner's deposit record and
//! become time-locked entries keyed by `(completion_time, sequence)`. At the
//! end of every block the queue settles each matured entry exactly once: the
//! agent row is debited, the entry removed and the coins released to the
//! owner through the bank, all in one commit.
//!
//! Per-entry state machine: `Pending → Matured → Settled`. An entry is
//! `Matured` as soon as block time reaches its completion time and stays so
//! until a sweep settles it; a failed settlement writes nothing and keeps
//! it queued for the next block.

pub mod bank;
pub mod error;
pub mod queue;

pub use bank::{Bank, StoreBank};
pub use error::{BankError, UnbondingError};
pub use interstake_store::{UnbondingEntry, UnbondingKey};
pub use queue::{EntryState, FailedSettlement, SweepReport, UnbondingQueue};
