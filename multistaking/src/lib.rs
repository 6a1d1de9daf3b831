//! Multi-staking agent ledger.
//!
//! One row per `(validator, source)` holds the equivalent stake, in the
//! bonding denomination, that deposits from that source contribute to the
//! validator. The sum over a validator's rows is its externally sourced
//! voting power.
//!
//! Rows are only ever changed by credits (deposits) and debits (unbonding
//! completion). They are never removed and may sit at zero.
//!
//! Next to the rows, one [`DepositRecord`] per `(owner, validator, source)`
//! tracks the coins each owner put in and the share of the row they were
//! credited with. Withdrawals are checked and priced against it.

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use interstake_store::{AgentSource, DepositRecord, MultiStakingAgent};
pub use ledger::AgentLedger;
