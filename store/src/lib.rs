//! Abstract storage traits for interstake.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The engine crates depend only on the traits. Each keyspace has a
//! single owning component; nothing else writes it. Writes that must land
//! together across keyspaces go through a [`WriteBatch`].

pub mod agent;
pub mod balance;
pub mod batch;
pub mod deposit;
pub mod error;
pub mod source_chain;
pub mod unbonding;

pub use agent::{AgentSource, AgentStore, MultiStakingAgent};
pub use balance::BalanceStore;
pub use batch::{BatchStore, WriteBatch, WriteOp};
pub use deposit::{DepositRecord, DepositStore};
pub use error::StoreError;
pub use source_chain::{SourceChain, SourceChainStore};
pub use unbonding::{UnbondingEntry, UnbondingKey, UnbondingStore};
