//! LMDB storage backend for interstake.
//!
//! Implements the storage traits from `interstake-store` using the `heed`
//! LMDB bindings. Each keyspace maps to one named database inside a single
//! environment. Keys are encoded so that LMDB's byte order is the iteration
//! order the engines rely on.

pub mod agent;
pub mod balance;
pub mod batch;
pub mod deposit;
pub mod environment;
pub mod error;
pub mod meta;
pub mod source_chain;
pub mod unbonding;

pub use agent::LmdbAgentStore;
pub use balance::LmdbBalanceStore;
pub use batch::LmdbBatchStore;
pub use deposit::LmdbDepositStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use meta::LmdbMetaStore;
pub use source_chain::LmdbSourceChainStore;
pub use unbonding::LmdbUnbondingStore;
