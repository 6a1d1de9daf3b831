//! Source chain registry.
//!
//! Registration is split in two:
//! - a synchronous phase that validates the chain, checks the host's light
//!   client and transfer app, and requests the three interchain accounts;
//! - an asynchronous phase in which each account is confirmed by the
//!   counterparty in some later block, in any order.
//!
//! A chain is *available* for staking only once all three accounts are
//! confirmed. Chains are never deleted, only deactivated.

pub mod error;
pub mod host;
pub mod registry;
pub mod validation;

pub use error::SourceChainError;
pub use host::{ClientStatus, ClientStatusReader, TransferParams};
pub use interstake_store::SourceChain;
pub use registry::{AccountStatus, SourceChainRegistry};
pub use validation::validate_basic;
