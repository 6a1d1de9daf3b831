//! Interchain account registrar.
//!
//! Every source chain needs three accounts on the foreign chain, each
//! controlled from the home chain over IBC: one holding delegations, one
//! receiving rewards, one receiving undelegated funds. This crate requests
//! those accounts and reports which ones the counterparty has confirmed.
//!
//! Per-account state machine: `Requested → Active`. A request that is never
//! acknowledged stays `Requested`; timeouts and retries belong to the
//! relayer and the operator, not to this crate.

pub mod error;
pub mod metadata;
pub mod owner;
pub mod registrar;
pub mod transport;

pub use error::IcaError;
pub use metadata::IcaMetadata;
pub use owner::{controller_port_id, owner_key, parse_owner_key};
pub use registrar::{IcaRegistrar, RegistrationState};
pub use transport::IcaTransport;
