//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the core consumes (block clock, storage, the IBC
//! client keeper, the transfer app, the ICS-27 controller) sits behind a
//! trait. Tests run the store-backed bank over [`NullStore`]. This crate
//! provides in-memory implementations that:
//! - return deterministic values
//! - can be controlled programmatically, including failure injection
//! - never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests, or use them as
//! the host in a standalone node.

pub mod clock;
pub mod host;
pub mod ica;
pub mod store;

pub use clock::NullClock;
pub use host::{NullLightClients, NullTransferParams};
pub use ica::{NullIcaTransport, RecordedRequest};
pub use store::NullStore;
