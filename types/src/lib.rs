//! Fundamental types for interstake.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! chain and connection identifiers, bech32-shaped addresses, coins, fixed-point
//! decimals, block time, module parameters, and the error taxonomy.

pub mod address;
pub mod coin;
pub mod dec;
pub mod error;
pub mod ids;
pub mod math;
pub mod params;
pub mod purpose;
pub mod time;

pub use address::{Address, ValidatorAddress};
pub use coin::{Coin, Denom};
pub use dec::Dec;
pub use error::{ErrorKind, TypesError};
pub use ids::{ChainId, ChannelId, ConnectionId};
pub use math::{mul_div_ceil, mul_div_floor};
pub use params::Params;
pub use purpose::AccountPurpose;
pub use time::{BlockContext, Timestamp};
