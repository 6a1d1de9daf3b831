//! Host-chain subsystems the registry consults before enrolling a chain.

use interstake_types::ChainId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an IBC light client as reported by the host's client keeper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    Active,
    Frozen,
    Expired,
    Unknown,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Frozen => "frozen",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Light-client lookup by the chain the client tracks.
pub trait ClientStatusReader {
    /// `None` if no client tracks `chain_id`.
    fn client_status(&self, chain_id: &ChainId) -> Option<ClientStatus>;
}

/// The host's ICS-20 transfer app parameters.
pub trait TransferParams {
    fn send_enabled(&self) -> bool;
    fn receive_enabled(&self) -> bool;
}
