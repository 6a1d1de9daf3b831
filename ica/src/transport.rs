//! The channel layer that actually opens interchain accounts.

use interstake_types::{Address, ConnectionId};

use crate::IcaError;

/// Narrow view of the host chain's ICS-27 controller.
///
/// Registration is requested synchronously; confirmation arrives later in a
/// separate state transition when the counterparty acknowledges the channel
/// handshake, after which `resolve_address` starts returning the address.
pub trait IcaTransport {
    /// Start the channel handshake for `owner` on `connection_id`.
    fn request_registration(
        &self,
        connection_id: &ConnectionId,
        owner: &str,
        metadata: &str,
    ) -> Result<(), IcaError>;

    /// The remote account address, once the counterparty confirmed creation.
    fn resolve_address(&self, connection_id: &ConnectionId, owner: &str) -> Option<Address>;

    /// Whether a handshake was started for `owner` and has not completed.
    fn registration_in_flight(&self, _connection_id: &ConnectionId, _owner: &str) -> bool {
        false
    }
}
