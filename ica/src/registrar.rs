//! Requests interchain accounts and reports their state.

use std::sync::Arc;

use interstake_types::{Address, ConnectionId};

use crate::owner::controller_port_id;
use crate::transport::IcaTransport;
use crate::IcaError;

/// Observable state of one requested account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationState {
    /// The handshake was started but the counterparty has not confirmed it.
    Requested,
    /// The counterparty confirmed creation; the address is known.
    Active,
}

/// Thin, stateless front for the ICS-27 controller.
///
/// All state lives in the transport so that a restarted node sees exactly
/// what the channel layer sees.
pub struct IcaRegistrar {
    transport: Arc<dyn IcaTransport + Send + Sync>,
}

impl IcaRegistrar {
    pub fn new(transport: Arc<dyn IcaTransport + Send + Sync>) -> Self {
        Self { transport }
    }

    /// Request creation of one remote account bound to `owner`.
    ///
    /// Requesting an account that is already active is a no-op. Transport
    /// failures are returned as-is and never retried here.
    pub fn register_account(
        &self,
        connection_id: &ConnectionId,
        owner: &str,
        metadata: &str,
    ) -> Result<(), IcaError> {
        if owner.is_empty() {
            return Err(IcaError::InvalidOwner(owner.to_string()));
        }
        if self.transport.resolve_address(connection_id, owner).is_some() {
            tracing::debug!(%connection_id, owner, "interchain account already active");
            return Ok(());
        }
        self.transport
            .request_registration(connection_id, owner, metadata)?;
        tracing::info!(
            %connection_id,
            owner,
            port = %controller_port_id(owner),
            "requested interchain account"
        );
        Ok(())
    }

    /// The confirmed remote address, or `None` while still pending.
    pub fn lookup_account_address(
        &self,
        connection_id: &ConnectionId,
        owner: &str,
    ) -> Option<Address> {
        self.transport.resolve_address(connection_id, owner)
    }

    /// `None` if nothing was ever requested for `owner`.
    pub fn registration_state(
        &self,
        connection_id: &ConnectionId,
        owner: &str,
    ) -> Option<RegistrationState> {
        if self.transport.resolve_address(connection_id, owner).is_some() {
            Some(RegistrationState::Active)
        } else if self.transport.registration_in_flight(connection_id, owner) {
            Some(RegistrationState::Requested)
        } else {
            None
        }
    }
}
