//! Nullable ICS-27 controller: records registration requests and lets the
//! test play the counterparty.

use interstake_ica::{IcaError, IcaTransport};
use interstake_types::{Address, ConnectionId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type AccountKey = (ConnectionId, String);

/// A registration request as the channel layer saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub connection_id: ConnectionId,
    pub owner: String,
    pub metadata: String,
}

#[derive(Default)]
pub struct NullIcaTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    in_flight: Mutex<HashSet<AccountKey>>,
    resolved: Mutex<HashMap<AccountKey, Address>>,
    fail_requests: AtomicBool,
}

impl NullIcaTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acknowledge the account for `owner`, as the counterparty would.
    pub fn confirm(&self, connection_id: &ConnectionId, owner: &str, address: Address) {
        let key = (connection_id.clone(), owner.to_string());
        self.in_flight.lock().unwrap().remove(&key);
        self.resolved.lock().unwrap().insert(key, address);
    }

    /// Make every following `request_registration` fail.
    pub fn fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl IcaTransport for NullIcaTransport {
    fn request_registration(
        &self,
        connection_id: &ConnectionId,
        owner: &str,
        metadata: &str,
    ) -> Result<(), IcaError> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(IcaError::Transport(format!(
                "channel handshake for {owner} on {connection_id} refused"
            )));
        }
        self.requests.lock().unwrap().push(RecordedRequest {
            connection_id: connection_id.clone(),
            owner: owner.to_string(),
            metadata: metadata.to_string(),
        });
        self.in_flight
            .lock()
            .unwrap()
            .insert((connection_id.clone(), owner.to_string()));
        Ok(())
    }

    fn resolve_address(&self, connection_id: &ConnectionId, owner: &str) -> Option<Address> {
        self.resolved
            .lock()
            .unwrap()
            .get(&(connection_id.clone(), owner.to_string()))
            .cloned()
    }

    fn registration_in_flight(&self, connection_id: &ConnectionId, owner: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap()
            .contains(&(connection_id.clone(), owner.to_string()))
    }
}
