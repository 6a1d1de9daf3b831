//! Nullable IBC host: light clients and the transfer app.

use interstake_sourcechain::{ClientStatus, ClientStatusReader, TransferParams};
use interstake_types::ChainId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Light clients keyed by the chain they track.
#[derive(Default)]
pub struct NullLightClients {
    clients: Mutex<HashMap<ChainId, ClientStatus>>,
}

impl NullLightClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `chain_id` with an active client.
    pub fn with_active(self, chain_id: &ChainId) -> Self {
        self.set_status(chain_id, ClientStatus::Active);
        self
    }

    pub fn set_status(&self, chain_id: &ChainId, status: ClientStatus) {
        self.clients
            .lock()
            .unwrap()
            .insert(chain_id.clone(), status);
    }

    pub fn remove(&self, chain_id: &ChainId) {
        self.clients.lock().unwrap().remove(chain_id);
    }
}

impl ClientStatusReader for NullLightClients {
    fn client_status(&self, chain_id: &ChainId) -> Option<ClientStatus> {
        self.clients.lock().unwrap().get(chain_id).copied()
    }
}

/// Transfer app parameters. Both directions start enabled.
pub struct NullTransferParams {
    send: AtomicBool,
    receive: AtomicBool,
}

impl NullTransferParams {
    pub fn enabled() -> Self {
        Self {
            send: AtomicBool::new(true),
            receive: AtomicBool::new(true),
        }
    }

    pub fn set_send_enabled(&self, enabled: bool) {
        self.send.store(enabled, Ordering::SeqCst);
    }

    pub fn set_receive_enabled(&self, enabled: bool) {
        self.receive.store(enabled, Ordering::SeqCst);
    }
}

impl Default for NullTransferParams {
    fn default() -> Self {
        Self::enabled()
    }
}

impl TransferParams for NullTransferParams {
    fn send_enabled(&self) -> bool {
        self.send.load(Ordering::SeqCst)
    }

    fn receive_enabled(&self) -> bool {
        self.receive.load(Ordering::SeqCst)
    }
}
