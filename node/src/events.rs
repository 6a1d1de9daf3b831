//! Events emitted by the application for subscribers.

use interstake_multistaking::AgentSource;
use interstake_types::{
    AccountPurpose, Address, ChainId, Coin, ConnectionId, Timestamp, ValidatorAddress,
};

/// Application-level events that observers can subscribe to via the
/// [`EventBus`].
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    /// A source chain was enrolled; its accounts are still pending.
    SourceChainAdded {
        chain_id: ChainId,
        connection_id: ConnectionId,
    },
    /// The counterparty confirmed one interchain account.
    AccountActivated {
        chain_id: ChainId,
        purpose: AccountPurpose,
        address: Address,
    },
    /// All three accounts of a chain are active.
    SourceChainAvailable { chain_id: ChainId },
    SourceChainDeactivated { chain_id: ChainId },
    /// Coins were escrowed and the agent row credited.
    Deposited {
        depositor: Address,
        validator: ValidatorAddress,
        source: AgentSource,
        coin: Coin,
        equivalent: u128,
    },
    UnbondingQueued {
        sequence: u64,
        owner: Address,
        validator: ValidatorAddress,
        source: AgentSource,
        coin: Coin,
        completion_time: Timestamp,
    },
    UnbondingSettled {
        sequence: u64,
        owner: Address,
        coin: Coin,
    },
    /// A matured entry could not be settled and stays queued.
    UnbondingFailed {
        sequence: u64,
        owner: Address,
        reason: String,
    },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast to
/// avoid stalling block processing.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&AppEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&AppEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &AppEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
