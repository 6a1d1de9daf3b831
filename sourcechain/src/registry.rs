//! Source chain enrollment and readiness.

use std::sync::Arc;

use interstake_ica::{owner_key, parse_owner_key, IcaMetadata, IcaRegistrar, RegistrationState};
use interstake_store::{SourceChain, SourceChainStore};
use interstake_types::{AccountPurpose, Address, BlockContext, ChainId, ConnectionId, Denom};

use crate::host::{ClientStatus, ClientStatusReader, TransferParams};
use crate::validation::validate_basic;
use crate::SourceChainError;

/// Registration progress of one of a chain's three accounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountStatus {
    pub purpose: AccountPurpose,
    pub owner: String,
    pub state: Option<RegistrationState>,
    pub address: Option<Address>,
}

/// Sole writer of the source chain keyspace.
pub struct SourceChainRegistry {
    store: Arc<dyn SourceChainStore + Send + Sync>,
    registrar: IcaRegistrar,
    clients: Arc<dyn ClientStatusReader + Send + Sync>,
    transfer: Arc<dyn TransferParams + Send + Sync>,
    ica_version: String,
}

impl SourceChainRegistry {
    pub fn new(
        store: Arc<dyn SourceChainStore + Send + Sync>,
        registrar: IcaRegistrar,
        clients: Arc<dyn ClientStatusReader + Send + Sync>,
        transfer: Arc<dyn TransferParams + Send + Sync>,
        ica_version: impl Into<String>,
    ) -> Self {
        Self {
            store,
            registrar,
            clients,
            transfer,
            ica_version: ica_version.into(),
        }
    }

    /// Enroll a new source chain and request its three interchain accounts.
    ///
    /// All checks run before anything is written. On success the chain is
    /// stored active but pending: its addresses stay empty until the
    /// counterparty confirms each account.
    pub fn add_source_chain(
        &self,
        mut chain: SourceChain,
        ctx: BlockContext,
    ) -> Result<SourceChain, SourceChainError> {
        validate_basic(&chain)?;

        match self.clients.client_status(&chain.chain_id) {
            None => return Err(SourceChainError::ClientNotFound(chain.chain_id)),
            Some(ClientStatus::Active) => {}
            Some(status) => {
                return Err(SourceChainError::ClientNotActive {
                    chain_id: chain.chain_id,
                    status,
                })
            }
        }

        let send_enabled = self.transfer.send_enabled();
        let receive_enabled = self.transfer.receive_enabled();
        if !send_enabled || !receive_enabled {
            return Err(SourceChainError::TransferDisabled {
                send_enabled,
                receive_enabled,
            });
        }

        if self.store.source_chain_exists(&chain.chain_id)? {
            return Err(SourceChainError::AlreadyExists(chain.chain_id));
        }

        let metadata =
            IcaMetadata::new(self.ica_version.clone(), chain.connection_id.clone()).to_json()?;
        for purpose in AccountPurpose::ALL {
            let owner = owner_key(&chain.chain_id, purpose);
            self.registrar
                .register_account(&chain.connection_id, &owner, &metadata)?;
        }

        chain.active = true;
        chain.registered_height = ctx.height;
        self.store.put_source_chain(&chain)?;

        tracing::info!(
            chain_id = %chain.chain_id,
            connection_id = %chain.connection_id,
            height = ctx.height,
            "source chain registered, awaiting interchain accounts"
        );
        Ok(chain)
    }

    /// Plain lookup; absence is `None`.
    pub fn get_source_chain(
        &self,
        chain_id: &ChainId,
    ) -> Result<Option<SourceChain>, SourceChainError> {
        Ok(self.store.get_source_chain(chain_id)?)
    }

    /// Like [`get_source_chain`](Self::get_source_chain) but absence is an error.
    pub fn require_source_chain(&self, chain_id: &ChainId) -> Result<SourceChain, SourceChainError> {
        self.get_source_chain(chain_id)?
            .ok_or_else(|| SourceChainError::NotFound(chain_id.clone()))
    }

    /// True iff all three accounts resolve on the chain's connection.
    pub fn is_available(&self, chain: &SourceChain) -> bool {
        AccountPurpose::ALL.iter().all(|purpose| {
            let owner = owner_key(&chain.chain_id, *purpose);
            self.registrar
                .lookup_account_address(&chain.connection_id, &owner)
                .is_some()
        })
    }

    /// [`is_available`](Self::is_available) by id. Any lookup miss or store
    /// error reads as "not available".
    pub fn is_available_by_id(&self, chain_id: &ChainId) -> bool {
        match self.store.get_source_chain(chain_id) {
            Ok(Some(chain)) => self.is_available(&chain),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(%chain_id, error = %e, "source chain lookup failed");
                false
            }
        }
    }

    /// Availability plus the chain being active: the gate for deposits and
    /// unbonding requests.
    pub fn ensure_usable(&self, chain_id: &ChainId) -> Result<SourceChain, SourceChainError> {
        let chain = self.require_source_chain(chain_id)?;
        if !chain.active || !self.is_available(&chain) {
            return Err(SourceChainError::NotAvailable(chain_id.clone()));
        }
        Ok(chain)
    }

    /// Called by the channel layer once the counterparty confirmed the
    /// account for `owner`. Stores the resolved address on the chain.
    ///
    /// Returns `None` if the transport does not yet know the address.
    pub fn handle_account_active(
        &self,
        connection_id: &ConnectionId,
        owner: &str,
    ) -> Result<Option<SourceChain>, SourceChainError> {
        let (chain_id, purpose) = parse_owner_key(owner).ok_or_else(|| {
            SourceChainError::InvalidParameter(format!("unrecognised account owner {owner:?}"))
        })?;
        let mut chain = self.require_source_chain(&chain_id)?;
        if &chain.connection_id != connection_id {
            return Err(SourceChainError::InvalidParameter(format!(
                "owner {owner} belongs to {}, not {}",
                chain.connection_id, connection_id
            )));
        }
        let Some(address) = self.registrar.lookup_account_address(connection_id, owner) else {
            return Ok(None);
        };
        if !address.has_prefix(&chain.bech32_prefix) {
            tracing::warn!(%chain_id, %purpose, %address, "interchain account address has unexpected prefix");
        }
        chain.set_address(purpose, address.clone());
        self.store.put_source_chain(&chain)?;

        tracing::info!(%chain_id, %purpose, %address, "interchain account active");
        if !chain.is_pending() {
            tracing::info!(%chain_id, "all interchain accounts active, source chain available");
        }
        Ok(Some(chain))
    }

    /// Copy every address the transport already knows into the record.
    pub fn sync_addresses(&self, chain_id: &ChainId) -> Result<SourceChain, SourceChainError> {
        let mut chain = self.require_source_chain(chain_id)?;
        let mut changed = false;
        for purpose in AccountPurpose::ALL {
            if chain.address(purpose).is_some() {
                continue;
            }
            let owner = owner_key(chain_id, purpose);
            if let Some(address) = self
                .registrar
                .lookup_account_address(&chain.connection_id, &owner)
            {
                chain.set_address(purpose, address);
                changed = true;
            }
        }
        if changed {
            self.store.put_source_chain(&chain)?;
        }
        Ok(chain)
    }

    /// Operator-initiated retry: request again every account that is not
    /// yet active. Returns the purposes that were re-requested.
    pub fn retry_pending_registrations(
        &self,
        chain_id: &ChainId,
    ) -> Result<Vec<AccountPurpose>, SourceChainError> {
        let chain = self.require_source_chain(chain_id)?;
        let metadata =
            IcaMetadata::new(self.ica_version.clone(), chain.connection_id.clone()).to_json()?;
        let mut retried = Vec::new();
        for purpose in AccountPurpose::ALL {
            let owner = owner_key(chain_id, purpose);
            if self
                .registrar
                .lookup_account_address(&chain.connection_id, &owner)
                .is_some()
            {
                continue;
            }
            self.registrar
                .register_account(&chain.connection_id, &owner, &metadata)?;
            retried.push(purpose);
        }
        Ok(retried)
    }

    /// Registration progress of each of the chain's accounts.
    pub fn account_statuses(&self, chain: &SourceChain) -> Vec<AccountStatus> {
        AccountPurpose::ALL
            .into_iter()
            .map(|purpose| {
                let owner = owner_key(&chain.chain_id, purpose);
                AccountStatus {
                    purpose,
                    state: self.registrar.registration_state(&chain.connection_id, &owner),
                    address: self
                        .registrar
                        .lookup_account_address(&chain.connection_id, &owner),
                    owner,
                }
            })
            .collect()
    }

    /// Stop accepting new deposits and unbonding requests for a chain.
    /// Entries already queued still mature.
    pub fn deactivate_source_chain(
        &self,
        chain_id: &ChainId,
    ) -> Result<SourceChain, SourceChainError> {
        let mut chain = self.require_source_chain(chain_id)?;
        if chain.active {
            chain.active = false;
            self.store.put_source_chain(&chain)?;
            tracing::info!(%chain_id, "source chain deactivated");
        }
        Ok(chain)
    }

    pub fn list_source_chains(&self) -> Result<Vec<SourceChain>, SourceChainError> {
        Ok(self.store.iter_source_chains()?)
    }

    /// The chain whose voucher denom on the home chain is `denom`.
    pub fn find_by_ibc_denom(&self, denom: &Denom) -> Result<Option<SourceChain>, SourceChainError> {
        Ok(self
            .store
            .iter_source_chains()?
            .into_iter()
            .find(|c| &c.ibc_denom == denom))
    }

    /// Write a chain record as-is. Used by genesis import only.
    pub fn import_source_chain(&self, chain: &SourceChain) -> Result<(), SourceChainError> {
        if self.store.source_chain_exists(&chain.chain_id)? {
            return Err(SourceChainError::AlreadyExists(chain.chain_id.clone()));
        }
        self.store.put_source_chain(chain)?;
        Ok(())
    }
}
