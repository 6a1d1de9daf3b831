//! A self-contained node: LMDB state, a simulated IBC host, and the
//! store-backed bank.
//!
//! Without a host chain there is no relayer to confirm interchain accounts,
//! so the operator plays the counterparty through [`StandaloneNode::confirm_account`].

use std::sync::Arc;

use interstake_ica::owner_key;
use interstake_nullables::{NullIcaTransport, NullLightClients, NullTransferParams};
use interstake_sourcechain::{ClientStatus, SourceChain};
use interstake_store::SourceChainStore;
use interstake_store_lmdb::meta::SCHEMA_VERSION;
use interstake_store_lmdb::{LmdbEnvironment, LmdbMetaStore};
use interstake_types::{AccountPurpose, Address, BlockContext, ChainId, Timestamp};
use interstake_unbonding::{StoreBank, SweepReport};

use crate::app::{AppDeps, StakingApp};
use crate::config::AppConfig;
use crate::genesis::Genesis;
use crate::NodeError;

pub struct StandaloneNode {
    pub app: StakingApp,
    pub bank: Arc<StoreBank>,
    transport: Arc<NullIcaTransport>,
    meta: LmdbMetaStore,
    _env: LmdbEnvironment,
}

impl StandaloneNode {
    /// Open (or create) the data directory named by `config`.
    pub fn open(config: &AppConfig) -> Result<Self, NodeError> {
        let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())?;
        let meta = env.meta_store();
        match meta.get_schema_version()? {
            0 => meta.set_schema_version(SCHEMA_VERSION)?,
            SCHEMA_VERSION => {}
            other => {
                return Err(NodeError::Config(format!(
                    "data dir has schema version {other}, this build supports {SCHEMA_VERSION}"
                )))
            }
        }

        let clients = NullLightClients::new();
        for chain_id in &config.host.active_clients {
            clients.set_status(chain_id, ClientStatus::Active);
        }
        let transfer = NullTransferParams::enabled();
        transfer.set_send_enabled(config.host.send_enabled);
        transfer.set_receive_enabled(config.host.receive_enabled);

        let source_chains = Arc::new(env.source_chain_store());
        let transport = Arc::new(NullIcaTransport::new());
        restore_confirmed_accounts(&transport, &source_chains.iter_source_chains()?);

        let batches = Arc::new(env.batch_store());
        let bank = Arc::new(StoreBank::new(Arc::new(env.balance_store()), batches.clone()));
        for address in &config.host.blocked_addresses {
            bank.block(address);
        }
        let app = StakingApp::new(
            config.params.clone(),
            AppDeps {
                source_chains,
                agents: Arc::new(env.agent_store()),
                deposits: Arc::new(env.deposit_store()),
                unbondings: Arc::new(env.unbonding_store()),
                batches,
                ica: transport.clone(),
                clients: Arc::new(clients),
                transfer: Arc::new(transfer),
                rates: Arc::new(config.rates.clone()),
                bank: bank.clone(),
            },
        );

        tracing::info!(
            data_dir = %config.data_dir.display(),
            last_height = meta.last_block_height()?.unwrap_or(0),
            "standalone node opened"
        );
        Ok(Self {
            app,
            bank,
            transport,
            meta,
            _env: env,
        })
    }

    /// Context for the next block at wall-clock `time`.
    pub fn next_block(&self, time: Timestamp) -> Result<BlockContext, NodeError> {
        let height = self.meta.last_block_height()?.unwrap_or(0) + 1;
        Ok(BlockContext::new(height, time))
    }

    /// Run end-of-block processing and record the height as done.
    pub fn finish_block(&self, ctx: BlockContext) -> Result<SweepReport, NodeError> {
        let report = self.app.end_block(ctx)?;
        self.meta.set_last_block_height(ctx.height)?;
        Ok(report)
    }

    /// Load `genesis` into this (empty) node and re-seed the simulated
    /// controller with the imported account addresses.
    pub fn import_genesis(&self, genesis: &Genesis) -> Result<(), NodeError> {
        genesis.import_into(&self.app)?;
        restore_confirmed_accounts(&self.transport, &genesis.source_chains);
        Ok(())
    }

    /// Act as the counterparty: confirm one interchain account and let the
    /// registry record its address.
    pub fn confirm_account(
        &self,
        chain_id: &ChainId,
        purpose: AccountPurpose,
        address: Address,
    ) -> Result<SourceChain, NodeError> {
        let chain = self.app.registry().require_source_chain(chain_id)?;
        let owner = owner_key(chain_id, purpose);
        self.transport
            .confirm(&chain.connection_id, &owner, address);
        self.app
            .handle_account_active(&chain.connection_id, &owner)?
            .ok_or_else(|| NodeError::InvalidParameter(format!("{owner} was not confirmed")))
    }
}

/// The simulated controller keeps no state across restarts; re-seed it from
/// the addresses already recorded on each chain.
fn restore_confirmed_accounts(transport: &NullIcaTransport, chains: &[SourceChain]) {
    for chain in chains {
        for purpose in AccountPurpose::ALL {
            if let Some(address) = chain.address(purpose) {
                transport.confirm(
                    &chain.connection_id,
                    &owner_key(&chain.chain_id, purpose),
                    address.clone(),
                );
            }
        }
    }
}
