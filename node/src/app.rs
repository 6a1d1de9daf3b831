//! The application: message handlers and end-of-block processing over the
//! registry, the agent ledger and the unbonding queue.

use std::sync::Arc;
use std::time::Instant;

use interstake_equivalence::{EquivalenceCalculator, RateSource};
use interstake_ica::{parse_owner_key, IcaRegistrar, IcaTransport};
use interstake_multistaking::{AgentLedger, AgentSource, DepositRecord, MultiStakingAgent};
use interstake_sourcechain::{
    AccountStatus, ClientStatusReader, SourceChain, SourceChainRegistry, TransferParams,
};
use interstake_store::{
    AgentStore, BatchStore, DepositStore, SourceChainStore, UnbondingEntry, UnbondingStore,
    WriteBatch,
};
use interstake_types::{
    AccountPurpose, Address, BlockContext, ChainId, Coin, ConnectionId, Denom, Params,
    ValidatorAddress,
};
use interstake_unbonding::{Bank, SweepReport, UnbondingQueue};

use crate::events::{AppEvent, EventBus};
use crate::metrics::AppMetrics;
use crate::NodeError;

/// Every collaborator the application needs.
pub struct AppDeps {
    pub source_chains: Arc<dyn SourceChainStore + Send + Sync>,
    pub agents: Arc<dyn AgentStore + Send + Sync>,
    pub deposits: Arc<dyn DepositStore + Send + Sync>,
    pub unbondings: Arc<dyn UnbondingStore + Send + Sync>,
    /// Applies the multi-keyspace writes of one handler atomically.
    pub batches: Arc<dyn BatchStore + Send + Sync>,
    pub ica: Arc<dyn IcaTransport + Send + Sync>,
    pub clients: Arc<dyn ClientStatusReader + Send + Sync>,
    pub transfer: Arc<dyn TransferParams + Send + Sync>,
    pub rates: Arc<dyn RateSource + Send + Sync>,
    pub bank: Arc<dyn Bank + Send + Sync>,
}

pub struct StakingApp {
    params: Params,
    registry: SourceChainRegistry,
    ledger: Arc<AgentLedger>,
    queue: UnbondingQueue,
    bank: Arc<dyn Bank + Send + Sync>,
    batches: Arc<dyn BatchStore + Send + Sync>,
    events: EventBus,
    metrics: AppMetrics,
}

impl StakingApp {
    pub fn new(params: Params, deps: AppDeps) -> Self {
        let registry = SourceChainRegistry::new(
            deps.source_chains,
            IcaRegistrar::new(deps.ica),
            deps.clients,
            deps.transfer,
            params.ica_version.clone(),
        );
        let ledger = Arc::new(AgentLedger::new(
            deps.agents,
            deps.deposits,
            EquivalenceCalculator::new(deps.rates),
            params.bond_denom.clone(),
        ));
        let queue = UnbondingQueue::new(
            deps.unbondings,
            Arc::clone(&deps.batches),
            Arc::clone(&ledger),
            Arc::clone(&deps.bank),
            params.module_account.clone(),
            params.unbonding_time_secs,
        );
        Self {
            params,
            registry,
            ledger,
            queue,
            bank: deps.bank,
            batches: deps.batches,
            events: EventBus::new(),
            metrics: AppMetrics::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&AppEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn metrics(&self) -> &AppMetrics {
        &self.metrics
    }

    pub fn registry(&self) -> &SourceChainRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &AgentLedger {
        &self.ledger
    }

    pub fn queue(&self) -> &UnbondingQueue {
        &self.queue
    }

    // ── Source chains ──────────────────────────────────────────────────

    pub fn add_source_chain(
        &self,
        chain: SourceChain,
        ctx: BlockContext,
    ) -> Result<SourceChain, NodeError> {
        let chain = self.registry.add_source_chain(chain, ctx)?;
        self.metrics.chains_registered.inc();
        self.events.emit(&AppEvent::SourceChainAdded {
            chain_id: chain.chain_id.clone(),
            connection_id: chain.connection_id.clone(),
        });
        Ok(chain)
    }

    /// Channel-layer callback once the counterparty confirmed an account.
    pub fn handle_account_active(
        &self,
        connection_id: &ConnectionId,
        owner: &str,
    ) -> Result<Option<SourceChain>, NodeError> {
        let Some(chain) = self.registry.handle_account_active(connection_id, owner)? else {
            return Ok(None);
        };
        if let Some((_, purpose)) = parse_owner_key(owner) {
            if let Some(address) = chain.address(purpose) {
                self.metrics.accounts_activated.inc();
                self.events.emit(&AppEvent::AccountActivated {
                    chain_id: chain.chain_id.clone(),
                    purpose,
                    address: address.clone(),
                });
            }
        }
        if self.registry.is_available(&chain) {
            self.events.emit(&AppEvent::SourceChainAvailable {
                chain_id: chain.chain_id.clone(),
            });
        }
        Ok(Some(chain))
    }

    pub fn deactivate_source_chain(&self, chain_id: &ChainId) -> Result<SourceChain, NodeError> {
        let chain = self.registry.deactivate_source_chain(chain_id)?;
        self.events.emit(&AppEvent::SourceChainDeactivated {
            chain_id: chain_id.clone(),
        });
        Ok(chain)
    }

    pub fn retry_pending_registrations(
        &self,
        chain_id: &ChainId,
    ) -> Result<Vec<AccountPurpose>, NodeError> {
        Ok(self.registry.retry_pending_registrations(chain_id)?)
    }

    /// The agent source a denom is staked through. Bond-denom coins are
    /// native; vouchers must belong to an active, available source chain.
    pub fn resolve_source(&self, denom: &Denom) -> Result<AgentSource, NodeError> {
        if denom == &self.params.bond_denom {
            return Ok(AgentSource::Native);
        }
        let chain = self.registry.find_by_ibc_denom(denom)?.ok_or_else(|| {
            NodeError::InvalidParameter(format!("{denom} is not a registered source chain denom"))
        })?;
        self.registry.ensure_usable(&chain.chain_id)?;
        Ok(AgentSource::Chain(chain.chain_id))
    }

    // ── Deposits and withdrawals ───────────────────────────────────────

    /// Escrow `coin` from `depositor`, credit its equivalent to
    /// `validator`'s agent row for the coin's source and record the
    /// depositor's share. All of it commits together or not at all.
    pub fn deposit(
        &self,
        depositor: &Address,
        validator: &ValidatorAddress,
        coin: Coin,
        ctx: BlockContext,
    ) -> Result<MultiStakingAgent, NodeError> {
        if coin.is_zero() {
            return Err(NodeError::InvalidParameter("deposit amount must be positive".into()));
        }
        let source = self.resolve_source(&coin.denom)?;
        let expected = self.ledger.expected_delegation_amount(&coin)?;
        if expected.is_zero() {
            return Err(NodeError::InvalidParameter(format!(
                "{coin} is worth nothing in {}",
                self.params.bond_denom
            )));
        }

        let mut batch = WriteBatch::new();
        self.bank
            .stage_transfer(&mut batch, depositor, &self.params.module_account, &coin)?;
        let agent = self.ledger.stage_deposit(
            &mut batch,
            depositor,
            validator,
            &source,
            coin.amount,
            expected.amount,
        )?;
        self.batches.commit(batch)?;

        tracing::info!(
            %depositor,
            %validator,
            %source,
            %coin,
            equivalent = expected.amount,
            height = ctx.height,
            "deposit credited"
        );
        self.metrics.deposits.inc();
        self.events.emit(&AppEvent::Deposited {
            depositor: depositor.clone(),
            validator: validator.clone(),
            source,
            coin,
            equivalent: expected.amount,
        });
        Ok(agent)
    }

    /// Queue the withdrawal of `coin` that `owner` previously deposited
    /// towards `validator`. Funds are released by a later `end_block`.
    pub fn request_unbonding(
        &self,
        owner: &Address,
        validator: &ValidatorAddress,
        coin: Coin,
        ctx: BlockContext,
    ) -> Result<UnbondingEntry, NodeError> {
        if coin.is_zero() {
            return Err(NodeError::InvalidParameter("unbonding amount must be positive".into()));
        }
        let source = self.resolve_source(&coin.denom)?;
        let entry = self.queue.redeem(owner, validator, &source, &coin, ctx)?;

        self.metrics.unbondings_queued.inc();
        self.metrics.pending_unbondings.inc();
        self.events.emit(&AppEvent::UnbondingQueued {
            sequence: entry.sequence,
            owner: entry.owner.clone(),
            validator: entry.validator.clone(),
            source: entry.source.clone(),
            coin: entry.balance.clone(),
            completion_time: entry.completion_time,
        });
        Ok(entry)
    }

    // ── Block processing ───────────────────────────────────────────────

    /// Settle every matured unbonding entry.
    pub fn end_block(&self, ctx: BlockContext) -> Result<SweepReport, NodeError> {
        let started = Instant::now();
        let report = self.queue.end_block(ctx)?;

        for entry in &report.settled {
            self.events.emit(&AppEvent::UnbondingSettled {
                sequence: entry.sequence,
                owner: entry.owner.clone(),
                coin: entry.balance.clone(),
            });
        }
        for failure in &report.failed {
            self.events.emit(&AppEvent::UnbondingFailed {
                sequence: failure.key.sequence,
                owner: failure.owner.clone(),
                reason: failure.reason.clone(),
            });
        }

        self.metrics
            .unbondings_settled
            .inc_by(report.settled.len() as u64);
        self.metrics
            .unbondings_failed
            .inc_by(report.failed.len() as u64);
        match self.queue.pending_count() {
            Ok(pending) => self.metrics.pending_unbondings.set(pending as i64),
            Err(e) => tracing::warn!(error = %e, "failed to count pending unbondings"),
        }
        self.metrics.block_height.set(ctx.height as i64);
        self.metrics
            .end_block_time_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        Ok(report)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn source_chains(&self) -> Result<Vec<SourceChain>, NodeError> {
        Ok(self.registry.list_source_chains()?)
    }

    pub fn source_chain(&self, chain_id: &ChainId) -> Result<Option<SourceChain>, NodeError> {
        Ok(self.registry.get_source_chain(chain_id)?)
    }

    pub fn is_available(&self, chain_id: &ChainId) -> bool {
        self.registry.is_available_by_id(chain_id)
    }

    pub fn account_statuses(&self, chain_id: &ChainId) -> Result<Vec<AccountStatus>, NodeError> {
        let chain = self.registry.require_source_chain(chain_id)?;
        Ok(self.registry.account_statuses(&chain))
    }

    pub fn agents(&self, validator: &ValidatorAddress) -> Result<Vec<MultiStakingAgent>, NodeError> {
        Ok(self.ledger.list_by_validator(validator)?)
    }

    pub fn voting_power(&self, validator: &ValidatorAddress) -> Result<u128, NodeError> {
        Ok(self.ledger.total_equivalent(validator)?)
    }

    pub fn pending_unbondings(&self) -> Result<Vec<UnbondingEntry>, NodeError> {
        Ok(self.queue.list_pending()?)
    }

    /// `owner`'s deposits that are not yet queued for withdrawal.
    pub fn deposits(&self, owner: &Address) -> Result<Vec<DepositRecord>, NodeError> {
        Ok(self.ledger.deposits_of(owner)?)
    }
}
