//! JSON export and import of the application state.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use interstake_multistaking::{AgentSource, DepositRecord, MultiStakingAgent};
use interstake_store::{SourceChain, UnbondingEntry};
use interstake_types::Params;
use serde::{Deserialize, Serialize};

use crate::app::StakingApp;
use crate::NodeError;

/// Full application state at one height.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genesis {
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub source_chains: Vec<SourceChain>,
    #[serde(default)]
    pub agents: Vec<MultiStakingAgent>,
    /// Open deposits, not counting amounts already queued for unbonding.
    #[serde(default)]
    pub deposits: Vec<DepositRecord>,
    /// In sweep order.
    #[serde(default)]
    pub unbondings: Vec<UnbondingEntry>,
}

impl Genesis {
    pub fn export(app: &StakingApp) -> Result<Self, NodeError> {
        Ok(Self {
            params: app.params().clone(),
            source_chains: app.source_chains()?,
            agents: app.ledger().list_all()?,
            deposits: app.ledger().list_deposits()?,
            unbondings: app.pending_unbondings()?,
        })
    }

    /// Cross-record consistency checks.
    pub fn validate(&self) -> Result<(), NodeError> {
        let mut chains = BTreeSet::new();
        for chain in &self.source_chains {
            if !chains.insert(&chain.chain_id) {
                return Err(NodeError::Genesis(format!(
                    "duplicate source chain {}",
                    chain.chain_id
                )));
            }
        }

        let known_source = |source: &AgentSource| match source {
            AgentSource::Native => true,
            AgentSource::Chain(id) => chains.contains(id),
        };

        let mut agents = BTreeMap::new();
        for agent in &self.agents {
            if !known_source(&agent.source) {
                return Err(NodeError::Genesis(format!(
                    "agent {}/{} references an unknown source chain",
                    agent.validator, agent.source
                )));
            }
            if agents
                .insert((&agent.validator, &agent.source), agent.equivalent_amount)
                .is_some()
            {
                return Err(NodeError::Genesis(format!(
                    "duplicate agent {}/{}",
                    agent.validator, agent.source
                )));
            }
        }

        // What deposits and queued entries claim from each agent row.
        let mut claimed: BTreeMap<(&_, &_), u128> = BTreeMap::new();
        let mut deposits = BTreeSet::new();
        for record in &self.deposits {
            if !deposits.insert((&record.owner, &record.validator, &record.source)) {
                return Err(NodeError::Genesis(format!(
                    "duplicate deposit {}/{}/{}",
                    record.owner, record.validator, record.source
                )));
            }
            if record.coins == 0 {
                return Err(NodeError::Genesis(format!(
                    "deposit {}/{}/{} holds no coins",
                    record.owner, record.validator, record.source
                )));
            }
            let sum = claimed.entry((&record.validator, &record.source)).or_default();
            *sum = sum.saturating_add(record.equivalent_amount);
        }

        for entry in &self.unbondings {
            if !known_source(&entry.source) {
                return Err(NodeError::Genesis(format!(
                    "unbonding {} references an unknown source chain",
                    entry.sequence
                )));
            }
            let sum = claimed.entry((&entry.validator, &entry.source)).or_default();
            *sum = sum.saturating_add(entry.equivalent_amount);
        }

        for ((validator, source), sum) in claimed {
            let held = agents.get(&(validator, source)).copied().unwrap_or(0);
            if sum > held {
                return Err(NodeError::Genesis(format!(
                    "deposits and unbondings claim {sum} from {validator}/{source}, which holds {held}"
                )));
            }
        }
        Ok(())
    }

    /// Load into an empty application.
    ///
    /// Agent rows are restored as-is; queued entries get fresh sequence
    /// numbers in their exported order.
    pub fn import_into(&self, app: &StakingApp) -> Result<(), NodeError> {
        self.validate()?;
        if !app.source_chains()?.is_empty()
            || !app.ledger().list_all()?.is_empty()
            || !app.ledger().list_deposits()?.is_empty()
            || app.queue().pending_count()? > 0
        {
            return Err(NodeError::Genesis("state is not empty".into()));
        }
        if &self.params != app.params() {
            tracing::warn!("genesis params differ from configured params; configured params apply");
        }

        for chain in &self.source_chains {
            app.registry().import_source_chain(chain)?;
        }
        for agent in &self.agents {
            app.ledger()
                .credit(&agent.validator, &agent.source, agent.equivalent_amount)?;
        }
        for record in &self.deposits {
            app.ledger().import_deposit(record)?;
        }
        let mut entries = self.unbondings.clone();
        entries.sort_by_key(|e| e.key());
        for entry in entries {
            app.queue().import_entry(entry)?;
        }

        tracing::info!(
            source_chains = self.source_chains.len(),
            agents = self.agents.len(),
            deposits = self.deposits.len(),
            unbondings = self.unbondings.len(),
            "genesis imported"
        );
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, NodeError> {
        serde_json::to_string_pretty(self).map_err(|e| NodeError::Genesis(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self, NodeError> {
        serde_json::from_str(s).map_err(|e| NodeError::Genesis(e.to_string()))
    }

    pub fn read_file(path: &Path) -> Result<Self, NodeError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn write_file(&self, path: &Path) -> Result<(), NodeError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
