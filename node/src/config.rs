//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use interstake_equivalence::StaticRateTable;
use interstake_types::{Address, ChainId, Params};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for an interstake node.
///
/// Can be loaded from a TOML file via [`AppConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Data directory for LMDB storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "debug,interstake_unbonding=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between blocks in the standalone block loop.
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,

    #[serde(default)]
    pub params: Params,

    /// Rates into `params.bond_denom`, keyed by voucher denom.
    #[serde(default)]
    pub rates: StaticRateTable,

    #[serde(default)]
    pub host: HostConfig,
}

/// The IBC host a standalone node simulates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostConfig {
    /// Chains with an active light client.
    #[serde(default)]
    pub active_clients: Vec<ChainId>,

    #[serde(default = "default_true")]
    pub send_enabled: bool,

    #[serde(default = "default_true")]
    pub receive_enabled: bool,

    /// Accounts the bank refuses to pay into.
    #[serde(default)]
    pub blocked_addresses: Vec<Address>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./interstake_data")
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_block_time_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("AppConfig is always serializable to TOML")
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        self.log_format()?;
        if self.block_time_secs == 0 {
            return Err(NodeError::Config("block_time_secs must be positive".into()));
        }
        if self.params.unbonding_time_secs == 0 {
            return Err(NodeError::Config(
                "params.unbonding_time_secs must be positive".into(),
            ));
        }
        if self.map_size_mb == 0 {
            return Err(NodeError::Config("map_size_mb must be positive".into()));
        }
        if self.host.blocked_addresses.contains(&self.params.module_account) {
            return Err(NodeError::Config(format!(
                "module account {} cannot be blocked",
                self.params.module_account
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            block_time_secs: default_block_time_secs(),
            params: Params::default(),
            rates: StaticRateTable::default(),
            host: HostConfig::default(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            active_clients: Vec::new(),
            send_enabled: true,
            receive_enabled: true,
            blocked_addresses: Vec::new(),
        }
    }
}
