//! interstake node: the composition root.
//!
//! Wires the source chain registry, the equivalence calculator, the agent
//! ledger and the unbonding queue into one [`StakingApp`] and adds the
//! ambient pieces around it:
//! - configuration from TOML
//! - structured logging
//! - an event bus for observers
//! - Prometheus metrics
//! - genesis export and import
//! - a standalone LMDB-backed node with a block loop

pub mod app;
pub mod block_loop;
pub mod config;
pub mod error;
pub mod events;
pub mod genesis;
pub mod logging;
pub mod metrics;
pub mod standalone;

pub use app::{AppDeps, StakingApp};
pub use block_loop::{run_block_loop, ShutdownController};
pub use config::{AppConfig, HostConfig};
pub use error::NodeError;
pub use events::{AppEvent, EventBus};
pub use genesis::Genesis;
pub use logging::{init_logging, LogFormat};
pub use metrics::AppMetrics;
pub use standalone::StandaloneNode;
