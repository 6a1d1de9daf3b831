//! interstake daemon: runs a standalone node and operates on its state.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use interstake_node::{
    init_logging, run_block_loop, AppConfig, Genesis, ShutdownController, StandaloneNode,
};
use interstake_sourcechain::SourceChain;
use interstake_types::{
    AccountPurpose, Address, ChainId, ChannelId, Coin, ConnectionId, Denom, Timestamp,
    ValidatorAddress,
};
use interstake_utils::{format_duration, format_until};

#[derive(Parser)]
#[command(name = "interstaked", about = "interstake liquid staking node")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "INTERSTAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for LMDB storage.
    #[arg(long, env = "INTERSTAKE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "INTERSTAKE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "INTERSTAKE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Seconds between blocks.
    #[arg(long, env = "INTERSTAKE_BLOCK_TIME")]
    block_time: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Produce blocks until interrupted, settling matured unbondings.
    Run,
    /// List source chains and their interchain account status.
    Chains,
    /// Enroll a source chain and request its interchain accounts.
    AddChain {
        #[arg(long)]
        chain_id: ChainId,
        #[arg(long)]
        connection: ConnectionId,
        #[arg(long)]
        channel: ChannelId,
        #[arg(long)]
        prefix: String,
        #[arg(long)]
        native_denom: Denom,
        #[arg(long)]
        ibc_denom: Denom,
    },
    /// Confirm an interchain account as the counterparty would.
    ConfirmAccount {
        #[arg(long)]
        chain_id: ChainId,
        #[arg(long, value_parser = parse_purpose)]
        purpose: AccountPurpose,
        #[arg(long)]
        address: Address,
    },
    /// Re-request every interchain account not yet confirmed.
    RetryAccounts {
        #[arg(long)]
        chain_id: ChainId,
    },
    /// Stop accepting deposits and unbonding requests for a chain.
    DeactivateChain {
        #[arg(long)]
        chain_id: ChainId,
    },
    /// Credit coins to an account in the local bank.
    Mint {
        #[arg(long)]
        address: Address,
        /// e.g. "100ibc/27394FB0..."
        #[arg(long)]
        amount: Coin,
    },
    /// Deposit coins towards a validator.
    Deposit {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        validator: ValidatorAddress,
        #[arg(long)]
        amount: Coin,
    },
    /// Request withdrawal of previously deposited coins.
    Unbond {
        #[arg(long)]
        owner: Address,
        #[arg(long)]
        validator: ValidatorAddress,
        #[arg(long)]
        amount: Coin,
    },
    /// Show a validator's multi-staking agents.
    Agents {
        #[arg(long)]
        validator: ValidatorAddress,
    },
    /// Show an owner's open deposits.
    Deposits {
        #[arg(long)]
        owner: Address,
    },
    /// List queued unbonding entries.
    Unbonding,
    /// Export or import application state.
    Genesis {
        #[command(subcommand)]
        action: GenesisAction,
    },
    /// Configuration helpers.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand)]
enum GenesisAction {
    /// Write the current state as JSON.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load a JSON genesis into an empty data directory.
    Import {
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Print the default configuration as TOML.
    Default,
}

fn parse_purpose(s: &str) -> Result<AccountPurpose, String> {
    AccountPurpose::from_suffix(s)
        .ok_or_else(|| format!("unknown purpose {s:?}, expected delegate, withdraw or unbond"))
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Some(secs) = cli.block_time {
        config.block_time_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Config {
        action: ConfigAction::Default,
    } = &cli.command
    {
        print!("{}", AppConfig::default().to_toml_string());
        return Ok(());
    }

    let config = load_config(&cli)?;
    if matches!(cli.command, Command::Run) {
        init_logging(config.log_format()?, &config.log_level);
    } else {
        interstake_utils::init_tracing("warn");
    }

    let node = StandaloneNode::open(&config)
        .with_context(|| format!("opening data dir {}", config.data_dir.display()))?;

    match cli.command {
        Command::Run => {
            tracing::info!(
                data_dir = %config.data_dir.display(),
                block_time = %format_duration(config.block_time_secs),
                unbonding_time = %format_duration(config.params.unbonding_time_secs),
                "starting interstake node"
            );
            let controller = ShutdownController::new();
            let rx = controller.subscribe();
            let block_loop =
                run_block_loop(&node, Duration::from_secs(config.block_time_secs), rx);
            tokio::pin!(block_loop);
            let blocks = tokio::select! {
                result = &mut block_loop => result?,
                _ = controller.wait_for_signal() => block_loop.await?,
            };
            tracing::debug!(metrics = %node.app.metrics().encode(), "final metrics");
            tracing::info!(blocks, "interstake daemon exited cleanly");
        }
        Command::Chains => {
            for chain in node.app.source_chains()? {
                let available = node.app.is_available(&chain.chain_id);
                println!(
                    "{}\t{}\t{}\t{}",
                    chain.chain_id,
                    chain.connection_id,
                    chain.ibc_denom,
                    match (chain.active, available) {
                        (false, _) => "inactive",
                        (true, true) => "available",
                        (true, false) => "pending",
                    }
                );
                for status in node.app.account_statuses(&chain.chain_id)? {
                    println!(
                        "  {:<9}{}",
                        status.purpose.as_str(),
                        status
                            .address
                            .map(|a| a.to_string())
                            .unwrap_or_else(|| "-".to_string())
                    );
                }
            }
        }
        Command::AddChain {
            chain_id,
            connection,
            channel,
            prefix,
            native_denom,
            ibc_denom,
        } => {
            let ctx = node.next_block(Timestamp::now())?;
            let chain = node.app.add_source_chain(
                SourceChain {
                    chain_id,
                    connection_id: connection,
                    transfer_channel_id: channel,
                    bech32_prefix: prefix,
                    native_denom,
                    ibc_denom,
                    delegate_address: None,
                    withdraw_address: None,
                    unbond_address: None,
                    active: false,
                    registered_height: 0,
                },
                ctx,
            )?;
            node.finish_block(ctx)?;
            println!("{}", serde_json::to_string_pretty(&chain)?);
        }
        Command::ConfirmAccount {
            chain_id,
            purpose,
            address,
        } => {
            let chain = node.confirm_account(&chain_id, purpose, address)?;
            println!("{}", serde_json::to_string_pretty(&chain)?);
        }
        Command::RetryAccounts { chain_id } => {
            for purpose in node.app.retry_pending_registrations(&chain_id)? {
                println!("re-requested {purpose}");
            }
        }
        Command::DeactivateChain { chain_id } => {
            node.app.deactivate_source_chain(&chain_id)?;
            println!("{chain_id} deactivated");
        }
        Command::Mint { address, amount } => {
            let balance = node.bank.mint(&address, &amount)?;
            println!("{address}: {balance}{}", amount.denom);
        }
        Command::Deposit {
            from,
            validator,
            amount,
        } => {
            let ctx = node.next_block(Timestamp::now())?;
            let agent = node.app.deposit(&from, &validator, amount, ctx)?;
            node.finish_block(ctx)?;
            println!("{}", serde_json::to_string_pretty(&agent)?);
        }
        Command::Unbond {
            owner,
            validator,
            amount,
        } => {
            let ctx = node.next_block(Timestamp::now())?;
            let entry = node.app.request_unbonding(&owner, &validator, amount, ctx)?;
            node.finish_block(ctx)?;
            println!(
                "queued #{} completing {}",
                entry.sequence,
                format_until(entry.completion_time, ctx.time)
            );
        }
        Command::Agents { validator } => {
            for agent in node.app.agents(&validator)? {
                println!("{}\t{}", agent.source, agent.equivalent_amount);
            }
            println!(
                "total\t{}{}",
                node.app.voting_power(&validator)?,
                node.app.params().bond_denom
            );
        }
        Command::Deposits { owner } => {
            for record in node.app.deposits(&owner)? {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.validator, record.source, record.coins, record.equivalent_amount
                );
            }
        }
        Command::Unbonding => {
            let now = Timestamp::now();
            for entry in node.app.pending_unbondings()? {
                println!(
                    "#{}\t{}\t{}\t{}\t{}\t{}",
                    entry.sequence,
                    entry.owner,
                    entry.validator,
                    entry.source,
                    entry.balance,
                    format_until(entry.completion_time, now)
                );
            }
        }
        Command::Genesis { action } => match action {
            GenesisAction::Export { out } => {
                let genesis = Genesis::export(&node.app)?;
                match out {
                    Some(path) => {
                        genesis.write_file(&path)?;
                        eprintln!("genesis written to {}", path.display());
                    }
                    None => println!("{}", genesis.to_json_pretty()?),
                }
            }
            GenesisAction::Import { file } => {
                let genesis = Genesis::read_file(&file)
                    .with_context(|| format!("reading genesis {}", file.display()))?;
                node.import_genesis(&genesis)?;
                eprintln!("genesis imported from {}", file.display());
            }
        },
        Command::Config { .. } => {}
    }

    Ok(())
}
