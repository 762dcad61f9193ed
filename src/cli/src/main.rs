//! Operator command line for ERC20 tokens on a local development chain.

use anyhow::Result;
use cli::args::{parse_address, parse_amount};
use cli::commands::{bulk, deploy, distribute, info, init_config, poll, quote, register};
use cli::{BulkArgs, OpsConfig, PollArgs};
use colored::Colorize;
use ethers::types::{Address, U256};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::error;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command line arguments for the operator CLI.
#[derive(Debug, StructOpt)]
#[structopt(name = "tokenops", about = "Token deployment, distribution and load runs")]
struct Opt {
    /// Path to the configuration file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint, overrides the configuration
    #[structopt(long)]
    rpc_url: Option<String>,

    /// Registry endpoint, overrides the configuration
    #[structopt(long)]
    registry_url: Option<String>,

    /// Subcommand to run
    #[structopt(subcommand)]
    cmd: Command,
}

/// Subcommands for the operator CLI.
#[derive(Debug, StructOpt)]
enum Command {
    /// Show name, symbol and supply of a token
    #[structopt(name = "info")]
    Info {
        /// Token contract address
        #[structopt(long, parse(try_from_str = parse_address))]
        token: Address,
    },

    /// Share a wallet's balance evenly with other wallets
    #[structopt(name = "distribute")]
    Distribute {
        /// Token contract address
        #[structopt(long, parse(try_from_str = parse_address))]
        token: Address,

        /// Index of the sending wallet
        #[structopt(long, default_value = "0")]
        source: usize,

        /// Indices of the receiving wallets (default: all others)
        #[structopt(long, use_delimiter = true)]
        recipients: Vec<usize>,
    },

    /// Send repeated transfers from several wallets concurrently
    #[structopt(name = "bulk")]
    Bulk {
        /// Token contract address
        #[structopt(long, parse(try_from_str = parse_address))]
        token: Address,

        /// Indices of the sending wallets (default: all)
        #[structopt(long, use_delimiter = true)]
        wallets: Vec<usize>,

        /// Recipient of every transfer
        #[structopt(long, parse(try_from_str = parse_address))]
        destination: Option<Address>,

        /// Amount of each transfer in base units
        #[structopt(long, parse(try_from_str = parse_amount))]
        amount: Option<U256>,

        /// Transfers per wallet
        #[structopt(long)]
        repeat: Option<usize>,

        /// Fund the other senders from the first one before starting
        #[structopt(long)]
        distribute_first: bool,
    },

    /// Periodically report supply and recent transfers of tokens
    #[structopt(name = "poll")]
    Poll {
        /// Token contract addresses
        #[structopt(long, required = true, use_delimiter = true, parse(try_from_str = parse_address))]
        token: Vec<Address>,

        /// Seconds between two polls
        #[structopt(long)]
        interval_secs: Option<u64>,

        /// Blocks before the latest one to scan for transfers
        #[structopt(long, default_value = "1")]
        lookback: u64,

        /// Stop after this many polls
        #[structopt(long)]
        ticks: Option<u64>,

        /// Send this amount from the first wallet on every poll
        #[structopt(long, parse(try_from_str = parse_amount))]
        heartbeat_amount: Option<U256>,

        /// Recipient of the heartbeat transfer
        #[structopt(long, parse(try_from_str = parse_address))]
        heartbeat_to: Option<Address>,
    },

    /// Deploy the swap contract and tokens
    #[structopt(name = "deploy")]
    Deploy {
        /// Number of tokens to deploy
        #[structopt(long, default_value = "2")]
        count: usize,

        /// Do not report the deployment to the registry
        #[structopt(long)]
        no_register: bool,
    },

    /// Register a deployed token
    #[structopt(name = "register-token")]
    RegisterToken {
        /// Token name
        #[structopt(long)]
        token: String,

        /// Token contract address
        #[structopt(long, parse(try_from_str = parse_address))]
        address: Address,
    },

    /// Quote a swap on the swap contract
    #[structopt(name = "quote")]
    Quote {
        /// Swap contract address
        #[structopt(long, parse(try_from_str = parse_address))]
        swap: Address,

        /// Input amount in base units
        #[structopt(long, parse(try_from_str = parse_amount))]
        amount: U256,

        /// Input side of the pair (default: first wallet)
        #[structopt(long, parse(try_from_str = parse_address))]
        token_in: Option<Address>,

        /// Output side of the pair (default: second wallet)
        #[structopt(long, parse(try_from_str = parse_address))]
        token_out: Option<Address>,
    },

    /// Write the default configuration file
    #[structopt(name = "init-config")]
    InitConfig {
        /// Destination (default: the user configuration directory)
        #[structopt(long, parse(from_os_str))]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenv::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    if let Err(e) = subscriber.try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    // Parse command line arguments
    let opt = Opt::from_args();

    if let Err(e) = run(opt).await {
        error!("{:#}", e);
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

async fn run(opt: Opt) -> Result<()> {
    if let Command::InitConfig { output } = &opt.cmd {
        let path = init_config::run(output.as_deref()).await?;
        println!("{} {}", "Configuration written:".green(), path.display());
        return Ok(());
    }

    // Load configuration
    let mut config = OpsConfig::load(opt.config.as_deref())?;

    // Override endpoints if specified
    if let Some(url) = opt.rpc_url {
        config.rpc_url = url;
    }
    if let Some(url) = opt.registry_url {
        config.registry_url = url;
    }

    // Run the appropriate command
    match opt.cmd {
        Command::Info { token } => {
            let summary = info::run(&config, token).await?;
            println!("{} {}", "Name:".green(), summary.name);
            println!("{} {}", "Symbol:".green(), summary.symbol);
            println!("{} {}", "Total supply:".green(), summary.total_supply);
        }
        Command::Distribute {
            token,
            source,
            recipients,
        } => {
            let (outcome, balances) = distribute::run(&config, token, source, &recipients).await?;
            println!(
                "{} {} to each of {} recipients, {} retained",
                "Distributed:".green(),
                outcome.plan.share,
                outcome.receipts.len(),
                outcome.plan.retained
            );
            for (entry, snapshot) in config.wallets.iter().zip(&balances) {
                println!("  {} {:?}: {}", entry.label.bold(), snapshot.address, snapshot.amount);
            }
        }
        Command::Bulk {
            token,
            wallets,
            destination,
            amount,
            repeat,
            distribute_first,
        } => {
            let args = BulkArgs {
                wallets,
                destination,
                amount,
                repeat,
                distribute_first,
            };
            let report = bulk::run(&config, token, &args).await?;
            for run in &report.runs {
                match &run.error {
                    None => println!(
                        "  {} {:?}: {} confirmed",
                        run.label.bold(),
                        run.wallet,
                        run.receipts.len()
                    ),
                    Some(e) => println!(
                        "  {} {:?}: {} confirmed, {} {}",
                        run.label.bold(),
                        run.wallet,
                        run.receipts.len(),
                        "stopped:".red(),
                        e
                    ),
                }
            }
            println!(
                "{} {} transfers in {:.3}s ({:.1} tx/s)",
                "Bulk transfer:".green(),
                report.total_confirmed(),
                report.elapsed.as_secs_f64(),
                report.transactions_per_second()
            );
            bulk::ensure_complete(&report)?;
        }
        Command::Poll {
            token,
            interval_secs,
            lookback,
            ticks,
            heartbeat_amount,
            heartbeat_to,
        } => {
            let args = PollArgs {
                tokens: token,
                interval_secs,
                lookback,
                ticks,
                heartbeat_amount,
                heartbeat_to,
            };
            let completed = poll::run(&config, &args).await?;
            println!("{} {} polls", "Stopped after".green(), completed);
        }
        Command::Deploy { count, no_register } => {
            let deployment = deploy::run(&config, count, !no_register).await?;
            println!("{} {:?}", "Swap contract:".green(), deployment.swap);
            for token in &deployment.tokens {
                println!(
                    "{} {} ({}) at {:?}",
                    "Token:".green(),
                    token.name,
                    token.symbol,
                    token.address
                );
            }
        }
        Command::RegisterToken { token, address } => {
            let response = register::run(&config, &token, address).await?;
            println!("{} {} {}", "Registered:".green(), response.status, response.body);
        }
        Command::Quote {
            swap,
            amount,
            token_in,
            token_out,
        } => {
            let amounts = quote::run(&config, swap, amount, token_in, token_out).await?;
            let amounts: Vec<String> = amounts.iter().map(U256::to_string).collect();
            println!("{} {}", "Amounts out:".green(), amounts.join(", "));
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}
