//! TRUE adapter command line.
//! Loads the registered assets with their configs and queries the node.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use truechain_adapter::core::domain::{Coin, SmartContract};
use truechain_adapter::service::{create_registry, AssetsService};

#[derive(Parser)]
#[command(name = "truechain-adapter")]
#[command(about = "TRUE asset adapter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Asset symbol to query
    #[arg(long, global = true, default_value = "TRUE")]
    symbol: String,

    /// Directory holding `<SYMBOL>.toml` files
    #[arg(long, global = true, env = "ASSETS_CONFIG_DIR", default_value = "conf")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered asset symbols
    Symbols,
    /// Native balance of one or more addresses
    Balance {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// ERC-20 token balance of one or more addresses
    TokenBalance {
        /// Token contract address
        #[arg(long)]
        contract: String,
        /// Token decimals
        #[arg(long, default_value = "18")]
        decimals: u8,
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Current fee rate
    FeeRate,
    /// Latest block height
    BlockHeight,
    /// Look a transaction up by hash
    Tx { tx_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging()?;

    info!("Starting TRUE adapter v{}", env!("CARGO_PKG_VERSION"));

    let service = AssetsService::new(create_registry());
    let loaded = service
        .load_config_dir(&args.config_dir)
        .with_context(|| format!("loading configs from {}", args.config_dir.display()))?;
    info!("Configured assets: {:?}", loaded);

    match args.command {
        Commands::Symbols => {
            for symbol in service.registry().symbols() {
                let adapter = service.adapter(&symbol)?;
                println!("{}\t{}", symbol, adapter.full_name());
            }
        }
        Commands::Balance { addresses } => {
            let balances = service.get_balance_by_address(&args.symbol, &addresses).await?;
            println!("{}", serde_json::to_string_pretty(&balances)?);
        }
        Commands::TokenBalance { contract, decimals, addresses } => {
            let contract = SmartContract {
                contract_id: contract.clone(),
                address: contract,
                symbol: args.symbol.clone(),
                decimals,
                ..Default::default()
            };
            let balances = service.get_token_balance_by_address(&contract, &addresses).await?;
            println!("{}", serde_json::to_string_pretty(&balances)?);
        }
        Commands::FeeRate => {
            let (rate, unit) = service.get_estimate_fee_rate(&Coin::native(&args.symbol)).await?;
            println!("{} {}/{}", rate, args.symbol, unit);
        }
        Commands::BlockHeight => {
            println!("{}", service.get_block_height(&args.symbol).await?);
        }
        Commands::Tx { tx_id } => match service.get_transaction(&args.symbol, &tx_id).await? {
            Some(tx) => println!("{}", serde_json::to_string_pretty(&tx)?),
            None => println!("transaction {} not found", tx_id),
        },
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
