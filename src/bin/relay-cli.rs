use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use dtps_relay::config::{load_config, RelayConfig};
use dtps_relay::ledger::legacy::LegacyAddress;
use dtps_relay::ledger::TokenLedger;
use dtps_relay::lifecycle::startup::{build_client, build_legacy_client};
use dtps_relay::CosmosClient;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the DTPS announce relay", long_about = None)]
struct Cli {
    /// Relay configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a legacy node and show its health and chain height
    Node,
    /// Show a legacy account and its currency balance
    Account { address: String },
    /// Show a legacy block
    Block { height: u64 },
    /// Show the status of a legacy transaction
    Status { hash: String },
    /// Show a new-ledger balance in the configured denom
    Balance { address: String },
}

#[derive(Serialize)]
struct NodeReport {
    url: String,
    healthy: bool,
    height: String,
    finalized_height: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    let client = build_client()?;

    match cli.command {
        Commands::Node => {
            let legacy = build_legacy_client(&config, client)?;
            let node = legacy.selector().select_node().await?;
            let health = node.node().health().await?;
            let chain = node.chain().info().await?;
            print_json(&NodeReport {
                url: node.url().to_string(),
                healthy: health.is_up(),
                height: chain.height,
                finalized_height: chain.latest_finalized_block.map(|b| b.height),
            })?;
        }
        Commands::Account { address } => {
            let legacy = build_legacy_client(&config, client)?;
            let address =
                LegacyAddress::from_raw_on(&address, legacy.network().network_type)?;
            let node = legacy.selector().select_node().await?;
            let info = node.accounts().account_info(&address).await?;
            let currency = &legacy.network().currency;
            let balance = info.balance_of(&currency.mosaic_id);
            print_json(&serde_json::json!({
                "address": address.pretty(),
                "publicKey": info.public_key,
                "currency": currency.namespace,
                "balance": balance,
                "divisibility": currency.divisibility,
            }))?;
        }
        Commands::Block { height } => {
            let legacy = build_legacy_client(&config, client)?;
            let node = legacy.selector().select_node().await?;
            print_json(&node.blocks().block(height).await?)?;
        }
        Commands::Status { hash } => {
            let legacy = build_legacy_client(&config, client)?;
            let node = legacy.selector().select_node().await?;
            print_json(&node.transactions().status(&hash).await?)?;
        }
        Commands::Balance { address } => {
            let cosmos = CosmosClient::new(client, &config.cosmos)?;
            if !cosmos.validate_address(&address) {
                return Err(format!(
                    "'{}' is not a {} address",
                    address, config.cosmos.address_prefix
                )
                .into());
            }
            let balance = cosmos.get_balance(&address, &config.cosmos.denom).await?;
            print_json(&serde_json::json!({
                "address": address,
                "denom": balance.denom,
                "amount": balance.amount,
            }))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
