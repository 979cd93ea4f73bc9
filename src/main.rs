use std::path::PathBuf;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use txpeek::config::{self, Config, ContractSpec};
use txpeek::domain::abi::{CallDecoder, RawTransaction};
use txpeek::explorer::{
    argument_rows, parse_tx_hash, render_arguments, render_details, DetailTable, FunctionCalled,
    TransactionPage,
};
use txpeek::infrastructure::{create_provider, AbiLoader, AlloyCallDecoder, ProviderConfig};

#[derive(Debug, Parser)]
#[command(
    name = "txpeek",
    version,
    about = "txpeek: inspect a transaction and decode the function it called"
)]
struct Args {
    /// Config file (defaults to ~/.config/txpeek/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long, global = true)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long, global = true)]
    ipc: Option<PathBuf>,

    /// Known contract as ADDRESS=ABI_PATH (repeatable)
    #[arg(long = "contract", global = true, value_name = "ADDRESS=ABI_PATH")]
    contracts: Vec<String>,

    /// Deployments directory to scan for {address, abi} files (repeatable)
    #[arg(long, global = true)]
    deployments: Vec<PathBuf>,

    /// Tolerate trailing bytes after the encoded arguments
    #[arg(long, global = true)]
    lenient: bool,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch a transaction by hash and show its details
    Show {
        /// Transaction hash (0x-prefixed, 32 bytes)
        hash: String,
    },
    /// Decode call data offline against the known contracts
    Decode {
        /// Call data as hex ("0x" for none)
        #[arg(long)]
        data: String,
        /// Destination contract address
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let mut config = config::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args)?;

    let registry = AbiLoader::build_registry(&config);
    info!(
        contracts = registry.len(),
        functions = registry.function_count(),
        "loaded contract interfaces"
    );
    let decoder = AlloyCallDecoder::with_strict(config.strict_decoding);

    match &args.command {
        Command::Show { hash } => {
            let hash = parse_tx_hash(hash)?;
            let provider = create_provider(endpoint_from_args_and_config(&args, &config)).await?;
            let page = TransactionPage::new(&provider, &decoder, &registry, config.currency.clone());
            let details = page.load(hash).await?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                print!("{}", render_details(&details));
            }
        }
        Command::Decode { data, to } => {
            let to = to
                .as_deref()
                .map(|to| to.trim().parse::<Address>())
                .transpose()
                .context("invalid --to address")?;
            let payload = data.trim();
            let payload = payload.strip_prefix("0x").unwrap_or(payload);
            let input = hex::decode(payload).context("invalid hex in --data")?;

            let decoded = decoder.decode(&RawTransaction::new(to, input.clone()), &registry);
            let function = FunctionCalled::from_result(&input, &decoded);
            let rows = argument_rows(&decoded);

            if args.json {
                let value = serde_json::json!({ "function": function, "arguments": rows });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print!(
                    "{}",
                    DetailTable::new("Decoded Call")
                        .add("Function called", function.summary())
                        .render()
                );
                if !rows.is_empty() {
                    print!("\n{}", render_arguments(&rows));
                }
            }
        }
    }

    Ok(())
}

/// Fold command-line contract and deployment flags into the config
fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    for entry in &args.contracts {
        let (address, abi) = entry
            .split_once('=')
            .with_context(|| format!("--contract expects ADDRESS=ABI_PATH, got '{entry}'"))?;
        config.contracts.push(ContractSpec {
            name: None,
            address: address.trim().to_string(),
            abi: Some(abi.trim().to_string()),
            signatures: Vec::new(),
        });
    }
    config.deployments.extend(
        args.deployments
            .iter()
            .map(|dir| dir.to_string_lossy().to_string()),
    );
    if args.lenient {
        config.strict_decoding = false;
    }
    Ok(())
}

/// Command-line endpoints win; otherwise the first configured one, then localhost
fn endpoint_from_args_and_config(args: &Args, config: &Config) -> ProviderConfig {
    if let Some(url) = &args.rpc {
        return ProviderConfig::Http(url.clone());
    }
    if let Some(url) = &args.ws {
        return ProviderConfig::WebSocket(url.clone());
    }
    #[cfg(unix)]
    if let Some(path) = &args.ipc {
        return ProviderConfig::Ipc(path.clone());
    }

    for endpoint in &config.endpoints {
        if let Some(url) = &endpoint.rpc {
            return ProviderConfig::Http(url.clone());
        }
        if let Some(url) = &endpoint.ws {
            return ProviderConfig::WebSocket(url.clone());
        }
        #[cfg(unix)]
        if let Some(path) = &endpoint.ipc {
            return ProviderConfig::Ipc(PathBuf::from(path));
        }
    }

    ProviderConfig::default()
}
