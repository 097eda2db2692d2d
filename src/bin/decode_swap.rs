use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solana_swap_decoder::{rpc, DecodeConfig, SolanaTransaction, SwapParser};

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Parser)]
#[command(author, version, about = "Decode the swap carried by a Solana transaction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// JSON file with decode options (camelCase DecodeConfig)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log dispatch details at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Print raw fragments and recovered errors instead of the summary
    #[arg(long, global = true)]
    fragments: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a transaction stored as RPC-shaped JSON
    File {
        /// Path to the transaction JSON
        path: PathBuf,
    },
    /// Fetch a transaction by signature via RPC and decode it
    Signature {
        signature: String,
        /// RPC endpoint URL (can also be set via SOLANA_RPC_URL)
        #[arg(long, env = "SOLANA_RPC_URL", default_value = DEFAULT_RPC_URL)]
        rpc_url: String,
    },
}

fn read_transaction(path: &Path) -> Result<SolanaTransaction> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&data)
        .with_context(|| format!("failed to parse transaction JSON in {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let config = match &cli.config {
        Some(path) => DecodeConfig::from_json_file(path)?,
        None => DecodeConfig::default(),
    };

    let tx = match &cli.command {
        Commands::File { path } => read_transaction(path)?,
        Commands::Signature { signature, rpc_url } => rpc::fetch_transaction(rpc_url, signature)
            .with_context(|| format!("failed to fetch transaction {signature}"))?,
    };

    let parser = SwapParser::new();
    if cli.fragments {
        let outcome = parser.dispatch(&tx, Some(&config))?;
        for (protocol, err) in outcome.diagnostics.entries() {
            eprintln!("recovered [{protocol}]: {err}");
        }
        println!("{}", serde_json::to_string_pretty(&outcome.fragments)?);
        return Ok(());
    }

    let summary = parser
        .parse_swap(&tx, Some(&config))
        .context("no swap could be decoded")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
