use alloy_primitives::Address;
use alpha_tracker::config::{Config, Network};
use alpha_tracker::repository::{Database, TrackedWallet, WalletRepository};
use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "wallets")]
#[command(about = "Manage the tracked smart-wallet watchlist", long_about = None)]
struct Cli {
    /// Network the wallets belong to. Overrides the NETWORK env var.
    #[arg(short, long)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add or update one wallet. Lower score = better trader.
    Add { address: String, score: f64 },
    /// Bulk-import wallets from a CSV file with address,score columns.
    Import { path: PathBuf },
    /// List the best-ranked wallets.
    List {
        #[arg(default_value = "20")]
        count: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let network = match cli.network {
        Some(name) => name.parse::<Network>()?,
        None => config.network,
    };

    let db = Database::new(&config.database_url)?;
    let repo = WalletRepository::new(&db.conn);

    match cli.command {
        Commands::Add { address, score } => {
            let address = Address::from_str(&address)
                .map_err(|_| anyhow::anyhow!("Invalid address format: {}", address))?;
            repo.insert(&TrackedWallet { address, score }, network)?;
            println!("Added {address:?} with score {score} on {network}");
        }
        Commands::Import { path } => {
            let imported = repo.import_csv(&path, network)?;
            println!("Imported {imported} wallets on {network}");
        }
        Commands::List { count } => {
            let wallets = repo.top_wallets(network, count)?;
            if wallets.is_empty() {
                println!("No tracked wallets for {network}.");
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec!["Rank", "Address", "Score"]);
            for (i, wallet) in wallets.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(format!("{:?}", wallet.address)),
                    Cell::new(wallet.score),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
