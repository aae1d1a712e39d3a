use alpha_tracker::analyzer::WalletAnalyzer;
use alpha_tracker::classifier::{TradeClassifier, TradeSide};
use alpha_tracker::config::{Config, Network};
use alpha_tracker::report::{OutputFormat, format_report};
use alpha_tracker::repository::{Database, WalletRepository};
use alpha_tracker::rpc::AlchemyClient;
use anyhow::Result;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "analyze")]
#[command(about = "Rank tokens by smart-wallet trading activity", long_about = None)]
struct Cli {
    /// Network to analyze (ethereum or base). Overrides the NETWORK env var.
    #[arg(short, long)]
    network: Option<String>,

    /// Which side of the market to score.
    #[arg(short, long, default_value = "buy")]
    side: String,

    /// How many of the best-ranked wallets to analyze.
    #[arg(short, long, default_value = "20")]
    wallets: usize,

    /// Lookback window in days (fractions allowed).
    #[arg(short, long, default_value = "1.0")]
    days_back: f64,

    #[arg(short, long, default_value = "table")]
    format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    let side = cli.side.parse::<TradeSide>()?;
    let format = OutputFormat::from(cli.format.as_str());

    let config = Config::from_env()?;
    let network = match cli.network {
        Some(name) => name.parse::<Network>()?,
        None => config.network,
    };

    let db = Database::new(&config.database_url)?;
    let wallet_repo = WalletRepository::new(&db.conn);

    let wallets = wallet_repo.top_wallets(network, cli.wallets)?;
    if wallets.is_empty() {
        println!(
            "No tracked wallets for {network}. Add some first: wallets add <address> <score>"
        );
        return Ok(());
    }
    info!("Loaded {} tracked wallets for {}", wallets.len(), network);

    let client = AlchemyClient::new(&network.alchemy_url(&config.alchemy_api_key))?;
    let classifier = TradeClassifier::for_network(network);
    let analyzer = WalletAnalyzer::new(client, classifier, network);

    let report = analyzer.run(side, &wallets, cli.days_back).await?;
    println!("{}", format_report(&report, &format));

    Ok(())
}
