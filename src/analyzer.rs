use crate::classifier::{TradeClassifier, TradeEvent, TradeSide};
use crate::config::Network;
use crate::contracts::ContractType;
use crate::repository::TrackedWallet;
use crate::rpc::{AlchemyClient, Direction, TransferParams};
use crate::scoring::{RankedToken, ScoreParams, TokenLedger};
use crate::transfers::Transfer;
use anyhow::Result;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

/// Pause between wallets to stay under the RPC rate limit.
const WALLET_DELAY: Duration = Duration::from_millis(500);

/// Final output of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub side: TradeSide,
    pub network: Network,
    pub wallets_analyzed: usize,
    pub wallets_failed: usize,
    pub total_events: usize,
    pub unique_tokens: usize,
    pub total_eth: f64,
    pub total_usd: f64,
    pub ranked: Vec<RankedToken>,
    pub venue_counts: BTreeMap<ContractType, usize>,
    pub native_events: usize,
    pub bridge_events: usize,
}

/// Drives the whole run: fetch transfers per wallet, classify, fold into the
/// ledger, rank. Wallet failures are contained; one bad wallet never kills
/// the run.
pub struct WalletAnalyzer {
    client: AlchemyClient,
    classifier: TradeClassifier,
    network: Network,
}

impl WalletAnalyzer {
    pub fn new(client: AlchemyClient, classifier: TradeClassifier, network: Network) -> Self {
        WalletAnalyzer {
            client,
            classifier,
            network,
        }
    }

    /// Block range covering the last `days_back` days, ending at the chain
    /// head.
    pub async fn recent_block_range(&self, days_back: f64) -> Result<(u64, u64)> {
        let latest = self.client.get_latest_block().await?;
        let span = (days_back * self.network.blocks_per_day() as f64) as u64;
        Ok((latest.saturating_sub(span), latest))
    }

    pub async fn run(
        &self,
        side: TradeSide,
        wallets: &[TrackedWallet],
        days_back: f64,
    ) -> Result<AnalysisReport> {
        let block_range = self.recent_block_range(days_back).await?;
        info!(
            "Analyzing {} wallets on {} over blocks {}..{}",
            wallets.len(),
            self.network,
            block_range.0,
            block_range.1
        );

        let mut ledger = TokenLedger::new();
        let mut wallets_failed = 0;

        for (i, wallet) in wallets.iter().enumerate() {
            let address = format!("{:?}", wallet.address);
            match self
                .analyze_wallet(side, &address, wallet.score, block_range)
                .await
            {
                Ok(events) => {
                    info!("{}: {} qualifying {} events", address, events.len(), side);
                    ledger.merge(events);
                }
                Err(e) => {
                    warn!("Skipping wallet {}: {}", address, e);
                    wallets_failed += 1;
                }
            }

            if i + 1 < wallets.len() {
                tokio::time::sleep(WALLET_DELAY).await;
            }
        }

        Ok(summarize(
            side,
            self.network,
            wallets.len(),
            wallets_failed,
            &ledger,
        ))
    }

    /// Fetch and classify one wallet. Buys need both directions (the spent
    /// leg and the received token); sells only the outgoing token leg.
    async fn analyze_wallet(
        &self,
        side: TradeSide,
        address: &str,
        wallet_score: f64,
        block_range: (u64, u64),
    ) -> Result<Vec<TradeEvent>> {
        match side {
            TradeSide::Buy => {
                let outgoing = self.client.get_asset_transfers(TransferParams::new(
                    address,
                    Direction::Outgoing,
                    block_range,
                    &["external", "erc20"],
                ));
                let incoming = self.client.get_asset_transfers(TransferParams::new(
                    address,
                    Direction::Incoming,
                    block_range,
                    &["erc20"],
                ));
                let (outgoing, incoming) = futures::try_join!(outgoing, incoming)?;

                let outgoing = decode(outgoing);
                let incoming = decode(incoming);
                Ok(self
                    .classifier
                    .classify_wallet_purchases(address, wallet_score, &outgoing, &incoming))
            }
            TradeSide::Sell => {
                let outgoing = self
                    .client
                    .get_asset_transfers(TransferParams::new(
                        address,
                        Direction::Outgoing,
                        block_range,
                        &["erc20"],
                    ))
                    .await?;

                let outgoing = decode(outgoing);
                Ok(self
                    .classifier
                    .classify_wallet_sells(address, wallet_score, &outgoing))
            }
        }
    }
}

fn decode(raw: Vec<crate::transfers::RawTransfer>) -> Vec<Transfer> {
    raw.into_iter().map(|t| t.into_transfer()).collect()
}

/// Build the report from a fully-folded ledger.
fn summarize(
    side: TradeSide,
    network: Network,
    wallets_analyzed: usize,
    wallets_failed: usize,
    ledger: &TokenLedger,
) -> AnalysisReport {
    let mut venue_counts: BTreeMap<ContractType, usize> = BTreeMap::new();
    let mut native_events = 0;
    let mut bridge_events = 0;
    let mut total_eth = 0.0;
    let mut total_usd = 0.0;

    for aggregate in ledger.tokens() {
        total_eth += aggregate.total_eth;
        total_usd += aggregate.total_usd;
        for event in &aggregate.events {
            *venue_counts
                .entry(event.contract_info.contract_type)
                .or_insert(0) += 1;
            if event.is_native {
                native_events += 1;
            }
            if event.contract_info.contract_type == ContractType::Bridge {
                bridge_events += 1;
            }
        }
    }

    AnalysisReport {
        side,
        network,
        wallets_analyzed,
        wallets_failed,
        total_events: ledger.event_count(),
        unique_tokens: ledger.tokens().len(),
        total_eth,
        total_usd,
        ranked: ledger.rank(&ScoreParams::for_side(side)),
        venue_counts,
        native_events,
        bridge_events,
    }
}
