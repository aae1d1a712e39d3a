use crate::config::Network;
use crate::contracts::{
    Confidence, ContractDirectory, ContractInfo, ContractType, ENTROPY_CUTOFF, address_entropy,
};
use crate::prices::PriceTable;
use crate::tokens::TokenClassifier;
use crate::transfers::Transfer;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Token amount heuristics used by the trading-transaction pre-filter.
const LARGE_TOKEN_AMOUNT: f64 = 1000.0;
const USDC_TRADING_AMOUNT: f64 = 50.0;
const ETH_TRADING_AMOUNT: f64 = 0.005;

/// Minimum token amount for a purchase counterparty to be considered a
/// plausible trading contract even without other signals.
const PLAUSIBLE_COUNTERPARTY_AMOUNT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl FromStr for TradeSide {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "buy" | "buys" | "purchase" => Ok(TradeSide::Buy),
            "sell" | "sells" | "sale" => Ok(TradeSide::Sell),
            other => Err(anyhow::anyhow!("Unknown trade side: {}", other)),
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        })
    }
}

/// A qualifying purchase or sale, attributed to a venue and valued in both
/// ETH and USD. Immutable once emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub side: TradeSide,
    pub transaction_hash: String,
    pub token_symbol: String,
    pub amount: f64,
    pub counterparty: String,
    pub contract_info: ContractInfo,
    pub eth_value: f64,
    pub usd_value: f64,
    pub wallet_address: String,
    pub wallet_score: f64,
    pub is_native: bool,
    pub block_number: u64,
    pub token_contract_address: String,
}

/// Inclusion thresholds, all compared with `>=`.
#[derive(Debug, Clone)]
pub struct TradeThresholds {
    /// Base qualifying value in ETH equivalent.
    pub min_eth_value: f64,
    /// Fraction of the base threshold applied to non-ETH purchase legs.
    pub token_swap_fraction: f64,
    /// Fraction applied when attribution confidence is Medium.
    pub medium_confidence_fraction: f64,
    /// Fraction applied to native-ecosystem tokens.
    pub native_fraction: f64,
    /// Dust filter for sold token amounts.
    pub min_token_amount: f64,
    /// Token amount above which an unrecognized counterparty is treated as a
    /// probable trading bot.
    pub min_tokens_for_unknown: f64,
}

impl TradeThresholds {
    pub fn for_network(network: Network) -> Self {
        TradeThresholds {
            min_eth_value: network.min_eth_value(),
            token_swap_fraction: 0.5,
            medium_confidence_fraction: 0.2,
            native_fraction: 0.1,
            min_token_amount: 0.1,
            min_tokens_for_unknown: 50.0,
        }
    }
}

/// Decides whether grouped transfers represent a qualifying purchase or
/// sale. Pure: the same transfers always produce the same events.
pub struct TradeClassifier {
    tokens: TokenClassifier,
    contracts: ContractDirectory,
    prices: PriceTable,
    thresholds: TradeThresholds,
}

impl TradeClassifier {
    pub fn new(
        tokens: TokenClassifier,
        contracts: ContractDirectory,
        prices: PriceTable,
        thresholds: TradeThresholds,
    ) -> Self {
        TradeClassifier {
            tokens,
            contracts,
            prices,
            thresholds,
        }
    }

    pub fn for_network(network: Network) -> Self {
        Self::new(
            TokenClassifier::for_network(network),
            ContractDirectory::for_network(network),
            PriceTable::default(),
            TradeThresholds::for_network(network),
        )
    }

    /// Cheap pre-filter for transfers to unrecognized addresses: is the
    /// counterparty plausibly a trading venue at all?
    pub fn looks_like_trading_transaction(&self, to_address: &str, asset: &str, amount: f64) -> bool {
        let to_address = to_address.to_lowercase();

        to_address.starts_with("0x1111")
            || to_address.starts_with("0x3333")
            || to_address.starts_with("0x7777")
            || address_entropy(&to_address) >= ENTROPY_CUTOFF
            || amount >= LARGE_TOKEN_AMOUNT
            || (asset == "USDC" && amount >= USDC_TRADING_AMOUNT)
            || (asset == "ETH" && amount >= ETH_TRADING_AMOUNT)
    }

    /// Group a wallet's transfers by transaction hash and emit every
    /// qualifying purchase. One outgoing leg can pay for several received
    /// tokens in the same transaction.
    pub fn classify_wallet_purchases(
        &self,
        wallet_address: &str,
        wallet_score: f64,
        outgoing: &[Transfer],
        incoming: &[Transfer],
    ) -> Vec<TradeEvent> {
        let wallet = wallet_address.to_lowercase();

        let mut groups: HashMap<&str, (Option<&Transfer>, Vec<&Transfer>)> = HashMap::new();

        for transfer in outgoing {
            if !self.plausible_purchase_counterparty(&wallet, transfer) {
                continue;
            }
            if !self.is_significant_purchase(transfer) {
                continue;
            }
            groups
                .entry(transfer.transaction_hash.as_str())
                .or_default()
                .0
                .get_or_insert(transfer);
        }

        for transfer in incoming {
            if let Some(group) = groups.get_mut(transfer.transaction_hash.as_str()) {
                group.1.push(transfer);
            }
        }

        let mut purchases = Vec::new();

        for (_, (sent, received)) in groups {
            let Some(sent) = sent else { continue };

            for transfer in received {
                if let Some(event) =
                    self.classify_purchase(&wallet, wallet_score, sent, transfer)
                {
                    purchases.push(event);
                }
            }
        }

        // HashMap iteration order is arbitrary; keep output deterministic.
        purchases.sort_by(|a, b| {
            (a.block_number, &a.transaction_hash, &a.token_symbol).cmp(&(
                b.block_number,
                &b.transaction_hash,
                &b.token_symbol,
            ))
        });

        purchases
    }

    fn classify_purchase(
        &self,
        wallet: &str,
        wallet_score: f64,
        sent: &Transfer,
        received: &Transfer,
    ) -> Option<TradeEvent> {
        // Receiving back the token you sent is not a trade.
        if received.asset == sent.asset {
            return None;
        }

        let token = self.tokens.classify(&received.asset);
        if !token.is_interesting {
            return None;
        }

        let eth_spent = self.prices.eth_spent(sent.amount, &sent.asset);
        let contract_info = self.contracts.get_contract_info(&sent.to_address);

        if !self.passes_inclusion(&contract_info, token.is_native, eth_spent) {
            return None;
        }

        Some(TradeEvent {
            side: TradeSide::Buy,
            transaction_hash: sent.transaction_hash.clone(),
            token_symbol: received.asset.clone(),
            amount: received.amount,
            counterparty: sent.to_address.clone(),
            contract_info,
            eth_value: eth_spent,
            usd_value: self.prices.usd_value(received.amount, &received.asset),
            wallet_address: wallet.to_string(),
            wallet_score,
            is_native: token.is_native,
            block_number: received.block_number,
            token_contract_address: received.raw_contract_address.clone(),
        })
    }

    pub fn classify_wallet_sells(
        &self,
        wallet_address: &str,
        wallet_score: f64,
        outgoing: &[Transfer],
    ) -> Vec<TradeEvent> {
        let wallet = wallet_address.to_lowercase();
        outgoing
            .iter()
            .filter_map(|transfer| self.classify_sale(&wallet, wallet_score, transfer))
            .collect()
    }

    fn classify_sale(
        &self,
        wallet: &str,
        wallet_score: f64,
        transfer: &Transfer,
    ) -> Option<TradeEvent> {
        let token = self.tokens.classify(&transfer.asset);
        if !token.is_interesting {
            return None;
        }

        if transfer.amount < self.thresholds.min_token_amount {
            return None;
        }

        let mut contract_info = self.contracts.get_contract_info(&transfer.to_address);

        // Unregistered counterparties receiving a large token amount and
        // matching the trading pre-filter are most likely bot routers we
        // have not catalogued yet.
        if contract_info.confidence != Confidence::High
            && transfer.amount >= self.thresholds.min_tokens_for_unknown
            && self.looks_like_trading_transaction(
                &transfer.to_address,
                &transfer.asset,
                transfer.amount,
            )
        {
            contract_info = ContractInfo {
                name: "Possible BasedBot/Sigma (Large)".to_string(),
                platform: contract_info.platform,
                contract_type: ContractType::TelegramBot,
                confidence: Confidence::Medium,
            };
        }

        let usd_value = self.prices.usd_value(transfer.amount, &transfer.asset);
        let eth_value = self.prices.eth_equivalent(transfer.amount, &transfer.asset);

        if !self.passes_inclusion(&contract_info, token.is_native, eth_value) {
            return None;
        }

        Some(TradeEvent {
            side: TradeSide::Sell,
            transaction_hash: transfer.transaction_hash.clone(),
            token_symbol: transfer.asset.clone(),
            amount: transfer.amount,
            counterparty: transfer.to_address.clone(),
            contract_info,
            eth_value,
            usd_value,
            wallet_address: wallet.to_string(),
            wallet_score,
            is_native: token.is_native,
            block_number: transfer.block_number,
            token_contract_address: transfer.raw_contract_address.clone(),
        })
    }

    /// Buy-side counterparty pre-filter: known contract, or anything that
    /// could plausibly be a trading contract (unknown bots deploy routers we
    /// have never seen; recall over precision).
    fn plausible_purchase_counterparty(&self, wallet: &str, transfer: &Transfer) -> bool {
        let to = transfer.to_address.as_str();

        if self.contracts.is_known(to) {
            return true;
        }

        to.len() == 42
            && to != wallet
            && (transfer.asset == "ETH"
                || transfer.amount >= PLAUSIBLE_COUNTERPARTY_AMOUNT
                || self.looks_like_trading_transaction(to, &transfer.asset, transfer.amount))
    }

    /// Value gate for the outgoing purchase leg: full threshold for ETH,
    /// half for token swaps.
    fn is_significant_purchase(&self, transfer: &Transfer) -> bool {
        let eth = self.prices.eth_spent(transfer.amount, &transfer.asset);
        if transfer.asset == "ETH" {
            eth >= self.thresholds.min_eth_value
        } else {
            eth >= self.thresholds.min_eth_value * self.thresholds.token_swap_fraction
        }
    }

    /// Final inclusion gate combining attribution confidence with the value
    /// signal. High confidence always qualifies; weaker attributions need
    /// progressively more value; native tokens get their own low bar.
    fn passes_inclusion(&self, info: &ContractInfo, is_native: bool, eth_value: f64) -> bool {
        let min = self.thresholds.min_eth_value;

        let by_confidence = match info.confidence {
            Confidence::High => true,
            Confidence::Medium => eth_value >= min * self.thresholds.medium_confidence_fraction,
            Confidence::Low => eth_value >= min,
        };

        by_confidence || (is_native && eth_value >= min * self.thresholds.native_fraction)
    }
}
