use crate::classifier::{TradeEvent, TradeSide};
use crate::contracts::{Confidence, ContractType};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Reputation scores above this carry zero weight.
const MAX_WALLET_SCORE: f64 = 300.0;

/// Consensus bonus factor applied per `ln(wallet_count)` once more than one
/// distinct wallet traded the token.
const CONSENSUS_FACTOR: f64 = 0.5;

/// Scoring constants for one side of the market. Sells run on a much steeper
/// value curve: exits are rarer signals than entries, and the multiplier
/// stack rewards venues where insiders actually take profit.
#[derive(Debug, Clone)]
pub struct ScoreParams {
    pub side: TradeSide,
    pub value_scale: f64,
    pub value_premultiplier: f64,
    pub native_bonus: f64,
    pub network_bonus: f64,
    pub use_venue_weights: bool,
}

impl ScoreParams {
    pub fn buy() -> Self {
        ScoreParams {
            side: TradeSide::Buy,
            value_scale: 10.0,
            value_premultiplier: 1.0,
            native_bonus: 1.3,
            network_bonus: 1.1,
            use_venue_weights: false,
        }
    }

    pub fn sell() -> Self {
        ScoreParams {
            side: TradeSide::Sell,
            value_scale: 2.0,
            value_premultiplier: 1000.0,
            native_bonus: 1.5,
            network_bonus: 1.2,
            use_venue_weights: true,
        }
    }

    pub fn for_side(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => Self::buy(),
            TradeSide::Sell => Self::sell(),
        }
    }
}

fn confidence_multiplier(confidence: Confidence) -> f64 {
    match confidence {
        Confidence::High => 1.0,
        Confidence::Medium => 0.9,
        Confidence::Low => 0.6,
    }
}

fn venue_multiplier(contract_type: ContractType) -> f64 {
    match contract_type {
        ContractType::Cex => 2.0,
        ContractType::TelegramBot => 1.8,
        ContractType::MevBot => 1.6,
        ContractType::Dex => 1.4,
        ContractType::P2pOtc => 1.3,
        _ => 1.0,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Everything accumulated for one token symbol across all analyzed wallets.
#[derive(Debug, Clone, Default)]
pub struct TokenAggregate {
    pub symbol: String,
    pub events: Vec<TradeEvent>,
    pub wallets: HashSet<String>,
    pub platforms: BTreeSet<String>,
    pub total_eth: f64,
    pub total_usd: f64,
    /// One entry per event, not per wallet: a wallet trading twice weighs
    /// twice in the consensus sum.
    pub wallet_scores: Vec<f64>,
    pub is_native: bool,
}

impl TokenAggregate {
    fn new(symbol: &str) -> Self {
        TokenAggregate {
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    fn record(&mut self, event: TradeEvent) {
        self.wallets.insert(event.wallet_address.clone());
        self.platforms.insert(event.contract_info.platform.clone());
        self.total_eth += event.eth_value;
        self.total_usd += event.usd_value;
        self.wallet_scores.push(event.wallet_score);
        self.is_native = self.is_native || event.is_native;
        self.events.push(event);
    }

    /// Weighted composite score under the given parameters.
    pub fn score(&self, params: &ScoreParams) -> f64 {
        if self.events.is_empty() || self.wallet_scores.is_empty() {
            return 0.0;
        }

        let mut value = 0.0;
        for event in &self.events {
            let quality = (MAX_WALLET_SCORE - event.wallet_score + 100.0) / 100.0;
            let mut component =
                (1.0 + event.eth_value * params.value_premultiplier).ln() * params.value_scale;
            if event.is_native {
                component *= params.native_bonus;
            }
            if params.use_venue_weights {
                component *= confidence_multiplier(event.contract_info.confidence);
                component *= venue_multiplier(event.contract_info.contract_type);
            }
            value += component * quality;
        }

        let mut consensus: f64 = self
            .wallet_scores
            .iter()
            .map(|score| (MAX_WALLET_SCORE - score + 100.0) / 100.0)
            .sum();
        if self.wallets.len() > 1 {
            consensus *= 1.0 + (self.wallets.len() as f64).ln() * CONSENSUS_FACTOR;
        }

        if value <= 0.0 || consensus <= 0.0 {
            return 0.0;
        }

        round2(value * consensus * params.network_bonus / 10.0)
    }
}

/// Per-token fold of trade events, preserving discovery order so that tied
/// scores rank in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    index: HashMap<String, usize>,
    tokens: Vec<TokenAggregate>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TradeEvent) {
        let index = *self
            .index
            .entry(event.token_symbol.clone())
            .or_insert_with(|| {
                self.tokens.push(TokenAggregate::new(&event.token_symbol));
                self.tokens.len() - 1
            });
        self.tokens[index].record(event);
    }

    pub fn merge(&mut self, events: impl IntoIterator<Item = TradeEvent>) {
        for event in events {
            self.record(event);
        }
    }

    pub fn tokens(&self) -> &[TokenAggregate] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.tokens.iter().map(|t| t.events.len()).sum()
    }

    /// Score every token and sort descending. The sort is stable, so equal
    /// scores keep discovery order.
    pub fn rank(&self, params: &ScoreParams) -> Vec<RankedToken> {
        let mut ranked: Vec<RankedToken> = self
            .tokens
            .iter()
            .map(|aggregate| RankedToken {
                symbol: aggregate.symbol.clone(),
                score: aggregate.score(params),
                event_count: aggregate.events.len(),
                wallet_count: aggregate.wallets.len(),
                total_eth: aggregate.total_eth,
                total_usd: aggregate.total_usd,
                platforms: aggregate.platforms.iter().cloned().collect(),
                is_native: aggregate.is_native,
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}

/// One row of the final ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedToken {
    pub symbol: String,
    pub score: f64,
    pub event_count: usize,
    pub wallet_count: usize,
    pub total_eth: f64,
    pub total_usd: f64,
    pub platforms: Vec<String>,
    pub is_native: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ContractInfo;

    fn event(token: &str, wallet: &str, wallet_score: f64, eth_value: f64) -> TradeEvent {
        TradeEvent {
            side: TradeSide::Buy,
            transaction_hash: "0xabc".to_string(),
            token_symbol: token.to_string(),
            amount: 1000.0,
            counterparty: "0x2626664c2603336e57b271c5c0b26f421741e481".to_string(),
            contract_info: ContractInfo {
                name: "Uniswap V3 SwapRouter".to_string(),
                platform: "Uniswap V3".to_string(),
                contract_type: ContractType::Dex,
                confidence: Confidence::High,
            },
            eth_value,
            usd_value: eth_value * 2000.0,
            wallet_address: wallet.to_string(),
            wallet_score,
            is_native: false,
            block_number: 100,
            token_contract_address: "0xfeed000000000000000000000000000000000001".to_string(),
        }
    }

    fn scored(events: Vec<TradeEvent>, params: &ScoreParams) -> f64 {
        let mut ledger = TokenLedger::new();
        ledger.merge(events);
        ledger.tokens()[0].score(params)
    }

    #[test]
    fn empty_aggregate_scores_zero() {
        let aggregate = TokenAggregate::new("FOO");
        assert_eq!(aggregate.score(&ScoreParams::buy()), 0.0);
        assert_eq!(aggregate.score(&ScoreParams::sell()), 0.0);
    }

    #[test]
    fn score_is_monotonic_in_value() {
        let params = ScoreParams::buy();
        let small = scored(vec![event("FOO", "0x1", 50.0, 0.1)], &params);
        let large = scored(vec![event("FOO", "0x1", 50.0, 1.0)], &params);
        assert!(large > small);
        assert!(small > 0.0);
    }

    #[test]
    fn better_wallets_score_higher() {
        let params = ScoreParams::buy();
        // Lower reputation score = better wallet = more weight.
        let good = scored(vec![event("FOO", "0x1", 10.0, 0.5)], &params);
        let mediocre = scored(vec![event("FOO", "0x1", 250.0, 0.5)], &params);
        assert!(good > mediocre);
    }

    #[test]
    fn consensus_bonus_rewards_distinct_wallets_sublinearly() {
        let params = ScoreParams::buy();
        // Same two events; once from a single wallet, once from two wallets.
        let single = scored(
            vec![event("FOO", "0x1", 50.0, 0.5), event("FOO", "0x1", 50.0, 0.5)],
            &params,
        );
        let pair = scored(
            vec![event("FOO", "0x1", 50.0, 0.5), event("FOO", "0x2", 50.0, 0.5)],
            &params,
        );
        assert!(pair > single);
        assert!(pair < single * 2.0);
    }

    #[test]
    fn native_bonus_applies_per_event() {
        let params = ScoreParams::buy();
        let mut native = event("AERO", "0x1", 50.0, 0.5);
        native.is_native = true;

        let plain = scored(vec![event("FOO", "0x1", 50.0, 0.5)], &params);
        let boosted = scored(vec![native], &params);
        assert!(boosted > plain);

        // One native event among plain ones must not lift the others.
        let mut native2 = event("MIX", "0x1", 50.0, 0.5);
        native2.is_native = true;
        let mixed = scored(vec![event("MIX", "0x1", 50.0, 0.5), native2], &params);

        let component = (1.0_f64 + 0.5).ln() * 10.0;
        let quality = (300.0 - 50.0 + 100.0) / 100.0;
        let value = component * quality + component * 1.3 * quality;
        let expected = round2(value * (quality * 2.0) * 1.1 / 10.0);
        assert!((mixed - expected).abs() < 1e-9);
    }

    #[test]
    fn buy_score_matches_the_composite_formula_exactly() {
        // Single event, wallet score 50, 1.0 ETH through a High/Dex venue:
        // quality = (300 - 50 + 100)/100 = 3.5
        // value   = ln(2) * 10 * 3.5
        // score   = round2(value * 3.5 * 1.1 / 10) = 9.34
        let score = scored(vec![event("FOO", "0x1", 50.0, 1.0)], &ScoreParams::buy());
        assert_eq!(score, 9.34);

        // The quality multiplier applies per event, so reputation weighs in
        // both the value term and the consensus term.
        let quality = 3.5_f64;
        let expected = round2(2.0_f64.ln() * 10.0 * quality * quality * 1.1 / 10.0);
        assert_eq!(score, expected);
    }

    #[test]
    fn sell_score_matches_the_composite_formula_exactly() {
        let mut sale = event("FOO", "0x1", 120.0, 0.05);
        sale.side = TradeSide::Sell;
        sale.contract_info.contract_type = ContractType::TelegramBot;
        sale.contract_info.confidence = Confidence::Medium;

        let score = scored(vec![sale], &ScoreParams::sell());

        let quality = (300.0_f64 - 120.0 + 100.0) / 100.0;
        let value = (1.0_f64 + 0.05 * 1000.0).ln() * 2.0 * 0.9 * 1.8 * quality;
        let expected = round2(value * quality * 1.2 / 10.0);
        assert_eq!(score, expected);
    }

    #[test]
    fn sell_venue_weights_favor_bots_over_unknowns() {
        let params = ScoreParams::sell();

        let mut bot = event("FOO", "0x1", 50.0, 0.05);
        bot.side = TradeSide::Sell;
        bot.contract_info.contract_type = ContractType::TelegramBot;
        bot.contract_info.confidence = Confidence::Medium;

        let mut unknown = event("FOO", "0x1", 50.0, 0.05);
        unknown.side = TradeSide::Sell;
        unknown.contract_info.contract_type = ContractType::Unknown;
        unknown.contract_info.confidence = Confidence::Low;

        let bot_score = scored(vec![bot], &params);
        let unknown_score = scored(vec![unknown], &params);
        assert!(bot_score > unknown_score);
    }

    #[test]
    fn rank_is_descending_and_stable_on_ties() {
        let mut ledger = TokenLedger::new();
        // AAA and BBB get identical events, CCC a bigger one.
        ledger.record(event("AAA", "0x1", 50.0, 0.5));
        ledger.record(event("BBB", "0x1", 50.0, 0.5));
        ledger.record(event("CCC", "0x1", 50.0, 2.0));

        let ranked = ledger.rank(&ScoreParams::buy());
        assert_eq!(ranked[0].symbol, "CCC");
        // Tie between AAA and BBB resolves to discovery order.
        assert_eq!(ranked[1].symbol, "AAA");
        assert_eq!(ranked[2].symbol, "BBB");
        assert_eq!(ranked[1].score, ranked[2].score);
    }

    #[test]
    fn ledger_groups_by_symbol() {
        let mut ledger = TokenLedger::new();
        ledger.record(event("FOO", "0x1", 50.0, 0.5));
        ledger.record(event("FOO", "0x2", 60.0, 0.2));
        ledger.record(event("BAR", "0x1", 50.0, 0.1));

        assert_eq!(ledger.tokens().len(), 2);
        assert_eq!(ledger.event_count(), 3);

        let foo = &ledger.tokens()[0];
        assert_eq!(foo.symbol, "FOO");
        assert_eq!(foo.wallets.len(), 2);
        assert!((foo.total_eth - 0.7).abs() < 1e-12);
        assert_eq!(foo.wallet_scores, vec![50.0, 60.0]);
    }

    #[test]
    fn scores_are_rounded_to_cents() {
        let score = scored(vec![event("FOO", "0x1", 37.0, 0.123)], &ScoreParams::buy());
        assert_eq!(score, round2(score));
    }
}
