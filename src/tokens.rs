use crate::config::Network;
use crate::prices::PriceTable;
use std::collections::HashSet;

/// Why a token was excluded from alpha analysis, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Exact match against the excluded-token set.
    Excluded,
    /// Symbol carries an LP-token marker.
    LpToken,
    /// DeFi derivative wrapper of an excluded base token (aUSDC, cDAI, ...).
    Derivative,
}

#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub symbol: String,
    pub is_interesting: bool,
    pub is_native: bool,
    pub price_usd: f64,
    pub exclusion: Option<ExclusionReason>,
}

const LP_MARKERS: &[&str] = &["-lp", "lp-", "slp", "uni-v2", "uni-lp", "aero-lp", "cake-lp"];

// Single-character wrapper prefixes plus "cb" (Coinbase-wrapped assets).
const DERIVATIVE_PREFIXES: &[&str] = &["cb", "a", "c", "y", "v", "s"];

const EXCLUDED_ETHEREUM: &[&str] = &[
    // Stablecoins
    "USDC", "USDT", "DAI", "FRAX", "BUSD", "TUSD", "GUSD", "PYUSD", "FDUSD", "USDbC", "USDP",
    "sUSD", "LUSD", "MIM", "DOLA", "VUSD", "BEAN", "USDe",
    // Stablecoin derivatives
    "sUSDe", "sDAI", "sFRAX", "aUSDC", "aUSDT", "aDAI", "cUSDC", "cUSDT", "cDAI",
    // ETH and wrapped tokens
    "ETH", "WETH", "stETH", "wstETH", "rETH", "cbETH", "frxETH", "sfrxETH", "BETH", "ankrETH",
    "swETH", "osETH",
    // Major DeFi tokens
    "AAVE", "UNI", "SUSHI", "CRV", "CVX", "BAL", "YFI", "SNX", "MKR", "COMP", "PENDLE", "LDO",
    "FXS", "OHM", "TRIBE", "FEI", "ALCX", "SPELL", "ICE",
    // Liquid staking derivatives
    "LIDO", "RPL", "ANKR", "FIS", "SD", "LSD",
    // Wrapped/bridged BTC
    "WBTC", "renBTC", "sBTC", "tBTC", "HBTC", "pBTC", "anyBTC",
    // Large caps
    "LINK", "MATIC", "AVAX", "DOT", "ADA", "SOL", "ATOM", "NEAR", "FTM", "ALGO", "XTZ", "EGLD",
    "ONE", "LUNA", "UST", "USTC",
    // Index tokens and wrappers
    "DPI", "MVI", "BED", "DATA", "GMI", "INDEX",
    // Gaming tokens that are often farmed
    "AXS", "SLP", "MANA", "SAND", "ENJ", "CHZ", "GALA", "IMX", "GODS",
    // Governance wrappers
    "veYFI", "veCRV", "veBAL", "vlCVX", "xSUSHI", "veFXS", "veOGV",
];

const EXCLUDED_BASE: &[&str] = &[
    // Stablecoins on Base
    "USDC", "USDbC", "USDT", "DAI", "DOLA", "axlUSDC", "crvUSD",
    // Wrapped tokens on Base
    "ETH", "WETH", "cbETH", "wstETH", "rETH",
    // Major bridged tokens
    "WBTC", "tBTC", "cbBTC",
    // Major DeFi tokens on Base
    "AAVE", "UNI", "SUSHI", "CRV", "CVX", "BAL", "COMP", "SNX", "PENDLE", "LDO", "FXS", "MKR",
    // Established Base ecosystem tokens
    "BALD", "TOSHI", "BRETT", "NORMIE", "DEGEN", "HIGHER", "MOCHI", "PRIME", "SEAM", "SPEC",
    "WELL", "AERO", "EXTRA",
    // LP and derivative tokens
    "AERO-LP", "UNI-LP", "SUSHI-LP", "CAKE-LP", "SPICE-LP", "aUSDC", "cUSDC", "yUSDC", "sUSDC",
    // Gaming/NFT tokens
    "MANA", "SAND", "ENJ", "AXS", "CHZ", "GALA", "IMX",
    // Governance wrappers
    "veCRV", "veBAL", "vlCVX", "xSUSHI", "veFXS",
];

const NATIVE_BASE: &[&str] = &[
    "AERO", "BALD", "TOSHI", "BRETT", "NORMIE", "DEGEN", "HIGHER", "MOCHI", "SEAM", "SPEC",
    "WELL", "EXTRA",
];

/// Immutable per-network token filter tables, injected at construction.
#[derive(Debug, Clone)]
pub struct TokenRules {
    excluded: HashSet<String>,
    native: HashSet<String>,
}

impl TokenRules {
    pub fn new(excluded: &[&str], native: &[&str]) -> Self {
        TokenRules {
            excluded: excluded.iter().map(|t| t.to_lowercase()).collect(),
            native: native.iter().map(|t| t.to_uppercase()).collect(),
        }
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Ethereum => Self::new(EXCLUDED_ETHEREUM, &[]),
            Network::Base => Self::new(EXCLUDED_BASE, NATIVE_BASE),
        }
    }
}

/// Decides which token symbols are worth tracking at all.
pub struct TokenClassifier {
    rules: TokenRules,
    prices: PriceTable,
}

impl TokenClassifier {
    pub fn new(rules: TokenRules, prices: PriceTable) -> Self {
        TokenClassifier { rules, prices }
    }

    pub fn for_network(network: Network) -> Self {
        Self::new(TokenRules::for_network(network), PriceTable::default())
    }

    pub fn is_interesting(&self, symbol: &str) -> bool {
        self.exclusion_reason(symbol).is_none() && !symbol.is_empty()
    }

    pub fn is_native(&self, symbol: &str) -> bool {
        self.rules.native.contains(&symbol.to_uppercase())
    }

    pub fn classify(&self, symbol: &str) -> TokenInfo {
        let exclusion = self.exclusion_reason(symbol);
        TokenInfo {
            symbol: symbol.to_string(),
            is_interesting: exclusion.is_none() && !symbol.is_empty(),
            is_native: self.is_native(symbol),
            price_usd: self.prices.price_usd(symbol),
            exclusion,
        }
    }

    fn exclusion_reason(&self, symbol: &str) -> Option<ExclusionReason> {
        if symbol.is_empty() {
            return None;
        }

        let lower = symbol.to_lowercase();

        if self.rules.excluded.contains(&lower) {
            return Some(ExclusionReason::Excluded);
        }

        if LP_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return Some(ExclusionReason::LpToken);
        }

        // Derivative wrappers: only meaningful on symbols long enough to carry
        // a prefix plus a real base symbol. "cb" is checked before the
        // single-character prefixes so cbXXX strips two characters.
        if lower.len() > 4 {
            for prefix in DERIVATIVE_PREFIXES {
                if let Some(base) = lower.strip_prefix(prefix) {
                    if self.rules.excluded.contains(base) {
                        return Some(ExclusionReason::Derivative);
                    }
                    break;
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_classifier() -> TokenClassifier {
        TokenClassifier::for_network(Network::Base)
    }

    #[test]
    fn excluded_tokens_are_boring_case_insensitive() {
        let classifier = base_classifier();
        for symbol in ["USDC", "usdc", "Weth", "AERO", "degen"] {
            assert!(!classifier.is_interesting(symbol), "{symbol} should be excluded");
        }
    }

    #[test]
    fn empty_symbol_fails_closed() {
        assert!(!base_classifier().is_interesting(""));
    }

    #[test]
    fn lp_markers_are_rejected() {
        let classifier = base_classifier();
        assert!(!classifier.is_interesting("FOO-LP"));
        assert!(!classifier.is_interesting("uni-v2"));
        assert_eq!(
            classifier.classify("FOO-LP").exclusion,
            Some(ExclusionReason::LpToken)
        );
    }

    #[test]
    fn derivative_wrappers_of_excluded_bases_are_rejected() {
        let classifier = TokenClassifier::for_network(Network::Ethereum);
        // yUSDT is not in the excluded set itself; it is caught by the
        // derivative rule (prefix y + excluded base usdt).
        let info = classifier.classify("yUSDT");
        assert!(!info.is_interesting);
        assert_eq!(info.exclusion, Some(ExclusionReason::Derivative));

        // Short symbols never trip the derivative rule.
        assert!(classifier.is_interesting("yUSD"));
    }

    #[test]
    fn exclusion_priority_prefers_exact_match() {
        let classifier = base_classifier();
        // aUSDC is both in the excluded set and a derivative pattern; the
        // exact match wins.
        assert_eq!(
            classifier.classify("aUSDC").exclusion,
            Some(ExclusionReason::Excluded)
        );
    }

    #[test]
    fn native_tokens_only_on_base() {
        assert!(base_classifier().is_native("aero"));
        assert!(!base_classifier().is_native("FOO"));
        assert!(!TokenClassifier::for_network(Network::Ethereum).is_native("AERO"));
    }

    #[test]
    fn unknown_symbols_are_interesting() {
        let info = base_classifier().classify("FOO");
        assert!(info.is_interesting);
        assert!(!info.is_native);
        assert!(info.exclusion.is_none());
    }
}
