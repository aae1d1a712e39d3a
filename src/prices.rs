use std::collections::HashMap;

/// Price assigned to symbols missing from the table. Deliberately near-zero
/// rather than zero so unknown tokens rank last without dividing by zero.
pub const DEFAULT_PRICE_USD: f64 = 0.001;

/// Static approximate USD prices. This is not an oracle; the scores only need
/// a rough value signal, and anything unlisted is treated as near-worthless.
#[derive(Debug, Clone)]
pub struct PriceTable {
    prices: HashMap<String, f64>,
}

impl Default for PriceTable {
    fn default() -> Self {
        let table: &[(&str, f64)] = &[
            ("ETH", 2000.0),
            ("WETH", 2000.0),
            ("cbETH", 2000.0),
            ("wstETH", 2200.0),
            ("WBTC", 35000.0),
            ("cbBTC", 35000.0),
            ("tBTC", 35000.0),
            ("BTC", 35000.0),
            ("USDC", 1.0),
            ("USDbC", 1.0),
            ("USDT", 1.0),
            ("DAI", 1.0),
            ("AERO", 1.50),
            ("BALD", 0.05),
            ("TOSHI", 0.0001),
            ("BRETT", 0.15),
            ("DEGEN", 0.02),
            ("HIGHER", 0.03),
        ];

        PriceTable {
            prices: table
                .iter()
                .map(|(symbol, price)| (symbol.to_uppercase(), *price))
                .collect(),
        }
    }
}

impl PriceTable {
    pub fn new(entries: &[(&str, f64)]) -> Self {
        PriceTable {
            prices: entries
                .iter()
                .map(|(symbol, price)| (symbol.to_uppercase(), *price))
                .collect(),
        }
    }

    /// Total function: always returns a positive price.
    pub fn price_usd(&self, symbol: &str) -> f64 {
        self.prices
            .get(&symbol.to_uppercase())
            .copied()
            .unwrap_or(DEFAULT_PRICE_USD)
    }

    pub fn usd_value(&self, amount: f64, symbol: &str) -> f64 {
        amount * self.price_usd(symbol)
    }

    pub fn eth_equivalent(&self, amount: f64, symbol: &str) -> f64 {
        self.usd_value(amount, symbol) / self.price_usd("ETH")
    }

    /// ETH spent on a leg: ETH amounts pass through untouched, everything
    /// else is converted via the USD estimate.
    pub fn eth_spent(&self, amount: f64, symbol: &str) -> f64 {
        if symbol == "ETH" {
            amount
        } else {
            self.eth_equivalent(amount, symbol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_is_total_and_positive() {
        let prices = PriceTable::default();
        assert_eq!(prices.price_usd("NOPE"), DEFAULT_PRICE_USD);
        assert_eq!(prices.price_usd("eth"), 2000.0);
        assert!(prices.price_usd("") > 0.0);
    }

    #[test]
    fn eth_round_trip_is_identity() {
        let prices = PriceTable::default();
        let amount = 1.2345;
        assert!((prices.eth_equivalent(amount, "ETH") - amount).abs() < 1e-12);
    }

    #[test]
    fn eth_spent_passes_eth_through() {
        let prices = PriceTable::default();
        assert_eq!(prices.eth_spent(0.5, "ETH"), 0.5);
        // 2000 USDC ~= 1 ETH at the table rate.
        assert!((prices.eth_spent(2000.0, "USDC") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_token_converts_at_default_price() {
        let prices = PriceTable::default();
        let eth = prices.eth_spent(1000.0, "FOO");
        assert!((eth - 1000.0 * DEFAULT_PRICE_USD / 2000.0).abs() < 1e-12);
    }
}
