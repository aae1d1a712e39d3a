use alloy_primitives::Address;

/// A wallet on the watchlist. Lower reputation score means a better trader.
#[derive(Debug, Clone)]
pub struct TrackedWallet {
    pub address: Address,
    pub score: f64,
}
