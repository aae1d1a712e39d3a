use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;

/// Networks the tracker understands. Every heuristic table is keyed by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Ethereum,
    Base,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Base => "base",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Base => 8453,
        }
    }

    /// Fixed blocks-per-day constant used to resolve recent block ranges.
    /// Ethereum has ~12s blocks, Base ~2s blocks.
    pub fn blocks_per_day(&self) -> u64 {
        match self {
            Network::Ethereum => 7_200,
            Network::Base => 43_200,
        }
    }

    /// Minimum qualifying trade value in ETH equivalent. Base runs looser
    /// because gas is cheap enough that small trades are still intentional.
    pub fn min_eth_value(&self) -> f64 {
        match self {
            Network::Ethereum => 0.05,
            Network::Base => 0.01,
        }
    }

    pub fn alchemy_url(&self, api_key: &str) -> String {
        match self {
            Network::Ethereum => format!("https://eth-mainnet.g.alchemy.com/v2/{api_key}"),
            Network::Base => format!("https://base-mainnet.g.alchemy.com/v2/{api_key}"),
        }
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ethereum" | "eth" | "mainnet" => Ok(Network::Ethereum),
            "base" => Ok(Network::Base),
            other => Err(anyhow::anyhow!("Unsupported network: {}", other)),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub alchemy_api_key: String,
    pub database_url: String,
    pub network: Network,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let alchemy_api_key =
            std::env::var("ALCHEMY_API_KEY").context("ALCHEMY_API_KEY must be set in .env")?;

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "./alpha_tracker.db".to_string());

        let network = std::env::var("NETWORK")
            .unwrap_or_else(|_| "base".to_string())
            .parse::<Network>()
            .context("Invalid NETWORK value")?;

        Ok(Config {
            alchemy_api_key,
            database_url,
            network,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parses_aliases() {
        assert_eq!("eth".parse::<Network>().unwrap(), Network::Ethereum);
        assert_eq!("Base".parse::<Network>().unwrap(), Network::Base);
        assert!("solana".parse::<Network>().is_err());
    }

    #[test]
    fn network_parameters() {
        assert_eq!(Network::Ethereum.blocks_per_day(), 7_200);
        assert_eq!(Network::Base.blocks_per_day(), 43_200);
        assert!(Network::Base.min_eth_value() < Network::Ethereum.min_eth_value());
        assert_eq!(Network::Base.chain_id(), 8453);
    }
}
