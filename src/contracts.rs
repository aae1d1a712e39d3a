use crate::config::Network;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Distinct hex characters an address needs before we assume it is a real
/// contract rather than an ordinary wallet.
pub const ENTROPY_CUTOFF: usize = 10;

const VANITY_FRAGMENTS: &[&str] = &["dead", "beef", "babe", "cafe"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContractType {
    Dex,
    TelegramBot,
    MevBot,
    Cex,
    P2pOtc,
    Bridge,
    Lending,
    Utility,
    CopyTrading,
    Unknown,
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContractType::Dex => "DEX",
            ContractType::TelegramBot => "TELEGRAM_BOT",
            ContractType::MevBot => "MEV_BOT",
            ContractType::Cex => "CEX",
            ContractType::P2pOtc => "P2P_OTC",
            ContractType::Bridge => "BRIDGE",
            ContractType::Lending => "LENDING",
            ContractType::Utility => "UTILITY",
            ContractType::CopyTrading => "COPY_TRADING",
            ContractType::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        };
        f.write_str(s)
    }
}

/// Attribution of a counterparty address. Type and confidence are always
/// assigned together.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractInfo {
    pub name: String,
    pub platform: String,
    pub contract_type: ContractType,
    pub confidence: Confidence,
}

/// How a platform attribution was reached; drives the confidence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformMatch {
    Exact,
    Pattern,
    BotPrefix,
    AggregatorPrefix,
    TradingBotPrefix,
    Vanity,
    Entropy,
    None,
}

impl PlatformMatch {
    /// Anything stronger than a bare entropy guess earns Medium confidence.
    fn confidence(&self) -> Confidence {
        match self {
            PlatformMatch::Exact => Confidence::High,
            PlatformMatch::Pattern
            | PlatformMatch::BotPrefix
            | PlatformMatch::AggregatorPrefix
            | PlatformMatch::TradingBotPrefix
            | PlatformMatch::Vanity => Confidence::Medium,
            PlatformMatch::Entropy | PlatformMatch::None => Confidence::Low,
        }
    }
}

struct KnownContract {
    address: &'static str,
    name: &'static str,
    contract_type: ContractType,
    platform: &'static str,
}

const fn known(
    address: &'static str,
    name: &'static str,
    contract_type: ContractType,
    platform: &'static str,
) -> KnownContract {
    KnownContract {
        address,
        name,
        contract_type,
        platform,
    }
}

const KNOWN_ETHEREUM: &[KnownContract] = &[
    // Uniswap
    known("0x7a250d5630b4cf539739df2c5dacb4c659f2488d", "Uniswap V2 Router", ContractType::Dex, "Uniswap"),
    known("0xe592427a0aece92de3edee1f18e0157c05861564", "Uniswap V3 Router", ContractType::Dex, "Uniswap"),
    known("0x68b3465833fb72a70ecdf485e0e4c7bd8665fc45", "Uniswap V3 Router 2", ContractType::Dex, "Uniswap"),
    known("0xef1c6e67703c7bd7107eed8303fbe6ec2554bf6b", "Uniswap Universal Router", ContractType::Dex, "Uniswap"),
    known("0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad", "Uniswap Universal Router 2", ContractType::Dex, "Uniswap"),
    // 1inch
    known("0x1111111254eeb25477b68fb85ed929f73a960582", "1inch V5 Router", ContractType::Dex, "1inch"),
    known("0x1111111254fb6c44bac0bed2854e76f90643097d", "1inch V4 Router", ContractType::Dex, "1inch"),
    known("0x11111112542d85b3ef69ae05771c2dccff2faa26", "1inch Limit Order Protocol", ContractType::Dex, "1inch"),
    // Aggregators and misc
    known("0x9008d19f58aabd9ed0d60971565aa8510560ab41", "CoW Protocol Settlement", ContractType::Dex, "CoW Protocol"),
    known("0xdef1c0ded9bec7f1a1670819833240f027b25eff", "0x Protocol", ContractType::Dex, "0x Protocol"),
    known("0x6131b5fae19ea4f9d964eac0408e4408b66337b5", "Kyber Network", ContractType::Dex, "Kyber Network"),
    known("0x881d40237659c251811cec9c364ef91dc08d300c", "Metamask Swap Router", ContractType::Dex, "Metamask"),
    // Telegram bots
    known("0x3328f7f4a1d1c57c35df56bbf0c9dcafca309c49", "Banana Gun Router", ContractType::TelegramBot, "Banana Gun"),
    known("0x37238dc7835c77449e5a2a96eb5f4ad0d5b0c8f9", "Banana Gun Bot", ContractType::TelegramBot, "Banana Gun"),
    known("0x80a64c6d7f12c47b7c66c5b4e20e72bc1fcd5d9e", "Maestro Bot", ContractType::TelegramBot, "Maestro Bot"),
    known("0x13f4ea83d0bd40e75c8222255bc855a974568dd4", "UniBot Router", ContractType::TelegramBot, "UniBot"),
    known("0xe3120d2c4b59dce32d0b7e4b34fe6a93e9ad6a5c", "UniBot Router V2", ContractType::TelegramBot, "UniBot"),
    known("0xef4fb24ad0916217251f553c0596f8edc630eb66", "Unknown Telegram Bot", ContractType::TelegramBot, "Unknown Telegram Bot"),
    known("0x5c7bcd6e7de5423a257d81b442095a1a6ced35c5", "Unknown Telegram Bot", ContractType::TelegramBot, "Unknown Telegram Bot"),
    known("0x111111125421ca6dc452d289314280a0f8842a65", "Unknown Telegram Bot", ContractType::TelegramBot, "Unknown Telegram Bot"),
    known("0x66a9893cc07d91d95644aedd05d03f95e1dba8af", "Popular Bot", ContractType::TelegramBot, "Popular Bot"),
    // MEV bots
    known("0x0000000000001ff3684f28c67538d4d072c22734", "MEV Bot", ContractType::MevBot, "MEV Bot"),
    known("0x000000000004444c5dc75cb358380d2e3de08a90", "MEV Bot", ContractType::MevBot, "MEV Bot"),
    // Utility
    known("0x000000000022d473030f116ddee9f6b43ac78ba3", "Permit2", ContractType::Utility, "Permit2"),
];

const KNOWN_BASE: &[KnownContract] = &[
    // Uniswap on Base
    known("0x2626664c2603336e57b271c5c0b26f421741e481", "Uniswap V3 SwapRouter", ContractType::Dex, "Uniswap V3"),
    known("0x4752ba5dbc23f44d87826276bf6fd6b1c372ad24", "Uniswap Universal Router", ContractType::Dex, "Uniswap"),
    known("0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad", "Uniswap Universal Router", ContractType::Dex, "Uniswap"),
    // Aerodrome
    known("0xcf77a3ba9a5ca399b7c97c74d54e5b1beb874e43", "Aerodrome Router", ContractType::Dex, "Aerodrome"),
    known("0x06374f57991c6ae827db5b8c5a8316c6e207e5db", "Aerodrome Factory", ContractType::Dex, "Aerodrome"),
    known("0x827922686190790b37229fd06084350e74485b72", "Aerodrome Router V2", ContractType::Dex, "Aerodrome"),
    // BaseSwap
    known("0x327df1e6de05895d2ab08513aadd9313fe505d86", "BaseSwap Router", ContractType::Dex, "BaseSwap"),
    known("0x8909dc15e40173ff4699343b6eb8132c65e18ec6", "BaseSwap Factory", ContractType::Dex, "BaseSwap"),
    // SushiSwap
    known("0x6bded42c906e69b412ca037f01db3fa68b2de1a4", "SushiSwap Router", ContractType::Dex, "SushiSwap"),
    known("0x71524b4f93c58fcbf659783284e38825f0622859", "SushiSwap V2 Router", ContractType::Dex, "SushiSwap"),
    // PancakeSwap
    known("0x678aa4bf4e210cf2166753e054d5b7c31cc7fa86", "PancakeSwap Router", ContractType::Dex, "PancakeSwap"),
    known("0x1b81d678ffb9c0263b24a97847620c99d213eb14", "PancakeSwap Smart Router", ContractType::Dex, "PancakeSwap"),
    // Aggregators
    known("0x1111111254eeb25477b68fb85ed929f73a960582", "1inch V5 Router", ContractType::Dex, "1inch"),
    known("0x1111111254fb6c44bac0bed2854e76f90643097d", "1inch V4 Router", ContractType::Dex, "1inch"),
    known("0xdef1c0ded9bec7f1a1670819833240f027b25eff", "0x Protocol", ContractType::Dex, "0x Protocol"),
    known("0x881d40237659c251811cec9c364ef91dc08d300c", "Metamask Swap Router", ContractType::Dex, "Metamask"),
    // Telegram bots on Base
    known("0x3328f7f4a1d1c57c35df56bbf0c9dcafca309c49", "Banana Gun Router", ContractType::TelegramBot, "Banana Gun"),
    known("0x37238dc7835c77449e5a2a96eb5f4ad0d5b0c8f9", "Banana Gun Bot", ContractType::TelegramBot, "Banana Gun"),
    known("0x80a64c6d7f12c47b7c66c5b4e20e72bc1fcd5d9e", "Maestro Bot", ContractType::TelegramBot, "Maestro Bot"),
    known("0x58d65748bf38b4b2b4d31bac2ba07a7b4a6ad9b9", "Base Trading Bot", ContractType::TelegramBot, "Unknown Bot"),
    known("0x7122db0ebe4eb9b434a9f2ffe6760bc03bfbd0e0", "Base MEV Bot", ContractType::TelegramBot, "MEV Bot"),
    // Utility and bridges
    known("0x000000000022d473030f116ddee9f6b43ac78ba3", "Permit2", ContractType::Utility, "Permit2"),
    known("0x4200000000000000000000000000000000000010", "Base L2 Standard Bridge", ContractType::Bridge, "Base Bridge"),
    known("0x3154cf16ccdb4c6d922629664174b904d80f2c35", "Base Portal", ContractType::Bridge, "Base Bridge"),
    // Lending
    known("0x4621b7a9c75199271f773ebd9a499dbd165c3191", "Compound Router", ContractType::Lending, "Compound"),
    known("0x46e6b214b524310239732d51387075e0e70970bf", "Seamless Protocol", ContractType::Lending, "Seamless"),
];

const PATTERNS_ETHEREUM: &[(&str, &str)] = &[
    ("7a250d5630b4cf539739df2c5dacb4c659f2488d", "Uniswap"),
    ("e592427a0aece92de3edee1f18e0157c05861564", "Uniswap"),
    ("68b3465833fb72a70ecdf485e0e4c7bd8665fc45", "Uniswap"),
    ("ef1c6e67703c7bd7107eed8303fbe6ec2554bf6b", "Uniswap"),
    ("3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad", "Uniswap"),
    ("1111111254", "1inch"),
    ("9008d19f58aabd9ed0d60971565aa8510560ab41", "CoW Protocol"),
    ("def1c0ded9bec7f1a1670819833240f027b25eff", "0x Protocol"),
];

const PATTERNS_BASE: &[(&str, &str)] = &[
    ("2626664c2603336e57b271c5c0b26f421741e481", "Uniswap"),
    ("4752ba5dbc23f44d87826276bf6fd6b1c372ad24", "Uniswap"),
    ("cf77a3ba9a5ca399b7c97c74d54e5b1beb874e43", "Aerodrome"),
    ("327df1e6de05895d2ab08513aadd9313fe505d86", "BaseSwap"),
    ("6bded42c906e69b412ca037f01db3fa68b2de1a4", "SushiSwap"),
    ("678aa4bf4e210cf2166753e054d5b7c31cc7fa86", "PancakeSwap"),
    ("1111111254", "1inch"),
];

/// Immutable per-network contract tables. Exact addresses give certainty;
/// the pattern and prefix layers exist because trading bots deploy many
/// unregistered router contracts that share address-generation conventions.
pub struct ContractDirectory {
    known: HashMap<String, ContractInfo>,
    patterns: &'static [(&'static str, &'static str)],
}

impl ContractDirectory {
    pub fn for_network(network: Network) -> Self {
        let (table, patterns) = match network {
            Network::Ethereum => (KNOWN_ETHEREUM, PATTERNS_ETHEREUM),
            Network::Base => (KNOWN_BASE, PATTERNS_BASE),
        };

        let known = table
            .iter()
            .map(|entry| {
                (
                    entry.address.to_string(),
                    ContractInfo {
                        name: entry.name.to_string(),
                        platform: entry.platform.to_string(),
                        contract_type: entry.contract_type,
                        confidence: Confidence::High,
                    },
                )
            })
            .collect();

        ContractDirectory { known, patterns }
    }

    pub fn is_known(&self, address: &str) -> bool {
        self.known.contains_key(&address.to_lowercase())
    }

    /// Best-effort platform attribution. Recall is favored over precision:
    /// misattributing an unknown bot as "Unknown Trading Contract" is fine,
    /// missing it entirely is not.
    pub fn identify_platform(&self, address: &str) -> (String, PlatformMatch) {
        let address = address.to_lowercase();

        if let Some(info) = self.known.get(&address) {
            return (info.platform.clone(), PlatformMatch::Exact);
        }

        for (fragment, platform) in self.patterns {
            if address.contains(fragment) {
                return (platform.to_string(), PlatformMatch::Pattern);
            }
        }

        if address.starts_with("0x3328") || address.starts_with("0x3723") {
            return ("Banana Gun (Possible)".to_string(), PlatformMatch::BotPrefix);
        }
        if address.starts_with("0x80a6") {
            return ("Maestro Bot (Possible)".to_string(), PlatformMatch::BotPrefix);
        }
        if address.starts_with("0x1111") && address.len() == 42 {
            return ("Unknown Aggregator".to_string(), PlatformMatch::AggregatorPrefix);
        }
        if address.starts_with("0x7777") || address.starts_with("0x3333") {
            return ("Unknown Trading Bot".to_string(), PlatformMatch::TradingBotPrefix);
        }
        if VANITY_FRAGMENTS.iter().any(|frag| address.contains(frag)) {
            return ("Possible MEV Bot".to_string(), PlatformMatch::Vanity);
        }

        if address_entropy(&address) >= ENTROPY_CUTOFF {
            ("Unknown Trading Contract".to_string(), PlatformMatch::Entropy)
        } else {
            ("Unknown Contract".to_string(), PlatformMatch::None)
        }
    }

    pub fn get_contract_info(&self, address: &str) -> ContractInfo {
        let lowered = address.to_lowercase();

        if let Some(info) = self.known.get(&lowered) {
            return info.clone();
        }

        let (platform, matched) = self.identify_platform(&lowered);

        let contract_type = if platform.contains("Bot") || platform.contains("MEV") {
            ContractType::TelegramBot
        } else if platform.contains("Aggregator") {
            ContractType::Dex
        } else {
            ContractType::Unknown
        };

        ContractInfo {
            name: format!("{platform} Contract"),
            platform,
            contract_type,
            confidence: matched.confidence(),
        }
    }
}

/// Number of distinct hex characters in the address body. Real contract
/// addresses come out of keccak and look random; a low count usually means a
/// vanity wallet or placeholder.
pub fn address_entropy(address: &str) -> usize {
    address
        .trim_start_matches("0x")
        .chars()
        .collect::<HashSet<_>>()
        .len()
}
