use crate::transfers::RawTransfer;
use alloy::providers::fillers::FillProvider;
use alloy::providers::{Provider, ProviderBuilder};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;
use tokio::time::timeout;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::warn;

type AlloyFullProvider = FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        alloy::providers::fillers::JoinFill<
            alloy::providers::fillers::GasFiller,
            alloy::providers::fillers::JoinFill<
                alloy::providers::fillers::BlobGasFiller,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::NonceFiller,
                    alloy::providers::fillers::ChainIdFiller,
                >,
            >,
        >,
    >,
    alloy::providers::RootProvider,
>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: usize = 3;

/// Transfer direction requested from the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Parameters for `alchemy_getAssetTransfers`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    pub from_block: String,
    pub to_block: String,
    pub category: Vec<String>,
    pub with_metadata: bool,
    pub exclude_zero_value: bool,
    pub max_count: String,
}

impl TransferParams {
    pub fn new(
        address: &str,
        direction: Direction,
        block_range: (u64, u64),
        categories: &[&str],
    ) -> Self {
        let (from_address, to_address) = match direction {
            Direction::Outgoing => (Some(address.to_string()), None),
            Direction::Incoming => (None, Some(address.to_string())),
        };

        TransferParams {
            from_address,
            to_address,
            from_block: format!("{:#x}", block_range.0),
            to_block: format!("{:#x}", block_range.1),
            category: categories.iter().map(|c| c.to_string()).collect(),
            with_metadata: true,
            exclude_zero_value: true,
            // 100 transfers per direction, matching the reference tracker.
            max_count: "0x64".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransfersResponse {
    #[serde(default)]
    transfers: Vec<RawTransfer>,
}

/// Thin Alchemy JSON-RPC client: one endpoint, bounded retries with jittered
/// exponential backoff and a per-request timeout.
#[derive(Clone)]
pub struct AlchemyClient {
    provider: AlloyFullProvider,
    url: String,
}

impl AlchemyClient {
    pub fn new(url: &str) -> Result<Self> {
        let parsed_url = url
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid RPC URL: {}", url))?;
        let provider: AlloyFullProvider = ProviderBuilder::new().connect_http(parsed_url);

        Ok(AlchemyClient {
            provider,
            url: url.to_string(),
        })
    }

    fn retry_strategy() -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .factor(2)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(MAX_RETRIES)
    }

    pub async fn get_latest_block(&self) -> Result<u64> {
        let client = self.clone();
        Retry::spawn(Self::retry_strategy(), move || {
            let client = client.clone();
            async move {
                match timeout(REQUEST_TIMEOUT, client.provider.get_block_number()).await {
                    Ok(Ok(block_number)) => Ok(block_number),
                    Ok(Err(e)) => {
                        warn!("RPC error on {}: {}", client.url, e);
                        Err(anyhow::anyhow!("{}", e))
                    }
                    Err(_) => Err(client.timeout_error()),
                }
            }
        })
        .await
    }

    pub async fn get_asset_transfers(&self, params: TransferParams) -> Result<Vec<RawTransfer>> {
        let client = self.clone();
        Retry::spawn(Self::retry_strategy(), move || {
            let client = client.clone();
            let params = params.clone();
            async move {
                let request = client.provider.raw_request::<_, TransfersResponse>(
                    Cow::Borrowed("alchemy_getAssetTransfers"),
                    (params,),
                );

                match timeout(REQUEST_TIMEOUT, request).await {
                    Ok(Ok(response)) => Ok(response.transfers),
                    Ok(Err(e)) => {
                        warn!("RPC error on {}: {}", client.url, e);
                        Err(anyhow::anyhow!("{}", e))
                    }
                    Err(_) => Err(client.timeout_error()),
                }
            }
        })
        .await
    }

    fn timeout_error(&self) -> anyhow::Error {
        warn!(
            "Request timeout after {} seconds on {}",
            REQUEST_TIMEOUT.as_secs(),
            self.url
        );
        anyhow::anyhow!("Request timeout after {} seconds", REQUEST_TIMEOUT.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_params_serialize_with_alchemy_field_names() {
        let params = TransferParams::new(
            "0xabc",
            Direction::Outgoing,
            (16, 255),
            &["external", "erc20"],
        );
        let json = serde_json::to_value(&params).unwrap();

        assert_eq!(json["fromAddress"], "0xabc");
        assert!(json.get("toAddress").is_none());
        assert_eq!(json["fromBlock"], "0x10");
        assert_eq!(json["toBlock"], "0xff");
        assert_eq!(json["category"][1], "erc20");
        assert_eq!(json["excludeZeroValue"], true);
        assert_eq!(json["maxCount"], "0x64");
    }

    #[test]
    fn incoming_direction_sets_to_address() {
        let params = TransferParams::new("0xabc", Direction::Incoming, (0, 1), &["erc20"]);
        assert!(params.from_address.is_none());
        assert_eq!(params.to_address.as_deref(), Some("0xabc"));
    }

    #[test]
    fn transfers_response_tolerates_missing_fields() {
        let response: TransfersResponse =
            serde_json::from_str(r#"{"transfers": [{"hash": "0x1"}], "pageKey": "x"}"#).unwrap();
        assert_eq!(response.transfers.len(), 1);

        let empty: TransfersResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.transfers.is_empty());
    }
}
