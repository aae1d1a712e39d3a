use serde::Deserialize;
use serde_json::Value;

/// One asset transfer as reported by `alchemy_getAssetTransfers`, decoded
/// leniently: the upstream payload occasionally carries null or non-numeric
/// value fields, and those become zero-amount transfers that the value
/// thresholds discard downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub transaction_hash: String,
    pub from_address: String,
    pub to_address: String,
    pub asset: String,
    pub amount: f64,
    pub block_number: u64,
    pub raw_contract_address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransfer {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub block_num: Option<String>,
    #[serde(default)]
    pub raw_contract: Option<RawContract>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContract {
    #[serde(default)]
    pub address: Option<String>,
}

impl RawTransfer {
    pub fn into_transfer(self) -> Transfer {
        let amount = self.value.map(coerce_amount).unwrap_or(0.0);
        let block_number = self
            .block_num
            .as_deref()
            .map(parse_hex_block)
            .unwrap_or(0);

        Transfer {
            transaction_hash: self.hash.unwrap_or_default().to_lowercase(),
            from_address: self.from.unwrap_or_default().to_lowercase(),
            to_address: self.to.unwrap_or_default().to_lowercase(),
            asset: self.asset.unwrap_or_default(),
            amount,
            block_number,
            raw_contract_address: self
                .raw_contract
                .and_then(|c| c.address)
                .unwrap_or_default()
                .to_lowercase(),
        }
    }
}

fn coerce_amount(value: Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_hex_block(block: &str) -> u64 {
    u64::from_str_radix(block.trim_start_matches("0x"), 16).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Transfer {
        serde_json::from_str::<RawTransfer>(json)
            .unwrap()
            .into_transfer()
    }

    #[test]
    fn decodes_full_transfer() {
        let transfer = decode(
            r#"{
                "hash": "0xABC",
                "from": "0xFrom",
                "to": "0xTo",
                "asset": "FOO",
                "value": 1000.5,
                "blockNum": "0x10",
                "rawContract": {"address": "0xDEAD"}
            }"#,
        );
        assert_eq!(transfer.transaction_hash, "0xabc");
        assert_eq!(transfer.asset, "FOO");
        assert_eq!(transfer.amount, 1000.5);
        assert_eq!(transfer.block_number, 16);
        assert_eq!(transfer.raw_contract_address, "0xdead");
    }

    #[test]
    fn malformed_value_becomes_zero() {
        assert_eq!(decode(r#"{"value": null}"#).amount, 0.0);
        assert_eq!(decode(r#"{"value": "not-a-number"}"#).amount, 0.0);
        assert_eq!(decode(r#"{"value": {"nested": true}}"#).amount, 0.0);
        assert_eq!(decode(r#"{}"#).amount, 0.0);
    }

    #[test]
    fn string_values_are_parsed() {
        assert_eq!(decode(r#"{"value": "12.5"}"#).amount, 12.5);
    }

    #[test]
    fn missing_block_defaults_to_zero() {
        assert_eq!(decode(r#"{"blockNum": "xyz"}"#).block_number, 0);
        assert_eq!(decode(r#"{}"#).block_number, 0);
    }
}
