use crate::analyzer::AnalysisReport;
use comfy_table::{Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use csv::Writer;
use serde_json::json;

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Table,
        }
    }
}

pub fn format_report(report: &AnalysisReport, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_report_table(report),
        OutputFormat::Json => format_report_json(report),
        OutputFormat::Csv => format_report_csv(report),
    }
}

fn format_report_table(report: &AnalysisReport) -> String {
    if report.ranked.is_empty() {
        return format!(
            "No qualifying {} events found across {} wallets on {}.",
            report.side, report.wallets_analyzed, report.network
        );
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            "Rank", "Token", "Score", "Events", "Wallets", "ETH", "USD", "Venues",
        ]);

    for (i, token) in report.ranked.iter().enumerate() {
        let symbol = if token.is_native {
            format!("{} *", token.symbol)
        } else {
            token.symbol.clone()
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(symbol),
            Cell::new(format!("{:.2}", token.score)),
            Cell::new(token.event_count),
            Cell::new(token.wallet_count),
            Cell::new(format!("{:.4}", token.total_eth)),
            Cell::new(format!("{:.2}", token.total_usd)),
            Cell::new(token.platforms.join(", ")),
        ]);
    }

    let mut summary = format!(
        "\n{} analysis on {}: {} events across {} tokens \
         ({} wallets analyzed, {} failed)",
        report.side,
        report.network,
        report.total_events,
        report.unique_tokens,
        report.wallets_analyzed,
        report.wallets_failed
    );
    if report.native_events > 0 {
        summary.push_str(&format!(", {} native-ecosystem events", report.native_events));
    }

    format!("{table}{summary}")
}

fn format_report_json(report: &AnalysisReport) -> String {
    let tokens: Vec<_> = report
        .ranked
        .iter()
        .map(|t| {
            json!({
                "symbol": t.symbol,
                "score": t.score,
                "events": t.event_count,
                "wallets": t.wallet_count,
                "total_eth": t.total_eth,
                "total_usd": t.total_usd,
                "platforms": t.platforms,
                "is_native": t.is_native,
            })
        })
        .collect();

    let venues: Vec<_> = report
        .venue_counts
        .iter()
        .map(|(venue, count)| json!({"venue": venue.to_string(), "events": count}))
        .collect();

    let output = json!({
        "side": report.side.to_string(),
        "network": report.network.to_string(),
        "wallets_analyzed": report.wallets_analyzed,
        "wallets_failed": report.wallets_failed,
        "total_events": report.total_events,
        "unique_tokens": report.unique_tokens,
        "total_eth": report.total_eth,
        "total_usd": report.total_usd,
        "venues": venues,
        "tokens": tokens,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

fn format_report_csv(report: &AnalysisReport) -> String {
    let mut wtr = Writer::from_writer(vec![]);

    let _ = wtr.write_record([
        "rank",
        "symbol",
        "score",
        "events",
        "wallets",
        "total_eth",
        "total_usd",
        "platforms",
        "is_native",
    ]);

    for (i, token) in report.ranked.iter().enumerate() {
        let _ = wtr.write_record([
            &(i + 1).to_string(),
            &token.symbol,
            &format!("{:.2}", token.score),
            &token.event_count.to_string(),
            &token.wallet_count.to_string(),
            &format!("{:.6}", token.total_eth),
            &format!("{:.2}", token.total_usd),
            &token.platforms.join("; "),
            &token.is_native.to_string(),
        ]);
    }

    String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::TradeSide;
    use crate::config::Network;
    use crate::scoring::RankedToken;
    use std::collections::BTreeMap;

    fn report() -> AnalysisReport {
        AnalysisReport {
            side: TradeSide::Buy,
            network: Network::Base,
            wallets_analyzed: 5,
            wallets_failed: 1,
            total_events: 3,
            unique_tokens: 2,
            total_eth: 1.5,
            total_usd: 3000.0,
            ranked: vec![
                RankedToken {
                    symbol: "FOO".to_string(),
                    score: 12.34,
                    event_count: 2,
                    wallet_count: 2,
                    total_eth: 1.0,
                    total_usd: 2000.0,
                    platforms: vec!["Uniswap V3".to_string()],
                    is_native: false,
                },
                RankedToken {
                    symbol: "AERO".to_string(),
                    score: 5.0,
                    event_count: 1,
                    wallet_count: 1,
                    total_eth: 0.5,
                    total_usd: 1000.0,
                    platforms: vec!["Aerodrome".to_string()],
                    is_native: true,
                },
            ],
            venue_counts: BTreeMap::new(),
            native_events: 1,
            bridge_events: 0,
        }
    }

    #[test]
    fn table_output_contains_ranked_tokens() {
        let output = format_report(&report(), &OutputFormat::Table);
        assert!(output.contains("FOO"));
        assert!(output.contains("AERO *"));
        assert!(output.contains("12.34"));
        assert!(output.contains("5 wallets analyzed, 1 failed"));
    }

    #[test]
    fn empty_report_prints_a_message_instead_of_a_table() {
        let mut empty = report();
        empty.ranked.clear();
        let output = format_report(&empty, &OutputFormat::Table);
        assert!(output.starts_with("No qualifying buy events"));
    }

    #[test]
    fn json_output_is_valid_and_ordered() {
        let output = format_report(&report(), &OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["tokens"][0]["symbol"], "FOO");
        assert_eq!(parsed["tokens"][1]["is_native"], true);
        assert_eq!(parsed["wallets_analyzed"], 5);
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let output = format_report(&report(), &OutputFormat::Csv);
        let mut lines = output.lines();
        assert!(lines.next().unwrap().starts_with("rank,symbol,score"));
        assert!(lines.next().unwrap().starts_with("1,FOO,12.34"));
        assert!(lines.next().unwrap().starts_with("2,AERO,5.00"));
    }

    #[test]
    fn format_parses_from_strings() {
        assert!(matches!(OutputFormat::from("JSON"), OutputFormat::Json));
        assert!(matches!(OutputFormat::from("csv"), OutputFormat::Csv));
        assert!(matches!(OutputFormat::from("anything"), OutputFormat::Table));
    }
}
