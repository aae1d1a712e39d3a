use super::models::TrackedWallet;
use crate::config::Network;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use rusqlite::params;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

pub struct WalletRepository<'a> {
    conn: &'a rusqlite::Connection,
}

#[derive(Debug, Deserialize)]
struct WalletRow {
    address: String,
    score: f64,
}

impl<'a> WalletRepository<'a> {
    const UPSERT_WALLET: &'static str =
        "INSERT INTO smart_wallets (address, score, network) VALUES (?1, ?2, ?3)
         ON CONFLICT(address) DO UPDATE SET score = ?2, network = ?3";

    // Lower score = better trader, so ascending order yields the best first.
    const TOP_WALLETS: &'static str =
        "SELECT address, score FROM smart_wallets WHERE network = ?1
         ORDER BY score ASC LIMIT ?2";

    const COUNT_WALLETS: &'static str =
        "SELECT COUNT(*) FROM smart_wallets WHERE network = ?1";

    pub fn new(conn: &'a rusqlite::Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, wallet: &TrackedWallet, network: Network) -> Result<()> {
        self.conn.execute(
            Self::UPSERT_WALLET,
            params![
                format!("{:?}", wallet.address),
                wallet.score,
                network.as_str()
            ],
        )?;
        Ok(())
    }

    pub fn top_wallets(&self, network: Network, limit: usize) -> Result<Vec<TrackedWallet>> {
        let mut stmt = self.conn.prepare(Self::TOP_WALLETS)?;
        let rows = stmt.query_map(params![network.as_str(), limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut wallets = Vec::new();
        for row in rows {
            let (address, score) = row?;
            let address = Address::from_str(&address)
                .with_context(|| format!("Invalid wallet address in database: {}", address))?;
            wallets.push(TrackedWallet { address, score });
        }
        Ok(wallets)
    }

    pub fn count(&self, network: Network) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row(Self::COUNT_WALLETS, params![network.as_str()], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }

    /// Import wallets from a CSV file with `address,score` columns. Returns
    /// the number of imported rows.
    pub fn import_csv(&self, path: &Path, network: Network) -> Result<usize> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

        let mut imported = 0;
        for record in reader.deserialize::<WalletRow>() {
            let row = record.context("Malformed CSV row")?;
            let address = Address::from_str(row.address.trim())
                .with_context(|| format!("Invalid address in CSV: {}", row.address))?;
            self.insert(
                &TrackedWallet {
                    address,
                    score: row.score,
                },
                network,
            )?;
            imported += 1;
        }
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Database;

    fn wallet(hex: &str, score: f64) -> TrackedWallet {
        TrackedWallet {
            address: Address::from_str(hex).unwrap(),
            score,
        }
    }

    #[test]
    fn top_wallets_orders_by_score_ascending() {
        let db = Database::new(":memory:").unwrap();
        let repo = WalletRepository::new(&db.conn);

        repo.insert(
            &wallet("0x1000000000000000000000000000000000000001", 120.0),
            Network::Base,
        )
        .unwrap();
        repo.insert(
            &wallet("0x1000000000000000000000000000000000000002", 15.0),
            Network::Base,
        )
        .unwrap();
        repo.insert(
            &wallet("0x1000000000000000000000000000000000000003", 60.0),
            Network::Base,
        )
        .unwrap();

        let top = repo.top_wallets(Network::Base, 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].score, 15.0);
        assert_eq!(top[1].score, 60.0);
    }

    #[test]
    fn wallets_are_scoped_to_network() {
        let db = Database::new(":memory:").unwrap();
        let repo = WalletRepository::new(&db.conn);

        repo.insert(
            &wallet("0x1000000000000000000000000000000000000001", 50.0),
            Network::Ethereum,
        )
        .unwrap();

        assert!(repo.top_wallets(Network::Base, 10).unwrap().is_empty());
        assert_eq!(repo.count(Network::Ethereum).unwrap(), 1);
    }

    #[test]
    fn insert_is_an_upsert() {
        let db = Database::new(":memory:").unwrap();
        let repo = WalletRepository::new(&db.conn);
        let addr = "0x1000000000000000000000000000000000000001";

        repo.insert(&wallet(addr, 50.0), Network::Base).unwrap();
        repo.insert(&wallet(addr, 25.0), Network::Base).unwrap();

        let top = repo.top_wallets(Network::Base, 10).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].score, 25.0);
    }

    #[test]
    fn import_csv_loads_rows() {
        let db = Database::new(":memory:").unwrap();
        let repo = WalletRepository::new(&db.conn);

        let dir = std::env::temp_dir();
        let path = dir.join("alpha_tracker_wallets_test.csv");
        std::fs::write(
            &path,
            "address,score\n0x1000000000000000000000000000000000000001,42.5\n0x1000000000000000000000000000000000000002,10.0\n",
        )
        .unwrap();

        let imported = repo.import_csv(&path, Network::Base).unwrap();
        assert_eq!(imported, 2);
        assert_eq!(repo.count(Network::Base).unwrap(), 2);

        std::fs::remove_file(&path).ok();
    }
}
