pub mod database;
pub mod models;
pub mod wallet_repository;

pub use database::Database;
pub use models::TrackedWallet;
pub use wallet_repository::WalletRepository;
