pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod contracts;
pub mod prices;
pub mod report;
pub mod repository;
pub mod rpc;
pub mod scoring;
pub mod tokens;
pub mod transfers;
