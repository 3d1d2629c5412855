//! New (mnemonic-based) ledger integration.

pub mod client;
pub mod proto;
pub mod rpc;
pub mod tx;
pub mod wallet;

pub use client::{CosmosClient, TokenLedger};
pub use proto::Coin;
pub use wallet::CosmosWallet;
