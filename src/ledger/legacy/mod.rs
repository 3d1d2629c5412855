//! Legacy (key-based) ledger integration.

pub mod account;
pub mod client;
pub mod network;
pub mod repository;
pub mod transaction;

pub use account::{LegacyAccount, LegacyAddress, NetworkType};
pub use client::{LegacyClient, LegacyLedger};
pub use network::LegacyNetwork;
pub use transaction::{GenerationHash, SignedTransaction, TransferTransaction};
