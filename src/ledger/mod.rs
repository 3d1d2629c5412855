//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Legacy ledger (account/private-key based):
//!     account.rs (key → signer, address)
//!     → transaction.rs (build transfer, sign with generation hash)
//!     → client.rs (select node, announce)
//!     → repository.rs (REST handles of the selected node)
//!
//! New ledger (mnemonic based):
//!     wallet.rs (mnemonic → HD signer, bech32 address)
//!     → proto.rs (MsgSend, TxBody, AuthInfo, SignDoc)
//!     → rpc.rs (Tendermint JSON-RPC)
//!     → client.rs (balance, send tokens)
//! ```
//!
//! # Security Constraints
//! - Private keys and mnemonics are never logged
//! - Signing is local; only the signed payload leaves the process
//! - Announce acknowledgement is not finality

pub mod cosmos;
pub mod legacy;
pub mod types;

pub use cosmos::{CosmosClient, TokenLedger};
pub use legacy::{LegacyClient, LegacyLedger};
pub use types::{AnnounceResponse, BroadcastResult, LedgerError, LedgerResult};
