//! Ledger result types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// HTTP/RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Node discovery through the directory service failed.
    #[error("Node discovery failed: {0}")]
    Discovery(String),

    /// No healthy node was reported and no node was ever selected before.
    #[error("No usable node: directory reported no healthy nodes and none was selected before")]
    NoUsableNode,

    /// Invalid private key, mnemonic or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Malformed or foreign address.
    #[error("Invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    /// Transaction could not be built or encoded.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Signed payload failed verification.
    #[error("Signature verification failed: {0}")]
    Verification(String),

    /// The ledger refused the transaction before inclusion.
    #[error("Transaction rejected with code {code}: {log}")]
    Rejected { code: u32, log: String },

    /// Unexpected response shape from a node or RPC endpoint.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl LedgerError {
    pub(crate) fn address(address: &str, reason: impl Into<String>) -> Self {
        Self::Address {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        LedgerError::Rpc(e.to_string())
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Acknowledgement returned by a legacy node when a payload is announced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnounceResponse {
    pub message: String,
}

/// Outcome of a relayed broadcast, returned to the caller as-is.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BroadcastResult {
    /// Legacy ledger: the node's announce acknowledgement.
    Announced(AnnounceResponse),
    /// New ledger: hash of the delivered transaction.
    Delivered {
        #[serde(rename = "transactionHash")]
        transaction_hash: String,
    },
}
