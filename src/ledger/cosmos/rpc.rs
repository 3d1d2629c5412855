//! Tendermint JSON-RPC over HTTP.
//!
//! # Responsibilities
//! - Wrap `status`, `abci_query` and `broadcast_tx_commit`
//! - Translate JSON-RPC errors into `LedgerError::Rpc`
//!
//! Every call is an independent HTTP request; nothing is cached.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

use crate::ledger::types::{LedgerError, LedgerResult};

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Deserialize)]
struct StatusResult {
    node_info: NodeInfo,
}

#[derive(Deserialize)]
struct NodeInfo {
    network: String,
}

#[derive(Deserialize)]
struct AbciQueryResult {
    response: AbciQueryResponse,
}

/// Result of an ABCI query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AbciQueryResponse {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
    /// Base64 encoded on the wire.
    #[serde(default)]
    pub value: Option<String>,
}

impl AbciQueryResponse {
    pub fn value_bytes(&self) -> LedgerResult<Vec<u8>> {
        match &self.value {
            Some(value) => STANDARD
                .decode(value)
                .map_err(|e| LedgerError::Decode(format!("Invalid query value: {}", e))),
            None => Ok(Vec::new()),
        }
    }
}

/// Execution result of one phase of a committed transaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxPhaseResult {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub codespace: String,
}

/// Response of `broadcast_tx_commit`.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastCommit {
    #[serde(default)]
    pub check_tx: TxPhaseResult,
    /// `tx_result` in newer CometBFT versions.
    #[serde(default, alias = "tx_result")]
    pub deliver_tx: TxPhaseResult,
    pub hash: String,
    #[serde(default)]
    pub height: String,
}

/// JSON-RPC client of one Tendermint node.
#[derive(Debug)]
pub struct TendermintRpc {
    client: Client,
    url: Url,
    next_id: AtomicU64,
}

impl TendermintRpc {
    pub fn new(client: Client, url: Url) -> Self {
        Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> LedgerResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::Decode(format!("{} ({}): {}", method, status, e)))?;

        if let Some(error) = body.error {
            return Err(LedgerError::Rpc(format!(
                "{} failed with code {}: {}{}",
                method,
                error.code,
                error.message,
                error.data.map(|d| format!(" ({})", d)).unwrap_or_default()
            )));
        }
        body.result
            .ok_or_else(|| LedgerError::Decode(format!("{}: missing result", method)))
    }

    /// Chain id reported by the node.
    pub async fn chain_id(&self) -> LedgerResult<String> {
        let status: StatusResult = self.call("status", serde_json::json!({})).await?;
        Ok(status.node_info.network)
    }

    /// Run an ABCI query at the latest height.
    pub async fn abci_query(&self, path: &str, data: &[u8]) -> LedgerResult<AbciQueryResponse> {
        let result: AbciQueryResult = self
            .call(
                "abci_query",
                serde_json::json!({
                    "path": path,
                    "data": hex::encode(data),
                    "height": "0",
                    "prove": false,
                }),
            )
            .await?;
        Ok(result.response)
    }

    /// Broadcast and wait for the transaction to be committed.
    pub async fn broadcast_tx_commit(&self, tx: &[u8]) -> LedgerResult<BroadcastCommit> {
        self.call(
            "broadcast_tx_commit",
            serde_json::json!({ "tx": STANDARD.encode(tx) }),
        )
        .await
    }
}
