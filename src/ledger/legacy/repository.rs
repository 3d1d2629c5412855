//! REST repositories of a legacy ledger node.
//!
//! # Responsibilities
//! - Announce signed payloads (`PUT /transactions`)
//! - Read transaction status, accounts, blocks, chain info and node health
//!
//! Every repository shares one `reqwest::Client` and the node base URL of
//! the `NodeCandidate` that created it.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ledger::legacy::account::LegacyAddress;
use crate::ledger::legacy::transaction::SignedTransaction;
use crate::ledger::types::{AnnounceResponse, LedgerError, LedgerResult};

#[derive(Debug, Clone)]
struct Endpoint {
    client: Client,
    base: Url,
}

impl Endpoint {
    fn url(&self, path: &str) -> LedgerResult<Url> {
        self.base
            .join(path)
            .map_err(|e| LedgerError::Rpc(format!("Invalid node path '{}': {}", path, e)))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> LedgerResult<T> {
        let response = self.client.get(self.url(path)?).send().await?;
        decode(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> LedgerResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LedgerError::Rpc(format!("Node returned {}: {}", status, body)));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| LedgerError::Decode(e.to_string()))
}

/// Factory for the per-node repositories.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    endpoint: Endpoint,
}

impl RepositoryFactory {
    pub fn new(client: Client, base: Url) -> Self {
        Self {
            endpoint: Endpoint { client, base },
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.endpoint.base
    }

    pub fn create_transaction_repository(&self) -> TransactionRepository {
        TransactionRepository(self.endpoint.clone())
    }

    pub fn create_account_repository(&self) -> AccountRepository {
        AccountRepository(self.endpoint.clone())
    }

    pub fn create_block_repository(&self) -> BlockRepository {
        BlockRepository(self.endpoint.clone())
    }

    pub fn create_chain_repository(&self) -> ChainRepository {
        ChainRepository(self.endpoint.clone())
    }

    pub fn create_node_repository(&self) -> NodeRepository {
        NodeRepository(self.endpoint.clone())
    }
}

#[derive(Serialize)]
struct AnnounceRequest {
    payload: String,
}

/// Transaction submission and status.
#[derive(Debug, Clone)]
pub struct TransactionRepository(Endpoint);

/// Status of a transaction known to a node.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TransactionStatus {
    pub group: String,
    pub code: String,
    pub hash: String,
    #[serde(default)]
    pub height: Option<String>,
}

impl TransactionRepository {
    /// Submit a signed payload for relay. Success only means the node
    /// accepted the payload.
    pub async fn announce(&self, signed: &SignedTransaction) -> LedgerResult<AnnounceResponse> {
        let response = self
            .0
            .client
            .put(self.0.url("transactions")?)
            .json(&AnnounceRequest {
                payload: signed.payload_hex(),
            })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn status(&self, hash: &str) -> LedgerResult<TransactionStatus> {
        self.0.get_json(&format!("transactionStatus/{}", hash)).await
    }
}

/// Account lookups.
#[derive(Debug, Clone)]
pub struct AccountRepository(Endpoint);

/// A mosaic balance held by an account.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MosaicBalance {
    pub id: String,
    pub amount: String,
}

/// Subset of the account document returned by a node.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub address: String,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub mosaics: Vec<MosaicBalance>,
}

impl AccountInfo {
    /// Absolute amount held of `mosaic_id`, zero when absent.
    pub fn balance_of(&self, mosaic_id: &str) -> u64 {
        self.mosaics
            .iter()
            .find(|m| m.id.eq_ignore_ascii_case(mosaic_id))
            .and_then(|m| m.amount.parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Deserialize)]
struct AccountEnvelope {
    account: AccountInfo,
}

impl AccountRepository {
    pub async fn account_info(&self, address: &LegacyAddress) -> LedgerResult<AccountInfo> {
        let envelope: AccountEnvelope = self
            .0
            .get_json(&format!("accounts/{}", address.plain()))
            .await?;
        Ok(envelope.account)
    }
}

/// Block lookups.
#[derive(Debug, Clone)]
pub struct BlockRepository(Endpoint);

impl BlockRepository {
    /// Raw block document at `height`.
    pub async fn block(&self, height: u64) -> LedgerResult<serde_json::Value> {
        self.0.get_json(&format!("blocks/{}", height)).await
    }
}

/// Chain state.
#[derive(Debug, Clone)]
pub struct ChainRepository(Endpoint);

/// Chain height information reported by a node.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChainInfo {
    pub height: String,
    #[serde(rename = "latestFinalizedBlock", default)]
    pub latest_finalized_block: Option<FinalizedBlock>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FinalizedBlock {
    pub height: String,
}

impl ChainRepository {
    pub async fn info(&self) -> LedgerResult<ChainInfo> {
        self.0.get_json("chain/info").await
    }
}

/// Node state.
#[derive(Debug, Clone)]
pub struct NodeRepository(Endpoint);

/// Health flags reported by a node.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeHealth {
    pub api_node: String,
    pub db: String,
}

impl NodeHealth {
    pub fn is_up(&self) -> bool {
        self.api_node == "up" && self.db == "up"
    }
}

#[derive(Deserialize)]
struct NodeHealthEnvelope {
    status: NodeHealth,
}

impl NodeRepository {
    pub async fn health(&self) -> LedgerResult<NodeHealth> {
        let envelope: NodeHealthEnvelope = self.0.get_json("node/health").await?;
        Ok(envelope.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_of() {
        let info: AccountInfo = serde_json::from_value(serde_json::json!({
            "address": "68AB",
            "mosaics": [
                { "id": "39E0C49FA322A459", "amount": "1500000" },
                { "id": "0000000000000001", "amount": "7" }
            ]
        }))
        .unwrap();
        assert_eq!(info.balance_of("39e0c49fa322a459"), 1_500_000);
        assert_eq!(info.balance_of("FFFFFFFFFFFFFFFF"), 0);
    }

    #[test]
    fn test_node_health_flags() {
        let health = NodeHealth {
            api_node: "up".to_string(),
            db: "down".to_string(),
        };
        assert!(!health.is_up());
    }

    #[test]
    fn test_paths_resolve_against_base() {
        let factory = RepositoryFactory::new(
            Client::new(),
            Url::parse("http://node.example:3000/").unwrap(),
        );
        let url = factory.endpoint.url("transactions").unwrap();
        assert_eq!(url.as_str(), "http://node.example:3000/transactions");
    }
}
