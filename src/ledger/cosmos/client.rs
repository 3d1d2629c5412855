//! New ledger client: balances and token transfers.
//!
//! # Responsibilities
//! - Query balances and accounts through ABCI queries
//! - Derive the sender from a mnemonic, sign and broadcast a bank send
//!
//! The client does not enforce the balance precondition; callers check
//! `validate_balance` before `send_tokens`.

use async_trait::async_trait;
use prost::Message;
use reqwest::Client;
use url::Url;

use crate::config::CosmosConfig;
use crate::ledger::cosmos::proto::{
    BaseAccount, Coin, QueryAccountRequest, QueryAccountResponse, QueryBalanceRequest,
    QueryBalanceResponse, ACCOUNT_QUERY_PATH, BALANCE_QUERY_PATH, BASE_ACCOUNT_TYPE_URL,
};
use crate::ledger::cosmos::rpc::TendermintRpc;
use crate::ledger::cosmos::tx::{SendTx, SignerState};
use crate::ledger::cosmos::wallet::{decode_address, CosmosWallet};
use crate::ledger::types::{BroadcastResult, LedgerError, LedgerResult};

/// Token operations on the new ledger.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Current balance of `denom` held by `address`. Zero when absent.
    async fn get_balance(&self, address: &str, denom: &str) -> LedgerResult<Coin>;

    /// Address of the signer derived from `mnemonic`. No network access.
    fn derive_address(&self, mnemonic: &str) -> LedgerResult<String>;

    /// Whether `address` holds at least `threshold` of `denom`.
    async fn validate_balance(
        &self,
        address: &str,
        denom: &str,
        threshold: u128,
    ) -> LedgerResult<bool> {
        let balance = self.get_balance(address, denom).await?;
        Ok(balance.amount_value()? >= threshold)
    }

    /// Sign with the key derived from `mnemonic` and broadcast a transfer of
    /// `coins` to `recipient`. Only the transaction hash is returned.
    async fn send_tokens(
        &self,
        mnemonic: &str,
        recipient: &str,
        coins: &[Coin],
        memo: &str,
    ) -> LedgerResult<BroadcastResult>;
}

/// Client for the new ledger.
#[derive(Debug)]
pub struct CosmosClient {
    rpc: TendermintRpc,
    config: CosmosConfig,
}

impl CosmosClient {
    pub fn new(client: Client, config: &CosmosConfig) -> LedgerResult<Self> {
        let url = Url::parse(&config.rpc_url)
            .map_err(|e| LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e)))?;
        Ok(Self {
            rpc: TendermintRpc::new(client, url),
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &CosmosConfig {
        &self.config
    }

    pub async fn chain_id(&self) -> LedgerResult<String> {
        self.rpc.chain_id().await
    }

    /// Derive the signer for `mnemonic` with the configured path and prefix.
    pub fn wallet(&self, mnemonic: &str) -> LedgerResult<CosmosWallet> {
        CosmosWallet::from_mnemonic(mnemonic, &self.config.hd_path, &self.config.address_prefix)
    }

    /// Whether `address` is a well-formed address of this network.
    pub fn validate_address(&self, address: &str) -> bool {
        !address.is_empty() && decode_address(address, &self.config.address_prefix).is_ok()
    }

    /// Account document of `address`, `None` when the chain does not know it.
    pub async fn get_account(&self, address: &str) -> LedgerResult<Option<BaseAccount>> {
        let request = QueryAccountRequest {
            address: address.to_string(),
        };
        let response = self
            .rpc
            .abci_query(ACCOUNT_QUERY_PATH, &request.encode_to_vec())
            .await?;

        if response.code != 0 {
            if response.log.contains("not found") {
                return Ok(None);
            }
            return Err(LedgerError::Rpc(format!(
                "Account query failed with code {}: {}",
                response.code, response.log
            )));
        }

        let decoded = QueryAccountResponse::decode(response.value_bytes()?.as_slice())
            .map_err(|e| LedgerError::Decode(format!("Account response: {}", e)))?;
        let Some(account) = decoded.account else {
            return Ok(None);
        };
        if account.type_url != BASE_ACCOUNT_TYPE_URL {
            return Err(LedgerError::Decode(format!(
                "Unsupported account type {}",
                account.type_url
            )));
        }
        let account = BaseAccount::decode(account.value.as_slice())
            .map_err(|e| LedgerError::Decode(format!("Base account: {}", e)))?;
        Ok(Some(account))
    }

    /// Fixed fee of every relayed send.
    fn fee(&self) -> Vec<Coin> {
        vec![Coin::new(self.config.fee_amount.into(), self.config.denom.clone())]
    }
}

#[async_trait]
impl TokenLedger for CosmosClient {
    async fn get_balance(&self, address: &str, denom: &str) -> LedgerResult<Coin> {
        let request = QueryBalanceRequest {
            address: address.to_string(),
            denom: denom.to_string(),
        };
        let response = self
            .rpc
            .abci_query(BALANCE_QUERY_PATH, &request.encode_to_vec())
            .await?;
        if response.code != 0 {
            return Err(LedgerError::Rpc(format!(
                "Balance query failed with code {}: {}",
                response.code, response.log
            )));
        }

        let decoded = QueryBalanceResponse::decode(response.value_bytes()?.as_slice())
            .map_err(|e| LedgerError::Decode(format!("Balance response: {}", e)))?;
        Ok(decoded.balance.unwrap_or_else(|| Coin::new(0, denom)))
    }

    fn derive_address(&self, mnemonic: &str) -> LedgerResult<String> {
        Ok(self.wallet(mnemonic)?.address().to_string())
    }

    async fn send_tokens(
        &self,
        mnemonic: &str,
        recipient: &str,
        coins: &[Coin],
        memo: &str,
    ) -> LedgerResult<BroadcastResult> {
        let wallet = self.wallet(mnemonic)?;
        decode_address(recipient, &self.config.address_prefix)?;

        let account = self.get_account(wallet.address()).await?.ok_or_else(|| {
            LedgerError::Transaction(format!("Account {} does not exist on chain", wallet.address()))
        })?;
        let chain_id = self.rpc.chain_id().await?;

        let tx = SendTx {
            recipient: recipient.to_string(),
            amount: coins.to_vec(),
            fee: self.fee(),
            gas_limit: self.config.gas_limit,
            memo: memo.to_string(),
        };
        let raw = tx.sign(
            &wallet,
            &chain_id,
            SignerState {
                account_number: account.account_number,
                sequence: account.sequence,
            },
        );

        let commit = self.rpc.broadcast_tx_commit(&raw).await?;
        if commit.check_tx.code != 0 {
            return Err(LedgerError::Rejected {
                code: commit.check_tx.code,
                log: commit.check_tx.log,
            });
        }
        if commit.deliver_tx.code != 0 {
            return Err(LedgerError::Rejected {
                code: commit.deliver_tx.code,
                log: commit.deliver_tx.log,
            });
        }

        tracing::info!(
            sender = %wallet.address(),
            recipient = %recipient,
            hash = %commit.hash,
            height = %commit.height,
            "Tokens sent"
        );
        Ok(BroadcastResult::Delivered {
            transaction_hash: commit.hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn client() -> CosmosClient {
        CosmosClient::new(Client::new(), &CosmosConfig::default()).unwrap()
    }

    #[test]
    fn test_validate_address() {
        let client = client();
        let wallet = client.wallet(MNEMONIC).unwrap();
        assert!(client.validate_address(wallet.address()));
        assert!(!client.validate_address(""));
        assert!(!client.validate_address("cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4"));
    }

    #[test]
    fn test_derive_address_matches_signer() {
        let client = client();
        let address = client.derive_address(MNEMONIC).unwrap();
        assert_eq!(address, "dh1ds89ec723nqng6qakzxgvljfxqs8rzxgr67mww");
        assert_eq!(address, client.wallet(MNEMONIC).unwrap().address());
        assert!(client.derive_address("not a mnemonic").is_err());
    }

    #[test]
    fn test_fixed_fee() {
        assert_eq!(client().fee(), vec![Coin::new(500, "udhp")]);
    }

    #[test]
    fn test_invalid_rpc_url() {
        let config = CosmosConfig {
            rpc_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(CosmosClient::new(Client::new(), &config).is_err());
    }

    #[tokio::test]
    async fn test_send_rejects_bad_recipient_before_network() {
        // Unroutable RPC: any network call would fail with Rpc instead
        let result = client()
            .send_tokens(MNEMONIC, "not-bech32", &[Coin::new(1, "udhp")], "")
            .await;
        assert!(matches!(result, Err(LedgerError::Address { .. })));
    }
}
