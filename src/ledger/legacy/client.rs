//! Legacy ledger client: build, sign, announce.
//!
//! # Responsibilities
//! - Build a message-only transfer carrying the relayed data
//! - Sign it with the sender key and the network generation hash
//! - Announce the signed payload through a freshly selected node
//!
//! Each step fails fast and nothing is retried. No state survives a call
//! except the selector's last node.

use async_trait::async_trait;
use std::sync::Arc;

use crate::ledger::legacy::account::{LegacyAccount, LegacyAddress};
use crate::ledger::legacy::network::LegacyNetwork;
use crate::ledger::legacy::transaction::{PlainMessage, SignedTransaction, TransferTransaction};
use crate::ledger::types::{AnnounceResponse, BroadcastResult, LedgerError, LedgerResult};
use crate::load_balancer::NodeSelector;

/// Message transfers on the legacy ledger.
#[async_trait]
pub trait LegacyLedger: Send + Sync {
    /// Build, sign and announce a transfer from the holder of
    /// `private_key` to `recipient`, carrying `data` as its message.
    async fn send_transaction(
        &self,
        private_key: &str,
        recipient: &str,
        data: &serde_json::Value,
    ) -> LedgerResult<BroadcastResult>;

    /// Raw address of the account holding `private_key`.
    fn derive_address(&self, private_key: &str) -> LedgerResult<String>;
}

/// Client for the legacy ledger.
#[derive(Debug, Clone)]
pub struct LegacyClient {
    selector: Arc<NodeSelector>,
    network: Arc<LegacyNetwork>,
}

impl LegacyClient {
    pub fn new(selector: Arc<NodeSelector>, network: Arc<LegacyNetwork>) -> Self {
        Self { selector, network }
    }

    pub fn network(&self) -> &LegacyNetwork {
        &self.network
    }

    pub fn selector(&self) -> &NodeSelector {
        &self.selector
    }

    /// Parse a private key into an account on this network.
    pub fn account_from_private_key(&self, private_key: &str) -> LedgerResult<LegacyAccount> {
        LegacyAccount::from_private_key(private_key, self.network.network_type)
    }

    /// Build an unsigned transfer to `recipient` with `data` serialized as
    /// a plain message. No mosaics, zero fee.
    pub fn create_transaction(
        &self,
        recipient: &str,
        data: &serde_json::Value,
    ) -> LedgerResult<TransferTransaction> {
        let recipient = LegacyAddress::from_raw_on(recipient, self.network.network_type)?;
        let text = serde_json::to_string(data)
            .map_err(|e| LedgerError::Transaction(format!("Cannot serialize message: {}", e)))?;

        TransferTransaction::create(
            self.network.deadline(),
            recipient,
            Vec::new(),
            PlainMessage::create(text),
            self.network.network_type,
            0,
        )
    }

    pub fn sign_transaction(
        &self,
        transaction: &TransferTransaction,
        private_key: &str,
    ) -> LedgerResult<SignedTransaction> {
        let account = self.account_from_private_key(private_key)?;
        Ok(transaction.sign(&account, &self.network.generation_hash))
    }

    /// Announce through the currently selected node. The acknowledgement
    /// only means the node accepted the payload.
    pub async fn announce_transaction(
        &self,
        signed: &SignedTransaction,
    ) -> LedgerResult<AnnounceResponse> {
        let node = self.selector.select_node().await?;
        let response = node.transactions().announce(signed).await?;

        tracing::info!(
            node = %node.url(),
            hash = %signed.hash_hex(),
            signer = %signed.signer_address(),
            "Transaction announced"
        );
        Ok(response)
    }
}

#[async_trait]
impl LegacyLedger for LegacyClient {
    async fn send_transaction(
        &self,
        private_key: &str,
        recipient: &str,
        data: &serde_json::Value,
    ) -> LedgerResult<BroadcastResult> {
        let transaction = self.create_transaction(recipient, data)?;
        let signed = self.sign_transaction(&transaction, private_key)?;
        let response = self.announce_transaction(&signed).await?;
        Ok(BroadcastResult::Announced(response))
    }

    fn derive_address(&self, private_key: &str) -> LedgerResult<String> {
        Ok(self.account_from_private_key(private_key)?.address().plain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LegacyNetworkConfig;
    use crate::health::probe::{NodeHealthProbe, ProbeError};
    use url::Url;

    const TEST_PRIVATE_KEY: &str =
        "575DBB3062267EFF57C970A336EBBC8FBCFE12C5BD3ED7BC11EB0481D7704CED";

    struct EmptyDirectory;

    #[async_trait]
    impl NodeHealthProbe for EmptyDirectory {
        async fn healthy_nodes(&self) -> Result<Vec<Url>, ProbeError> {
            Ok(Vec::new())
        }
    }

    fn client() -> LegacyClient {
        let network =
            Arc::new(LegacyNetwork::from_config(&LegacyNetworkConfig::default()).unwrap());
        let selector = NodeSelector::new(
            Arc::new(EmptyDirectory),
            reqwest::Client::new(),
            network.clone(),
        );
        LegacyClient::new(Arc::new(selector), network)
    }

    fn recipient(client: &LegacyClient) -> String {
        client
            .account_from_private_key(&"22".repeat(32))
            .unwrap()
            .address()
            .plain()
    }

    #[test]
    fn test_signed_transaction_verifies() {
        let client = client();
        let data = serde_json::json!({ "kind": "visit", "id": 7 });
        let tx = client.create_transaction(&recipient(&client), &data).unwrap();
        let signed = client.sign_transaction(&tx, TEST_PRIVATE_KEY).unwrap();

        signed.verify(&client.network().generation_hash).unwrap();
        let sender = client.account_from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(signed.signer_address(), sender.address());
    }

    #[test]
    fn test_message_carries_serialized_data() {
        let client = client();
        let data = serde_json::json!({ "a": 1 });
        let tx = client.create_transaction(&recipient(&client), &data).unwrap();
        let signed = client.sign_transaction(&tx, TEST_PRIVATE_KEY).unwrap();

        let payload = signed.payload();
        let expected = [&[0u8][..], br#"{"a":1}"#].concat();
        assert!(payload.ends_with(&expected));
    }

    #[test]
    fn test_malformed_recipient_fails_build() {
        let client = client();
        let result = client.create_transaction("NOT-AN-ADDRESS", &serde_json::json!({}));
        assert!(matches!(result, Err(LedgerError::Address { .. })));
    }

    #[test]
    fn test_bad_private_key_fails_sign() {
        let client = client();
        let tx = client
            .create_transaction(&recipient(&client), &serde_json::json!({}))
            .unwrap();
        assert!(matches!(
            client.sign_transaction(&tx, "zz"),
            Err(LedgerError::Wallet(_))
        ));
    }

    #[tokio::test]
    async fn test_send_without_usable_node_fails() {
        let client = client();
        let result = client
            .send_transaction(TEST_PRIVATE_KEY, &recipient(&client), &serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(LedgerError::NoUsableNode)));
    }
}
