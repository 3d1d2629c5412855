//! Relay orchestration.
//!
//! # Ordering
//! ```text
//! authorization key present?          → else no-auth-key (nothing looked up)
//!     → sender lookup                 → else unknown-entity
//!     → [new chain] balance of the mnemonic's own address ≥ threshold
//!                                     → else insufficient-balance
//!     → recipient config lookup       → else no-config
//!     → broadcast (the only side effect)
//! ```
//!
//! Requests are not deduplicated. Two identical requests produce two
//! independent broadcasts.

use std::sync::Arc;

use crate::config::{CosmosConfig, StoreConfig};
use crate::ledger::cosmos::{Coin, TokenLedger};
use crate::ledger::legacy::LegacyLedger;
use crate::ledger::{BroadcastResult, LedgerError};
use crate::observability::metrics;
use crate::relay::error::{RelayError, Rejection};
use crate::relay::request::{LegacyVariant, RelayRequest, RequestShape};
use crate::store::{find_record, DocumentStore, RecipientConfig, SenderEntity};

/// Store keys and transfer constants used by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub entities_collection: String,
    pub configs_collection: String,
    pub legacy_recipient_key: String,
    pub legacy_variant_recipient_key: String,
    pub cosmos_recipient_key: String,
    pub denom: String,
    pub balance_threshold: u128,
    /// Sent regardless of what the caller relays.
    pub send_amount: u128,
}

impl PipelineSettings {
    pub fn from_config(store: &StoreConfig, cosmos: &CosmosConfig) -> Self {
        Self {
            entities_collection: store.entities_collection.clone(),
            configs_collection: store.configs_collection.clone(),
            legacy_recipient_key: store.legacy_recipient_key.clone(),
            legacy_variant_recipient_key: store.legacy_variant_recipient_key.clone(),
            cosmos_recipient_key: store.cosmos_recipient_key.clone(),
            denom: cosmos.denom.clone(),
            balance_threshold: cosmos.balance_threshold.into(),
            send_amount: cosmos.send_amount.into(),
        }
    }
}

/// Resolves credentials and recipients, checks preconditions and dispatches
/// to the ledger clients.
pub struct RelayPipeline {
    store: Arc<dyn DocumentStore>,
    legacy: Arc<dyn LegacyLedger>,
    tokens: Arc<dyn TokenLedger>,
    settings: PipelineSettings,
}

impl RelayPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        legacy: Arc<dyn LegacyLedger>,
        tokens: Arc<dyn TokenLedger>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            legacy,
            tokens,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Relay one request.
    pub async fn relay(&self, request: RelayRequest) -> Result<BroadcastResult, RelayError> {
        let shape = request.shape.name();
        let result = self.dispatch(request).await;

        match &result {
            Ok(_) => {
                metrics::record_outcome(shape, "broadcast");
                tracing::info!(shape, "Relay broadcast");
            }
            Err(RelayError::Rejected(rejection)) => {
                metrics::record_outcome(shape, rejection.reason());
                tracing::warn!(shape, reason = rejection.reason(), "Relay rejected");
            }
            Err(e) => {
                metrics::record_outcome(shape, e.reason());
                tracing::error!(shape, error = %e, "Relay failed");
            }
        }
        result
    }

    async fn dispatch(&self, request: RelayRequest) -> Result<BroadcastResult, RelayError> {
        let auth_key = match request.authorization {
            Some(key) if !key.is_empty() => key,
            _ => return Err(Rejection::NoAuthKey.into()),
        };

        match request.shape {
            RequestShape::NewChain { data } => self.relay_new_chain(&auth_key, &data).await,
            RequestShape::Legacy { variant, data } => {
                self.relay_legacy(&auth_key, variant, &data).await
            }
            RequestShape::PeerToPeer {
                sender_key,
                entity_key,
                data,
            } => self.relay_peer_to_peer(&sender_key, &entity_key, &data).await,
        }
    }

    async fn relay_new_chain(
        &self,
        auth_key: &str,
        data: &serde_json::Value,
    ) -> Result<BroadcastResult, RelayError> {
        let sender = self.entity(auth_key, "sender").await?;
        let mnemonic = sender
            .mnemonic
            .as_deref()
            .ok_or(Rejection::UnknownEntity { role: "sender" })?;

        // The balance gate must look at the account that will sign.
        let address = self.tokens.derive_address(mnemonic)?;
        if let Some(stored) = sender.address.as_deref() {
            if stored != address {
                tracing::warn!(
                    stored = %stored,
                    derived = %address,
                    "Stored sender address does not match its mnemonic, using derived address"
                );
            }
        }

        let funded = self
            .tokens
            .validate_balance(&address, &self.settings.denom, self.settings.balance_threshold)
            .await?;
        if !funded {
            return Err(Rejection::InsufficientBalance.into());
        }

        let config = self.recipient_config(&self.settings.cosmos_recipient_key).await?;
        let recipient = config.resolve(sender.production);

        let memo = serde_json::to_string(data)
            .map_err(|e| LedgerError::Transaction(format!("Cannot serialize memo: {}", e)))?;
        let coins = [Coin::new(self.settings.send_amount, self.settings.denom.clone())];

        Ok(self
            .tokens
            .send_tokens(mnemonic, recipient, &coins, &memo)
            .await?)
    }

    async fn relay_legacy(
        &self,
        auth_key: &str,
        variant: LegacyVariant,
        data: &serde_json::Value,
    ) -> Result<BroadcastResult, RelayError> {
        let sender = self.entity(auth_key, "sender").await?;
        let private_key = sender
            .private_key
            .as_deref()
            .ok_or(Rejection::UnknownEntity { role: "sender" })?;

        let key = match variant {
            LegacyVariant::Primary => &self.settings.legacy_recipient_key,
            LegacyVariant::Legacy => &self.settings.legacy_variant_recipient_key,
        };
        let config = self.recipient_config(key).await?;
        let recipient = config.resolve(sender.production);

        Ok(self
            .legacy
            .send_transaction(private_key, recipient, data)
            .await?)
    }

    async fn relay_peer_to_peer(
        &self,
        sender_key: &str,
        entity_key: &str,
        data: &serde_json::Value,
    ) -> Result<BroadcastResult, RelayError> {
        let (sender, entity) = tokio::try_join!(
            self.entity(sender_key, "sender"),
            self.entity(entity_key, "entity"),
        )?;

        let private_key = sender
            .private_key
            .as_deref()
            .ok_or(Rejection::UnknownEntity { role: "sender" })?;
        let entity_key = entity
            .private_key
            .as_deref()
            .ok_or(Rejection::UnknownEntity { role: "entity" })?;
        let recipient = self.legacy.derive_address(entity_key)?;

        Ok(self
            .legacy
            .send_transaction(private_key, &recipient, data)
            .await?)
    }

    async fn entity(&self, key: &str, role: &'static str) -> Result<SenderEntity, RelayError> {
        find_record::<SenderEntity>(self.store.as_ref(), &self.settings.entities_collection, key)
            .await?
            .ok_or(RelayError::Rejected(Rejection::UnknownEntity { role }))
    }

    async fn recipient_config(&self, key: &str) -> Result<RecipientConfig, RelayError> {
        find_record::<RecipientConfig>(self.store.as_ref(), &self.settings.configs_collection, key)
            .await?
            .ok_or(RelayError::Rejected(Rejection::NoConfig))
    }
}
