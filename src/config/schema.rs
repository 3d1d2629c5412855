//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.
//! Defaults carry the production constants of both ledgers so an empty
//! file yields a working mainnet relay.

use serde::{Deserialize, Serialize};

/// Root configuration for the announce relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Legacy ledger network identity and node discovery.
    pub legacy: LegacyNetworkConfig,

    /// New ledger RPC endpoint and transfer constants.
    pub cosmos: CosmosConfig,

    /// Credential store seed and document keys.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Legacy ledger configuration.
///
/// Network identity parameters are constants of the target ledger and are
/// never read from the node that ends up being selected.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LegacyNetworkConfig {
    /// Directory service used to discover healthy nodes.
    pub directory_url: String,

    /// REST port exposed by discovered nodes.
    pub node_port: u16,

    /// Network type byte (104 = main net, 152 = test net).
    pub network_type: u8,

    /// Generation hash of the network (64 hex chars).
    pub generation_hash: String,

    /// Network epoch adjustment in seconds since the Unix epoch.
    pub epoch_adjustment: u64,

    /// Deadline offset for new transactions in hours.
    pub deadline_hours: u64,

    /// Network currency.
    pub currency: CurrencyConfig,
}

impl Default for LegacyNetworkConfig {
    fn default() -> Self {
        Self {
            directory_url: "http://peers.dhealth.cloud:7903".to_string(),
            node_port: 3000,
            network_type: 104,
            generation_hash: "ED5761EA890A096C50D3F50B7C2F0CCB4B84AFC9EA870F381E84DDE36D04EF16"
                .to_string(),
            epoch_adjustment: 1616978397,
            deadline_hours: 2,
            currency: CurrencyConfig::default(),
        }
    }
}

/// Currency mosaic of the legacy network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Namespace alias (e.g. "dhealth.dhp").
    pub namespace: String,

    /// Mosaic id (16 hex chars).
    pub mosaic_id: String,

    /// Number of decimal places.
    pub divisibility: u8,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            namespace: "dhealth.dhp".to_string(),
            mosaic_id: "39E0C49FA322A459".to_string(),
            divisibility: 6,
        }
    }
}

/// New ledger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CosmosConfig {
    /// Tendermint RPC endpoint.
    pub rpc_url: String,

    /// Bech32 address prefix.
    pub address_prefix: String,

    /// HD derivation path for mnemonic-based signers.
    pub hd_path: String,

    /// Token denomination.
    pub denom: String,

    /// Minimum sender balance before a send is attempted.
    pub balance_threshold: u64,

    /// Amount sent with every relayed transfer.
    pub send_amount: u64,

    /// Fee amount paid per transfer.
    pub fee_amount: u64,

    /// Gas limit per transfer.
    pub gas_limit: u64,
}

impl Default for CosmosConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://rpc.dhealth.com:26657".to_string(),
            address_prefix: "dh".to_string(),
            hd_path: "m/44'/10111'/0'/0/0".to_string(),
            denom: "udhp".to_string(),
            balance_threshold: 1000,
            send_amount: 1,
            fee_amount: 500,
            gas_limit: 200_000,
        }
    }
}

/// Credential store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Optional JSON file used to seed the in-memory store.
    pub seed_path: Option<String>,

    /// Collection holding sender entities keyed by authorization key.
    pub entities_collection: String,

    /// Collection holding configuration documents.
    pub configs_collection: String,

    /// Config document with the IP whitelist and authorization codes.
    pub auth_key: String,

    /// Recipient config for the primary legacy route.
    pub legacy_recipient_key: String,

    /// Recipient config for the "legacy" variant route.
    pub legacy_variant_recipient_key: String,

    /// Recipient config for the new ledger route.
    pub cosmos_recipient_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_path: None,
            entities_collection: "entities".to_string(),
            configs_collection: "configs".to_string(),
            auth_key: "auth".to_string(),
            legacy_recipient_key: "broadcastRecipient".to_string(),
            legacy_variant_recipient_key: "legacyBroadcastRecipient".to_string(),
            cosmos_recipient_key: "newBroadcastRecipient".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (overridden by RUST_LOG).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "dtps_relay=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: RelayConfig = toml::from_str("").unwrap();
        assert_eq!(config.legacy.network_type, 104);
        assert_eq!(config.legacy.epoch_adjustment, 1616978397);
        assert_eq!(config.cosmos.denom, "udhp");
        assert_eq!(config.store.legacy_recipient_key, "broadcastRecipient");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [cosmos]
            balance_threshold = 6000

            [legacy]
            node_port = 3001
            "#,
        )
        .unwrap();
        assert_eq!(config.cosmos.balance_threshold, 6000);
        assert_eq!(config.cosmos.gas_limit, 200_000);
        assert_eq!(config.legacy.node_port, 3001);
        assert_eq!(config.legacy.currency.mosaic_id, "39E0C49FA322A459");
    }
}
