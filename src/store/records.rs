//! Typed views over store documents.

use serde::{Deserialize, Serialize};

/// A sender record, keyed by its authorization key.
///
/// Legacy senders carry a `privateKey`; new-ledger senders carry a
/// `mnemonic` and the derived `address`. Secrets are skipped by `Debug`.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SenderEntity {
    pub private_key: Option<String>,
    pub mnemonic: Option<String>,
    pub address: Option<String>,
    pub production: bool,
}

impl std::fmt::Debug for SenderEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderEntity")
            .field("has_private_key", &self.private_key.is_some())
            .field("has_mnemonic", &self.mnemonic.is_some())
            .field("address", &self.address)
            .field("production", &self.production)
            .finish()
    }
}

/// Broadcast recipient configuration with one address per environment.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RecipientConfig {
    pub production: String,
    pub staging: String,
}

impl RecipientConfig {
    /// Pick the recipient for a sender's environment flag.
    pub fn resolve(&self, production: bool) -> &str {
        if production {
            &self.production
        } else {
            &self.staging
        }
    }
}

/// Request authorization policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Client IP addresses allowed to call the relay.
    pub whitelist: Vec<String>,
    /// Accepted authorization codes.
    pub codes: Vec<String>,
}

impl AuthConfig {
    /// True if any of the forwarded addresses is whitelisted.
    pub fn allows_any_ip<'a>(&self, mut addresses: impl Iterator<Item = &'a str>) -> bool {
        addresses.any(|ip| self.whitelist.iter().any(|allowed| allowed == ip))
    }

    /// True if the authorization code is known.
    pub fn accepts_code(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recipient_resolves_by_environment() {
        let config = RecipientConfig {
            production: "ADDR1".to_string(),
            staging: "ADDR2".to_string(),
        };
        assert_eq!(config.resolve(true), "ADDR1");
        assert_eq!(config.resolve(false), "ADDR2");
    }

    #[test]
    fn test_sender_entity_defaults_to_staging() {
        let entity: SenderEntity =
            serde_json::from_value(json!({ "privateKey": "00" })).unwrap();
        assert!(!entity.production);
        assert_eq!(entity.private_key.as_deref(), Some("00"));
        assert!(entity.mnemonic.is_none());
    }

    #[test]
    fn test_sender_debug_hides_secrets() {
        let entity = SenderEntity {
            private_key: Some("deadbeef".to_string()),
            mnemonic: Some("abandon abandon".to_string()),
            ..Default::default()
        };
        let out = format!("{:?}", entity);
        assert!(!out.contains("deadbeef"));
        assert!(!out.contains("abandon"));
    }

    #[test]
    fn test_auth_config_checks() {
        let auth = AuthConfig {
            whitelist: vec!["10.0.0.1".to_string()],
            codes: vec!["code-1".to_string()],
        };
        assert!(auth.allows_any_ip(["1.1.1.1", "10.0.0.1"].into_iter()));
        assert!(!auth.allows_any_ip(["1.1.1.1"].into_iter()));
        assert!(auth.accepts_code("code-1"));
        assert!(!auth.accepts_code("code-2"));
    }
}
