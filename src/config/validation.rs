//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and formats (URLs, hashes, derivation path)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use coins_bip32::path::DerivationPath;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::ledger::legacy::transaction::MAX_DEADLINE_HOURS;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let legacy = &config.legacy;
    if url::Url::parse(&legacy.directory_url).is_err() {
        errors.push(ValidationError::new(
            "legacy.directory_url",
            format!("'{}' is not a valid URL", legacy.directory_url),
        ));
    }
    match hex::decode(&legacy.generation_hash) {
        Ok(bytes) if bytes.len() == 32 => {}
        _ => errors.push(ValidationError::new(
            "legacy.generation_hash",
            "must be 32 bytes of hex",
        )),
    }
    match hex::decode(&legacy.currency.mosaic_id) {
        Ok(bytes) if bytes.len() == 8 => {}
        _ => errors.push(ValidationError::new(
            "legacy.currency.mosaic_id",
            "must be 8 bytes of hex",
        )),
    }
    if legacy.deadline_hours == 0 || legacy.deadline_hours > MAX_DEADLINE_HOURS {
        errors.push(ValidationError::new(
            "legacy.deadline_hours",
            format!("must be between 1 and {}", MAX_DEADLINE_HOURS),
        ));
    }

    let cosmos = &config.cosmos;
    if url::Url::parse(&cosmos.rpc_url).is_err() {
        errors.push(ValidationError::new(
            "cosmos.rpc_url",
            format!("'{}' is not a valid URL", cosmos.rpc_url),
        ));
    }
    if bech32::Hrp::parse(&cosmos.address_prefix).is_err() {
        errors.push(ValidationError::new(
            "cosmos.address_prefix",
            "not a valid bech32 human readable part",
        ));
    }
    if cosmos.hd_path.parse::<DerivationPath>().is_err() {
        errors.push(ValidationError::new(
            "cosmos.hd_path",
            format!("'{}' is not a derivation path", cosmos.hd_path),
        ));
    }
    if cosmos.denom.is_empty() {
        errors.push(ValidationError::new("cosmos.denom", "must not be empty"));
    }
    if cosmos.gas_limit == 0 {
        errors.push(ValidationError::new("cosmos.gas_limit", "must be > 0"));
    }

    let store = &config.store;
    for (field, value) in [
        ("store.entities_collection", &store.entities_collection),
        ("store.configs_collection", &store.configs_collection),
        ("store.auth_key", &store.auth_key),
        ("store.legacy_recipient_key", &store.legacy_recipient_key),
        ("store.legacy_variant_recipient_key", &store.legacy_variant_recipient_key),
        ("store.cosmos_recipient_key", &store.cosmos_recipient_key),
    ] {
        if value.is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "is not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
