//! Mnemonic-derived secp256k1 signer and bech32 addresses.
//!
//! # Security
//! - The mnemonic is only used to derive the key and is not retained
//! - `Debug` output never includes key material

use bech32::{Bech32, Hrp};
use bip39::{Language, Mnemonic};
use coins_bip32::path::DerivationPath;
use coins_bip32::prelude::*;
use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::ledger::types::{LedgerError, LedgerResult};

/// A signing identity on the new ledger.
#[derive(Clone)]
pub struct CosmosWallet {
    signing_key: SigningKey,
    public_key: [u8; 33],
    address: String,
}

impl CosmosWallet {
    /// Derive the signer at `hd_path` from an English BIP39 mnemonic.
    pub fn from_mnemonic(mnemonic: &str, hd_path: &str, prefix: &str) -> LedgerResult<Self> {
        let mnemonic = Mnemonic::parse_in(Language::English, mnemonic.trim())
            .map_err(|e| LedgerError::Wallet(format!("Invalid mnemonic: {}", e)))?;
        let seed = mnemonic.to_seed("");

        let derivation_path = hd_path
            .parse::<DerivationPath>()
            .map_err(|e| LedgerError::Wallet(format!("Invalid derivation path: {}", e)))?;
        let master_key = XPriv::root_from_seed(&seed, None)
            .map_err(|e| LedgerError::Wallet(format!("Failed to derive master key: {}", e)))?;
        let derived_key = master_key
            .derive_path(&derivation_path)
            .map_err(|e| LedgerError::Wallet(format!("Failed to derive key: {}", e)))?;

        let signing_key: &SigningKey = derived_key.as_ref();
        Self::from_signing_key(signing_key.clone(), prefix)
    }

    fn from_signing_key(signing_key: SigningKey, prefix: &str) -> LedgerResult<Self> {
        let point = signing_key.verifying_key().to_encoded_point(true);
        let public_key: [u8; 33] = point
            .as_bytes()
            .try_into()
            .map_err(|_| LedgerError::Wallet("Unexpected public key length".to_string()))?;
        let address = address_from_public_key(&public_key, prefix)?;

        Ok(Self {
            signing_key,
            public_key,
            address,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Compressed SEC1 public key.
    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    /// SHA-256 + ECDSA signature in compact `r || s` form, low-s normalized.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let signature: Signature = self.signing_key.sign(message);
        let signature = signature.normalize_s().unwrap_or(signature);
        let mut out = [0u8; 64];
        out.copy_from_slice(&signature.to_bytes());
        out
    }
}

impl fmt::Debug for CosmosWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CosmosWallet")
            .field("address", &self.address)
            .finish()
    }
}

/// Bech32 address of a compressed public key.
pub fn address_from_public_key(public_key: &[u8], prefix: &str) -> LedgerResult<String> {
    let hrp = Hrp::parse(prefix)
        .map_err(|e| LedgerError::Wallet(format!("Invalid address prefix '{}': {}", prefix, e)))?;
    let hash = Ripemd160::digest(Sha256::digest(public_key));
    bech32::encode::<Bech32>(hrp, &hash)
        .map_err(|e| LedgerError::Wallet(format!("Address encoding failed: {}", e)))
}

/// Decode a bech32 address, requiring `prefix`. Returns the account bytes.
pub fn decode_address(address: &str, prefix: &str) -> LedgerResult<Vec<u8>> {
    let (hrp, data) = bech32::decode(address)
        .map_err(|e| LedgerError::address(address, format!("invalid bech32: {}", e)))?;
    if !hrp.to_lowercase().eq_ignore_ascii_case(prefix) {
        return Err(LedgerError::address(
            address,
            format!("prefix '{}' does not match '{}'", hrp, prefix),
        ));
    }
    if data.len() != 20 && data.len() != 32 {
        return Err(LedgerError::address(
            address,
            format!("unexpected length {}", data.len()),
        ));
    }
    Ok(data)
}
