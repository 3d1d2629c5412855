//! Legacy ledger accounts and addresses.
//!
//! # Security
//! - Private keys are parsed once and held only inside `LegacyAccount`
//! - `Debug` output never includes key material

use data_encoding::BASE32_NOPAD;
use ed25519_dalek::{Signer, SigningKey};
use ripemd::Ripemd160;
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

use crate::ledger::types::{LedgerError, LedgerResult};

/// Network type byte for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkType(pub u8);

impl NetworkType {
    pub const MAIN_NET: NetworkType = NetworkType(104);
    pub const TEST_NET: NetworkType = NetworkType(152);
}

impl From<u8> for NetworkType {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// Decoded address length: network byte + ripemd160 + checksum.
pub const ADDRESS_DECODED_SIZE: usize = 24;
/// Length of the raw Base32 form.
pub const ADDRESS_ENCODED_SIZE: usize = 39;
const CHECKSUM_SIZE: usize = 3;

/// A legacy ledger address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacyAddress([u8; ADDRESS_DECODED_SIZE]);

impl LegacyAddress {
    /// Derive the address of a public key on a network.
    pub fn from_public_key(public_key: &[u8; 32], network: NetworkType) -> Self {
        let sha = Sha3_256::digest(public_key);
        let ripe = Ripemd160::digest(sha);

        let mut bytes = [0u8; ADDRESS_DECODED_SIZE];
        bytes[0] = network.0;
        bytes[1..21].copy_from_slice(&ripe);
        let checksum = Sha3_256::digest(&bytes[..21]);
        bytes[21..].copy_from_slice(&checksum[..CHECKSUM_SIZE]);
        Self(bytes)
    }

    /// Parse a raw (39 chars) or pretty (hyphenated) address.
    pub fn from_raw(raw: &str) -> LedgerResult<Self> {
        let plain: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();

        if plain.len() != ADDRESS_ENCODED_SIZE {
            return Err(LedgerError::address(
                raw,
                format!("expected {} characters, got {}", ADDRESS_ENCODED_SIZE, plain.len()),
            ));
        }

        let decoded = BASE32_NOPAD
            .decode(plain.as_bytes())
            .map_err(|e| LedgerError::address(raw, format!("invalid base32: {}", e)))?;
        let bytes: [u8; ADDRESS_DECODED_SIZE] = decoded
            .try_into()
            .map_err(|_| LedgerError::address(raw, "invalid decoded length"))?;

        let checksum = Sha3_256::digest(&bytes[..21]);
        if checksum[..CHECKSUM_SIZE] != bytes[21..] {
            return Err(LedgerError::address(raw, "checksum mismatch"));
        }

        Ok(Self(bytes))
    }

    /// Parse an address and require it to belong to `network`.
    pub fn from_raw_on(raw: &str, network: NetworkType) -> LedgerResult<Self> {
        let address = Self::from_raw(raw)?;
        if address.network() != network {
            return Err(LedgerError::address(
                raw,
                format!(
                    "belongs to network {}, expected {}",
                    address.network().0,
                    network.0
                ),
            ));
        }
        Ok(address)
    }

    /// Network this address belongs to.
    pub fn network(&self) -> NetworkType {
        NetworkType(self.0[0])
    }

    /// Decoded bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_DECODED_SIZE] {
        &self.0
    }

    /// Raw 39 character form.
    pub fn plain(&self) -> String {
        BASE32_NOPAD.encode(&self.0)
    }

    /// Hyphenated form, groups of six characters.
    pub fn pretty(&self) -> String {
        let plain = self.plain();
        plain
            .as_bytes()
            .chunks(6)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for LegacyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain())
    }
}

impl fmt::Debug for LegacyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LegacyAddress({})", self.plain())
    }
}

impl FromStr for LegacyAddress {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_raw(s)
    }
}

/// An account able to sign legacy transactions.
#[derive(Clone)]
pub struct LegacyAccount {
    signing_key: SigningKey,
    public_key: [u8; 32],
    address: LegacyAddress,
}

impl LegacyAccount {
    /// Create an account from a hex-encoded 32 byte private key.
    pub fn from_private_key(private_key_hex: &str, network: NetworkType) -> LedgerResult<Self> {
        let bytes = hex::decode(private_key_hex.trim())
            .map_err(|e| LedgerError::Wallet(format!("Invalid private key format: {}", e)))?;
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| LedgerError::Wallet("Invalid private key length".to_string()))?;

        let signing_key = SigningKey::from_bytes(&secret);
        let public_key = signing_key.verifying_key().to_bytes();
        let address = LegacyAddress::from_public_key(&public_key, network);

        Ok(Self {
            signing_key,
            public_key,
            address,
        })
    }

    /// Public key bytes.
    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// Upper-case hex public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(self.public_key)
    }

    pub fn address(&self) -> LegacyAddress {
        self.address
    }

    /// Sign arbitrary bytes.
    pub fn sign(&self, data: &[u8]) -> [u8; 64] {
        self.signing_key.sign(data).to_bytes()
    }
}

impl fmt::Debug for LegacyAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyAccount")
            .field("public_key", &self.public_key_hex())
            .field("address", &self.address)
            .finish()
    }
}
