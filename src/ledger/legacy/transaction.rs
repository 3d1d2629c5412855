//! Transfer transaction building, signing and verification.
//!
//! # Wire Layout
//! ```text
//! size u32 | reserved u32 | signature [64] | signer [32] | reserved u32
//! ──────────────────── header (108 bytes) ─────────────────────────────
//! version u8 | network u8 | type u16 | max_fee u64 | deadline u64
//! recipient [24] | message_size u16 | mosaics_count u8
//! reserved u32 | reserved u8 | mosaics (id u64, amount u64)* | message
//! ```
//!
//! All integers are little endian. The signature covers
//! `generation_hash || payload[108..]`, which binds it to one network instance.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ledger::legacy::account::{LegacyAccount, LegacyAddress, NetworkType};
use crate::ledger::types::{LedgerError, LedgerResult};

/// Entity type of a transfer transaction.
pub const TRANSFER_TYPE: u16 = 0x4154;
/// Entity version of a transfer transaction.
pub const TRANSFER_VERSION: u8 = 1;
/// Longest transaction lifetime nodes accept.
pub const MAX_DEADLINE_HOURS: u64 = 48;

const SIGNATURE_OFFSET: usize = 8;
const SIGNER_OFFSET: usize = SIGNATURE_OFFSET + 64;
const HEADER_SIZE: usize = SIGNER_OFFSET + 32 + 4;
const TRANSFER_FIXED_SIZE: usize = HEADER_SIZE + 20 + 32;

/// Network generation hash.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct GenerationHash([u8; 32]);

impl GenerationHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for GenerationHash {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| LedgerError::Transaction(format!("Invalid generation hash: {}", e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| LedgerError::Transaction("Generation hash must be 32 bytes".to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for GenerationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GenerationHash({})", hex::encode_upper(self.0))
    }
}

/// Transaction deadline in milliseconds since the network epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(u64);

impl Deadline {
    /// Deadline `hours` from now, relative to the network epoch.
    pub fn create(epoch_adjustment_secs: u64, hours: u64) -> Self {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let network_now = now_ms.saturating_sub(epoch_adjustment_secs.saturating_mul(1000));
        Self(network_now.saturating_add(hours.saturating_mul(3600 * 1000)))
    }

    pub fn from_network_millis(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Unencrypted message attached to a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainMessage(String);

impl PlainMessage {
    const TYPE: u8 = 0x00;

    pub fn create(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// Message bytes as serialized: type byte followed by UTF-8 text.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.0.len());
        out.push(Self::TYPE);
        out.extend_from_slice(self.0.as_bytes());
        out
    }
}

/// Mosaic amount attached to a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mosaic {
    pub id: u64,
    pub amount: u64,
}

/// An unsigned transfer transaction.
#[derive(Debug, Clone)]
pub struct TransferTransaction {
    pub network: NetworkType,
    pub deadline: Deadline,
    pub recipient: LegacyAddress,
    pub mosaics: Vec<Mosaic>,
    pub message: PlainMessage,
    pub max_fee: u64,
}

impl TransferTransaction {
    /// Build a transfer.
    ///
    /// Fails if the message does not fit the 16-bit size field.
    pub fn create(
        deadline: Deadline,
        recipient: LegacyAddress,
        mut mosaics: Vec<Mosaic>,
        message: PlainMessage,
        network: NetworkType,
        max_fee: u64,
    ) -> LedgerResult<Self> {
        if message.to_payload().len() > u16::MAX as usize {
            return Err(LedgerError::Transaction(format!(
                "Message of {} bytes exceeds the maximum size",
                message.text().len()
            )));
        }
        if mosaics.len() > u8::MAX as usize {
            return Err(LedgerError::Transaction("Too many mosaics".to_string()));
        }
        mosaics.sort_by_key(|m| m.id);

        Ok(Self {
            network,
            deadline,
            recipient,
            mosaics,
            message,
            max_fee,
        })
    }

    /// Serialize with the given signer and signature.
    fn serialize(&self, signer: &[u8; 32], signature: &[u8; 64]) -> Vec<u8> {
        let message = self.message.to_payload();
        let size = TRANSFER_FIXED_SIZE + self.mosaics.len() * 16 + message.len();

        let mut out = Vec::with_capacity(size);
        out.extend_from_slice(&(size as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(signature);
        out.extend_from_slice(signer);
        out.extend_from_slice(&0u32.to_le_bytes());

        out.push(TRANSFER_VERSION);
        out.push(self.network.0);
        out.extend_from_slice(&TRANSFER_TYPE.to_le_bytes());
        out.extend_from_slice(&self.max_fee.to_le_bytes());
        out.extend_from_slice(&self.deadline.value().to_le_bytes());

        out.extend_from_slice(self.recipient.as_bytes());
        out.extend_from_slice(&(message.len() as u16).to_le_bytes());
        out.push(self.mosaics.len() as u8);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.push(0);
        for mosaic in &self.mosaics {
            out.extend_from_slice(&mosaic.id.to_le_bytes());
            out.extend_from_slice(&mosaic.amount.to_le_bytes());
        }
        out.extend_from_slice(&message);

        debug_assert_eq!(out.len(), size);
        out
    }

    /// Sign with `account`, binding the signature to `generation_hash`.
    pub fn sign(&self, account: &LegacyAccount, generation_hash: &GenerationHash) -> SignedTransaction {
        let unsigned = self.serialize(account.public_key(), &[0u8; 64]);
        let signature = account.sign(&signing_bytes(generation_hash, &unsigned));

        let mut payload = unsigned;
        payload[SIGNATURE_OFFSET..SIGNER_OFFSET].copy_from_slice(&signature);
        let hash = transaction_hash(generation_hash, &payload);

        SignedTransaction {
            payload,
            hash,
            signer: *account.public_key(),
            network: self.network,
        }
    }
}

fn signing_bytes(generation_hash: &GenerationHash, payload: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(32 + payload.len() - HEADER_SIZE);
    data.extend_from_slice(generation_hash.as_bytes());
    data.extend_from_slice(&payload[HEADER_SIZE..]);
    data
}

fn transaction_hash(generation_hash: &GenerationHash, payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    // R half of the signature
    hasher.update(&payload[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 32]);
    hasher.update(&payload[SIGNER_OFFSET..SIGNER_OFFSET + 32]);
    hasher.update(generation_hash.as_bytes());
    hasher.update(&payload[HEADER_SIZE..]);
    hasher.finalize().into()
}

/// An immutable signed transaction, ready to announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    payload: Vec<u8>,
    hash: [u8; 32],
    signer: [u8; 32],
    network: NetworkType,
}

impl SignedTransaction {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Upper-case hex payload as expected by the announce endpoint.
    pub fn payload_hex(&self) -> String {
        hex::encode_upper(&self.payload)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode_upper(self.hash)
    }

    pub fn signer_public_key(&self) -> &[u8; 32] {
        &self.signer
    }

    pub fn signer_address(&self) -> LegacyAddress {
        LegacyAddress::from_public_key(&self.signer, self.network)
    }

    /// Verify the embedded signature against the embedded signer and
    /// `generation_hash`.
    pub fn verify(&self, generation_hash: &GenerationHash) -> LedgerResult<()> {
        if self.payload.len() < TRANSFER_FIXED_SIZE {
            return Err(LedgerError::Verification("payload too short".to_string()));
        }
        let declared = u32::from_le_bytes([
            self.payload[0],
            self.payload[1],
            self.payload[2],
            self.payload[3],
        ]) as usize;
        if declared != self.payload.len() {
            return Err(LedgerError::Verification(format!(
                "declared size {} does not match payload size {}",
                declared,
                self.payload.len()
            )));
        }
        if self.payload[SIGNER_OFFSET..SIGNER_OFFSET + 32] != self.signer {
            return Err(LedgerError::Verification("signer mismatch".to_string()));
        }

        let verifying_key = VerifyingKey::from_bytes(&self.signer)
            .map_err(|e| LedgerError::Verification(e.to_string()))?;
        let mut signature = [0u8; 64];
        signature.copy_from_slice(&self.payload[SIGNATURE_OFFSET..SIGNER_OFFSET]);

        verifying_key
            .verify(
                &signing_bytes(generation_hash, &self.payload),
                &Signature::from_bytes(&signature),
            )
            .map_err(|e| LedgerError::Verification(e.to_string()))?;

        if transaction_hash(generation_hash, &self.payload) != self.hash {
            return Err(LedgerError::Verification("hash mismatch".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str =
        "575DBB3062267EFF57C970A336EBBC8FBCFE12C5BD3ED7BC11EB0481D7704CED";
    const GENERATION_HASH: &str =
        "ED5761EA890A096C50D3F50B7C2F0CCB4B84AFC9EA870F381E84DDE36D04EF16";

    fn fixture() -> (LegacyAccount, LegacyAddress, GenerationHash) {
        let sender =
            LegacyAccount::from_private_key(TEST_PRIVATE_KEY, NetworkType::MAIN_NET).unwrap();
        let recipient = LegacyAccount::from_private_key(&"11".repeat(32), NetworkType::MAIN_NET)
            .unwrap()
            .address();
        (sender, recipient, GENERATION_HASH.parse().unwrap())
    }

    fn transfer(recipient: LegacyAddress, text: &str) -> TransferTransaction {
        TransferTransaction::create(
            Deadline::from_network_millis(1_000_000),
            recipient,
            Vec::new(),
            PlainMessage::create(text),
            NetworkType::MAIN_NET,
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_layout() {
        let (sender, recipient, generation_hash) = fixture();
        let signed = transfer(recipient, "hello").sign(&sender, &generation_hash);
        let payload = signed.payload();

        assert_eq!(payload.len(), 160 + 6);
        assert_eq!(&payload[0..4], &(166u32).to_le_bytes());
        assert_eq!(payload[108], TRANSFER_VERSION);
        assert_eq!(payload[109], 104);
        assert_eq!(&payload[110..112], &[0x54, 0x41]);
        // Zero fee
        assert_eq!(&payload[112..120], &[0u8; 8]);
        assert_eq!(&payload[120..128], &1_000_000u64.to_le_bytes());
        assert_eq!(&payload[128..152], recipient.as_bytes());
        assert_eq!(&payload[152..154], &6u16.to_le_bytes());
        // No mosaics
        assert_eq!(payload[154], 0);
        assert_eq!(payload[160], 0x00);
        assert_eq!(&payload[161..], b"hello");
    }

    #[test]
    fn test_sign_then_verify() {
        let (sender, recipient, generation_hash) = fixture();
        let signed = transfer(recipient, "{\"a\":1}").sign(&sender, &generation_hash);

        assert!(signed.verify(&generation_hash).is_ok());
        assert_eq!(signed.signer_public_key(), sender.public_key());
        assert_eq!(signed.signer_address(), sender.address());
        assert_eq!(signed.hash_hex().len(), 64);
    }

    #[test]
    fn test_signature_bound_to_generation_hash() {
        let (sender, recipient, generation_hash) = fixture();
        let signed = transfer(recipient, "data").sign(&sender, &generation_hash);

        let other: GenerationHash = "00".repeat(32).parse().unwrap();
        let err = signed.verify(&other).unwrap_err();
        assert!(matches!(err, LedgerError::Verification(_)));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let (sender, recipient, generation_hash) = fixture();
        let mut signed = transfer(recipient, "data").sign(&sender, &generation_hash);
        let last = signed.payload.len() - 1;
        signed.payload[last] ^= 0xFF;

        assert!(signed.verify(&generation_hash).is_err());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let (sender, recipient, generation_hash) = fixture();
        let tx = transfer(recipient, "same");
        assert_eq!(
            tx.sign(&sender, &generation_hash),
            tx.sign(&sender, &generation_hash)
        );
    }

    #[test]
    fn test_mosaics_sorted_by_id() {
        let (_, recipient, _) = fixture();
        let tx = TransferTransaction::create(
            Deadline::from_network_millis(1),
            recipient,
            vec![Mosaic { id: 9, amount: 1 }, Mosaic { id: 2, amount: 5 }],
            PlainMessage::create(""),
            NetworkType::MAIN_NET,
            0,
        )
        .unwrap();
        assert_eq!(tx.mosaics[0].id, 2);
    }

    #[test]
    fn test_oversized_message_rejected() {
        let (_, recipient, _) = fixture();
        let result = TransferTransaction::create(
            Deadline::from_network_millis(1),
            recipient,
            Vec::new(),
            PlainMessage::create("x".repeat(70_000)),
            NetworkType::MAIN_NET,
            0,
        );
        assert!(matches!(result, Err(LedgerError::Transaction(_))));
    }

    #[test]
    fn test_deadline_is_ahead_of_network_time() {
        let epoch = 1616978397;
        let deadline = Deadline::create(epoch, 2);
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let network_now = now_ms - epoch * 1000;
        assert!(deadline.value() > network_now);
        assert!(deadline.value() <= network_now + 2 * 3600 * 1000 + 1000);
    }

    #[test]
    fn test_deadline_saturates() {
        assert_eq!(Deadline::create(1616978397, u64::MAX).value(), u64::MAX);
    }
}
