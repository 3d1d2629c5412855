//! SIGN_MODE_DIRECT transaction assembly.

use prost::Message;

use crate::ledger::cosmos::proto::{
    Any, AuthInfo, Coin, Fee, ModeInfo, ModeInfoSingle, MsgSend, PubKey, SignDoc, SignerInfo,
    TxBody, TxRaw, MSG_SEND_TYPE_URL, SECP256K1_PUBKEY_TYPE_URL, SIGN_MODE_DIRECT,
};
use crate::ledger::cosmos::wallet::CosmosWallet;

/// On-chain state of the signer needed to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerState {
    pub account_number: u64,
    pub sequence: u64,
}

/// A bank send ready to be signed.
#[derive(Debug, Clone)]
pub struct SendTx {
    pub recipient: String,
    pub amount: Vec<Coin>,
    pub fee: Vec<Coin>,
    pub gas_limit: u64,
    pub memo: String,
}

impl SendTx {
    fn body(&self, sender: &str) -> TxBody {
        let send = MsgSend {
            from_address: sender.to_string(),
            to_address: self.recipient.clone(),
            amount: self.amount.clone(),
        };
        TxBody {
            messages: vec![Any::pack(MSG_SEND_TYPE_URL, &send)],
            memo: self.memo.clone(),
            timeout_height: 0,
        }
    }

    fn auth_info(&self, wallet: &CosmosWallet, sequence: u64) -> AuthInfo {
        let public_key = PubKey {
            key: wallet.public_key().to_vec(),
        };
        AuthInfo {
            signer_infos: vec![SignerInfo {
                public_key: Some(Any::pack(SECP256K1_PUBKEY_TYPE_URL, &public_key)),
                mode_info: Some(ModeInfo {
                    single: Some(ModeInfoSingle {
                        mode: SIGN_MODE_DIRECT,
                    }),
                }),
                sequence,
            }],
            fee: Some(Fee {
                amount: self.fee.clone(),
                gas_limit: self.gas_limit,
                payer: String::new(),
                granter: String::new(),
            }),
        }
    }

    /// Sign for `chain_id` and return the encoded `TxRaw`.
    pub fn sign(&self, wallet: &CosmosWallet, chain_id: &str, signer: SignerState) -> Vec<u8> {
        let body_bytes = self.body(wallet.address()).encode_to_vec();
        let auth_info_bytes = self.auth_info(wallet, signer.sequence).encode_to_vec();

        let sign_doc = SignDoc {
            body_bytes: body_bytes.clone(),
            auth_info_bytes: auth_info_bytes.clone(),
            chain_id: chain_id.to_string(),
            account_number: signer.account_number,
        };
        let signature = wallet.sign(&sign_doc.encode_to_vec());

        TxRaw {
            body_bytes,
            auth_info_bytes,
            signatures: vec![signature.to_vec()],
        }
        .encode_to_vec()
    }
}
