//! Inbound relay requests.

use serde::Deserialize;

/// Which stored recipient a legacy send goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyVariant {
    Primary,
    Legacy,
}

/// The three supported transfer shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestShape {
    /// Token send on the new ledger to the configured recipient.
    NewChain { data: serde_json::Value },
    /// Message transfer on the legacy ledger to the configured recipient.
    Legacy {
        variant: LegacyVariant,
        data: serde_json::Value,
    },
    /// Legacy transfer between two stored entities named in the body.
    PeerToPeer {
        sender_key: String,
        entity_key: String,
        data: serde_json::Value,
    },
}

impl RequestShape {
    /// Label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            RequestShape::NewChain { .. } => "new-chain",
            RequestShape::Legacy {
                variant: LegacyVariant::Primary,
                ..
            } => "legacy",
            RequestShape::Legacy {
                variant: LegacyVariant::Legacy,
                ..
            } => "legacy-variant",
            RequestShape::PeerToPeer { .. } => "peer-to-peer",
        }
    }
}

/// A relay request as handed to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayRequest {
    /// Sender authorization key, from the `Authorization` header.
    pub authorization: Option<String>,
    pub shape: RequestShape,
}

impl RelayRequest {
    pub fn new(authorization: Option<String>, shape: RequestShape) -> Self {
        Self {
            authorization,
            shape,
        }
    }
}

/// Body of the announce routes.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnounceBody {
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Body of the peer-to-peer transfer route.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferBody {
    #[serde(default)]
    pub data: serde_json::Value,
    /// Entity key of the signing sender.
    pub sender: String,
    /// Entity key whose account receives the transfer.
    pub entity: String,
}
